use redb::TableDefinition;

/// Per-category id high-water mark: table name -> last assigned id
pub const RECORD_SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("record_sequences");

// Category tables: id -> Record (msgpack). All share the same row shape.
pub const FORM: TableDefinition<u64, &[u8]> = TableDefinition::new("form");
pub const BRACELETS: TableDefinition<u64, &[u8]> = TableDefinition::new("bracelets");
pub const BODY_CHAIN: TableDefinition<u64, &[u8]> = TableDefinition::new("body_chain");
pub const BEADS: TableDefinition<u64, &[u8]> = TableDefinition::new("beads");
pub const NECKLACE: TableDefinition<u64, &[u8]> = TableDefinition::new("necklace");
pub const CHOKERS: TableDefinition<u64, &[u8]> = TableDefinition::new("chokers");
pub const FRIENDSHIP_BRACELETS: TableDefinition<u64, &[u8]> =
    TableDefinition::new("friendship_bracelets");
pub const BAGS: TableDefinition<u64, &[u8]> = TableDefinition::new("bags");
pub const COVERS: TableDefinition<u64, &[u8]> = TableDefinition::new("covers");
pub const LOOKBOOK: TableDefinition<u64, &[u8]> = TableDefinition::new("lookbook");
