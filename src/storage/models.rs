use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use redb::TableDefinition;
use serde::{Deserialize, Serialize};

use super::tables::*;

/// Product category. Each variant owns exactly one table in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Form,
    Bracelets,
    BodyChain,
    Beads,
    Necklace,
    Chokers,
    FriendshipBracelets,
    Bags,
    Covers,
    Lookbook,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Form,
        Category::Bracelets,
        Category::BodyChain,
        Category::Beads,
        Category::Necklace,
        Category::Chokers,
        Category::FriendshipBracelets,
        Category::Bags,
        Category::Covers,
        Category::Lookbook,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Form => "form",
            Category::Bracelets => "bracelets",
            Category::BodyChain => "body_chain",
            Category::Beads => "beads",
            Category::Necklace => "necklace",
            Category::Chokers => "chokers",
            Category::FriendshipBracelets => "friendship_bracelets",
            Category::Bags => "bags",
            Category::Covers => "covers",
            Category::Lookbook => "lookbook",
        }
    }

    /// The fixed redb table backing this category.
    pub fn table(self) -> TableDefinition<'static, u64, &'static [u8]> {
        match self {
            Category::Form => FORM,
            Category::Bracelets => BRACELETS,
            Category::BodyChain => BODY_CHAIN,
            Category::Beads => BEADS,
            Category::Necklace => NECKLACE,
            Category::Chokers => CHOKERS,
            Category::FriendshipBracelets => FRIENDSHIP_BRACELETS,
            Category::Bags => BAGS,
            Category::Covers => COVERS,
            Category::Lookbook => LOOKBOOK,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A catalog row. The category is implied by the table it lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Column values supplied on insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub title: String,
    pub content: String,
}
