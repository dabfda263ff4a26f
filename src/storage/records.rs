use std::time::Instant;

use chrono::Utc;
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{Category, Record, RecordFields};
use super::tables::RECORD_SEQUENCES;

impl Database {
    // ========================================================================
    // Record operations
    // ========================================================================

    // Writes abort instead of committing once `deadline` has passed.

    /// Insert a new row into the category's table and return it with its
    /// assigned id and creation timestamp.
    pub fn insert_record(
        &self,
        category: Category,
        fields: &RecordFields,
        deadline: Option<Instant>,
    ) -> Result<Record, DatabaseError> {
        let write_txn = self.begin_write()?;
        let record = {
            let mut sequences = write_txn.open_table(RECORD_SEQUENCES)?;
            let last = sequences
                .get(category.as_str())?
                .map(|v| v.value())
                .unwrap_or(0);
            let id = last + 1;
            sequences.insert(category.as_str(), id)?;

            let record = Record {
                id,
                title: fields.title.clone(),
                content: fields.content.clone(),
                created_at: Utc::now(),
            };

            let mut table = write_txn.open_table(category.table())?;
            let data = rmp_serde::to_vec_named(&record)?;
            table.insert(id, data.as_slice())?;
            record
        };
        Database::commit_before(write_txn, deadline)?;
        Ok(record)
    }

    /// Get a row by id
    pub fn get_record(&self, category: Category, id: u64) -> Result<Option<Record>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(category.table())?;

        match table.get(id)? {
            Some(data) => {
                let record: Record = rmp_serde::from_slice(data.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// All rows of a category in ascending id order
    pub fn list_records(&self, category: Category) -> Result<Vec<Record>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(category.table())?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let record: Record = rmp_serde::from_slice(value.value())?;
            records.push(record);
        }

        Ok(records)
    }

    /// Overwrite a row's title and content. `created_at` is left untouched.
    /// Returns the stored row, or `None` when no row with that id exists.
    pub fn update_record(
        &self,
        category: Category,
        id: u64,
        fields: &RecordFields,
        deadline: Option<Instant>,
    ) -> Result<Option<Record>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(category.table())?;
            let result = match table.get(id)? {
                Some(data) => {
                    let record: Record = rmp_serde::from_slice(data.value())?;
                    Some(record)
                }
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut record) => {
                record.title = fields.title.clone();
                record.content = fields.content.clone();

                let serialized = rmp_serde::to_vec_named(&record)?;
                let mut table = write_txn.open_table(category.table())?;
                table.insert(id, serialized.as_slice())?;
                Some(record)
            }
            None => None,
        };

        Database::commit_before(write_txn, deadline)?;
        Ok(updated)
    }

    /// Remove a row. Returns whether a row was actually removed.
    pub fn delete_record(
        &self,
        category: Category,
        id: u64,
        deadline: Option<Instant>,
    ) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(category.table())?;
            let result = table.remove(id)?.is_some();
            result
        };
        Database::commit_before(write_txn, deadline)?;
        Ok(removed)
    }
}
