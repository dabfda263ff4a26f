use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::storage::{Category, Database, DatabaseError, Record, RecordFields};

/// Longest accepted title, matching the catalog's `VARCHAR(255)` column.
const MAX_TITLE_CHARS: usize = 255;

// ============================================================================
// Types
// ============================================================================

/// A record together with the category table it was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: u64,
    pub table: Category,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

/// Request body accepted by create and update.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PostBody {
    #[serde(default, alias = "category")]
    table: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl Post {
    fn from_record(table: Category, record: Record) -> Self {
        Self {
            id: record.id,
            table,
            title: record.title,
            content: record.content,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Generic CRUD over the category tables.
#[derive(Clone)]
pub struct RecordService {
    db: Database,
    default_category: Category,
    query_timeout: Duration,
}

impl RecordService {
    pub fn new(db: Database, default_category: Category, query_timeout: Duration) -> Self {
        Self {
            db,
            default_category,
            query_timeout,
        }
    }

    pub async fn create(&self, fields: &serde_json::Value) -> Result<Post, ServiceError> {
        let body = parse_body(fields)?;
        if body.id.is_some() {
            return Err(ServiceError::Validation(
                "id is assigned by the server and must not be supplied".to_string(),
            ));
        }
        let (category, fields) = required_fields(body)?;

        let record = self
            .write(move |db, deadline| db.insert_record(category, &fields, deadline))
            .await?;

        tracing::debug!(table = %category, id = record.id, "Created record");
        Ok(Post::from_record(category, record))
    }

    /// All rows of `table`, or of the default category when none is given.
    pub async fn list(&self, table: Option<&str>) -> Result<Vec<Post>, ServiceError> {
        let category = self.category_or_default(table)?;
        let records = self.read(move |db| db.list_records(category)).await?;
        Ok(records
            .into_iter()
            .map(|r| Post::from_record(category, r))
            .collect())
    }

    pub async fn get(&self, id: &str, table: Option<&str>) -> Result<Post, ServiceError> {
        let id = parse_id(id)?;
        let category = self.category_or_default(table)?;
        self.fetch(category, id).await
    }

    /// Overwrite title and content of the row at `id`. The body must name the
    /// table; an `id` in the body, if present, must agree with the path.
    pub async fn update(&self, id: &str, fields: &serde_json::Value) -> Result<Post, ServiceError> {
        let id = parse_id(id)?;
        let body = parse_body(fields)?;
        if let Some(body_id) = &body.id {
            if id_from_json(body_id)? != id {
                return Err(ServiceError::Validation(
                    "id in body does not match id in path".to_string(),
                ));
            }
        }
        let (category, fields) = required_fields(body)?;

        let record = self
            .write(move |db, deadline| db.update_record(category, id, &fields, deadline))
            .await?
            .ok_or_else(|| not_found(category, id))?;

        tracing::debug!(table = %category, id, "Updated record");
        Ok(Post::from_record(category, record))
    }

    pub async fn delete(
        &self,
        id: &str,
        table: Option<&str>,
    ) -> Result<DeleteConfirmation, ServiceError> {
        let id = parse_id(id)?;
        let table = table.ok_or_else(|| ServiceError::Validation("table is required".to_string()))?;
        let category = parse_category(table)?;

        let removed = self
            .write(move |db, deadline| db.delete_record(category, id, deadline))
            .await?;
        if !removed {
            return Err(not_found(category, id));
        }

        tracing::debug!(table = %category, id, "Deleted record");
        Ok(DeleteConfirmation {
            message: format!("{category} record {id} deleted"),
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn fetch(&self, category: Category, id: u64) -> Result<Post, ServiceError> {
        self.read(move |db| db.get_record(category, id))
            .await?
            .map(|r| Post::from_record(category, r))
            .ok_or_else(|| not_found(category, id))
    }

    fn category_or_default(&self, table: Option<&str>) -> Result<Category, ServiceError> {
        match table {
            Some(t) => parse_category(t),
            None => Ok(self.default_category),
        }
    }

    /// Run a read on the blocking pool, bounded by the query timeout.
    async fn read<T, F>(&self, op: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let task = tokio::task::spawn_blocking(move || op(&db));
        match tokio::time::timeout(self.query_timeout, task).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(e)) => Err(ServiceError::Storage(format!("record store task failed: {e}"))),
            Err(_) => Err(self.timed_out()),
        }
    }

    /// Run a write on the blocking pool. The query timeout becomes a commit
    /// deadline inside the transaction, and the task is always awaited: an
    /// error means the transaction did not commit.
    async fn write<T, F>(&self, op: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Database, Option<Instant>) -> Result<T, DatabaseError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let deadline = Instant::now().checked_add(self.query_timeout);
        let task = tokio::task::spawn_blocking(move || op(&db, deadline));
        match task.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(DatabaseError::DeadlineExceeded)) => Err(self.timed_out()),
            Ok(Err(e)) => Err(e.into()),
            Err(e) => Err(ServiceError::Storage(format!("record store task failed: {e}"))),
        }
    }

    fn timed_out(&self) -> ServiceError {
        ServiceError::Storage(format!(
            "record store query timed out after {}ms",
            self.query_timeout.as_millis()
        ))
    }
}

fn parse_body(fields: &serde_json::Value) -> Result<PostBody, ServiceError> {
    if !fields.is_object() {
        return Err(ServiceError::Validation(
            "Post data must be a JSON object".to_string(),
        ));
    }
    PostBody::deserialize(fields)
        .map_err(|e| ServiceError::Validation(format!("Invalid post data: {e}")))
}

fn required_fields(body: PostBody) -> Result<(Category, RecordFields), ServiceError> {
    let table = body
        .table
        .ok_or_else(|| ServiceError::Validation("table is required".to_string()))?;
    let category = parse_category(&table)?;
    let title = body
        .title
        .ok_or_else(|| ServiceError::Validation("title is required".to_string()))?;
    let content = body
        .content
        .ok_or_else(|| ServiceError::Validation("content is required".to_string()))?;

    if title.trim().is_empty() {
        return Err(ServiceError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ServiceError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }

    Ok((category, RecordFields { title, content }))
}

fn parse_category(table: &str) -> Result<Category, ServiceError> {
    table
        .parse()
        .map_err(|e| ServiceError::Validation(format!("Invalid table: {e}")))
}

fn parse_id(raw: &str) -> Result<u64, ServiceError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ServiceError::Validation("Invalid post ID".to_string())),
    }
}

fn id_from_json(value: &serde_json::Value) -> Result<u64, ServiceError> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .filter(|id| *id > 0)
            .ok_or_else(|| ServiceError::Validation("Invalid post ID".to_string())),
        serde_json::Value::String(s) => parse_id(s),
        _ => Err(ServiceError::Validation("Invalid post ID".to_string())),
    }
}

fn not_found(category: Category, id: u64) -> ServiceError {
    ServiceError::NotFound(format!("No {category} record with id {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("abc").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn test_id_from_json() {
        assert_eq!(id_from_json(&serde_json::json!(3)).unwrap(), 3);
        assert_eq!(id_from_json(&serde_json::json!("3")).unwrap(), 3);
        assert!(id_from_json(&serde_json::json!(1.5)).is_err());
        assert!(id_from_json(&serde_json::json!(null)).is_err());
    }

    #[test]
    fn test_parse_category_rejects_arbitrary_tables() {
        assert_eq!(parse_category("body_chain").unwrap(), Category::BodyChain);
        assert!(matches!(
            parse_category("posts; DROP TABLE bags"),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            parse_category("Bracelets"),
            Err(ServiceError::Validation(_))
        ));
    }
}
