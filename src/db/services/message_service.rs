use chrono::Utc;
use sqlx::PgPool;

use crate::config::{MessageKeyColumn, SortOrder};
use crate::db::error::{StoreError, classify_read_error, classify_write_error};
use crate::db::models::Message;

// The scoping column name comes from a closed enum, never from user input,
// so splicing it into the statement is safe.

/// Retrieves all messages left on a tag. An unseen tag yields an empty list.
pub async fn list_messages(
    pool: &PgPool,
    key_column: MessageKeyColumn,
    sort_order: SortOrder,
    tag: &str,
) -> Result<Vec<Message>, StoreError> {
    let sql = format!(
        "SELECT id, {col} AS tag_id, message, created_at \
         FROM messages WHERE {col} = $1 ORDER BY {order}",
        col = key_column.as_str(),
        order = sort_order.sql(),
    );
    sqlx::query_as::<_, Message>(&sql)
        .bind(tag)
        .fetch_all(pool)
        .await
        .map_err(classify_read_error)
}

/// Appends one message to a tag. Tags come into existence implicitly on
/// first write.
pub async fn insert_message(
    pool: &PgPool,
    key_column: MessageKeyColumn,
    tag: &str,
    message: &str,
) -> Result<Message, StoreError> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO messages ({col}, message, created_at) VALUES ($1, $2, $3) \
         RETURNING id, {col} AS tag_id, message, created_at",
        col = key_column.as_str(),
    );
    sqlx::query_as::<_, Message>(&sql)
        .bind(tag)
        .bind(message)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(classify_write_error)
}
