//! Ownership checks and small SQL helpers shared by the repositories.

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{DomainError, DomainResult, OwnerId};

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// NotFound when the row is absent, PermissionDenied when someone else owns it
pub(crate) fn ensure_owner(
    conn: &Connection,
    table: &str,
    noun: &str,
    id: i64,
    owner: &OwnerId,
) -> DomainResult<()> {
    let found: Option<String> = conn
        .query_row(
            &format!("SELECT owner_id FROM {} WHERE id = ?1", table),
            params![id],
            |row| row.get(0),
        )
        .optional()?;

    match found {
        None => Err(DomainError::NotFound(format!("{} {}", noun, id))),
        Some(row_owner) if row_owner != owner.as_str() => Err(DomainError::PermissionDenied),
        Some(_) => Ok(()),
    }
}

/// `fold_case(column) LIKE ?n` clause matching `ListQuery::like_pattern`
pub(crate) fn filter_clause(column: &str, param: usize) -> String {
    format!(
        "(?{param} IS NULL OR fold_case({column}) LIKE ?{param} ESCAPE '\\')",
        param = param,
        column = column
    )
}
