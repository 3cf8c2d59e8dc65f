//! Review Repository Implementation
//!
//! Food and pokemon reviews live in twin tables; `ReviewTable` names the
//! pair so one repository type serves both.

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, Connection, Row};

use crate::domain::{DomainResult, NewReview, OwnerId, Review, ReviewPatch};

use super::db::DbState;
use super::ownership::{ensure_owner, now_millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewTable {
    pub table: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
    pub parent_noun: &'static str,
}

pub const FOOD_REVIEWS: ReviewTable = ReviewTable {
    table: "food_reviews",
    parent_table: "food_photos",
    parent_column: "food_photo_id",
    parent_noun: "Food photo",
};

pub const POKEMON_REVIEWS: ReviewTable = ReviewTable {
    table: "pokemon_reviews",
    parent_table: "pokemon",
    parent_column: "pokemon_id",
    parent_noun: "Pokemon",
};

const NOUN: &str = "Review";

fn columns(table: &ReviewTable) -> String {
    format!(
        "id, owner_id, {}, content, rating, created_at, updated_at",
        table.parent_column
    )
}

fn row_to_review(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        owner_id: OwnerId::new(row.get::<_, String>(1)?),
        parent_id: row.get(2)?,
        content: row.get(3)?,
        rating: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Reviews of each parent id, newest first
pub(crate) fn reviews_for(
    conn: &Connection,
    table: &ReviewTable,
    parent_ids: &[i64],
) -> DomainResult<HashMap<i64, Vec<Review>>> {
    let mut grouped: HashMap<i64, Vec<Review>> = HashMap::new();
    if parent_ids.is_empty() {
        return Ok(grouped);
    }

    let placeholders = vec!["?"; parent_ids.len()].join(", ");
    let sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY created_at DESC, id DESC",
        columns(table),
        table.table,
        table.parent_column,
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let reviews = stmt
        .query_map(params_from_iter(parent_ids.iter()), row_to_review)?
        .collect::<Result<Vec<_>, _>>()?;

    for review in reviews {
        grouped.entry(review.parent_id).or_default().push(review);
    }
    Ok(grouped)
}

/// SQLite implementation of one review table
#[derive(Clone)]
pub struct ReviewRepository {
    db: DbState,
    table: ReviewTable,
}

impl ReviewRepository {
    pub fn new(db: DbState, table: ReviewTable) -> Self {
        Self { db, table }
    }

    pub fn table(&self) -> &ReviewTable {
        &self.table
    }

    /// Review a parent the caller owns
    pub async fn create(
        &self,
        owner: &OwnerId,
        parent_id: i64,
        draft: &NewReview,
    ) -> DomainResult<Review> {
        let table = self.table;
        self.db
            .call(|conn| {
                ensure_owner(conn, table.parent_table, table.parent_noun, parent_id, owner)?;
                let now = now_millis();
                let content = draft.content.trim().to_string();
                conn.execute(
                    &format!(
                        "INSERT INTO {} ({}, owner_id, content, rating, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                        table.table, table.parent_column
                    ),
                    params![parent_id, owner.as_str(), content, draft.rating, now],
                )?;
                Ok(Review {
                    id: conn.last_insert_rowid(),
                    owner_id: owner.clone(),
                    parent_id,
                    content,
                    rating: draft.rating,
                    created_at: now,
                    updated_at: now,
                })
            })
            .await
    }

    /// Reviews grouped by parent; parents without reviews are absent
    pub async fn list_for(&self, parent_ids: &[i64]) -> DomainResult<HashMap<i64, Vec<Review>>> {
        let table = self.table;
        self.db.call(|conn| reviews_for(conn, &table, parent_ids)).await
    }

    pub async fn find_by_id(&self, owner: &OwnerId, id: i64) -> DomainResult<Review> {
        let table = self.table;
        self.db
            .call(|conn| {
                ensure_owner(conn, table.table, NOUN, id, owner)?;
                let review = conn.query_row(
                    &format!("SELECT {} FROM {} WHERE id = ?1", columns(&table), table.table),
                    params![id],
                    row_to_review,
                )?;
                Ok(review)
            })
            .await
    }

    pub async fn update(&self, owner: &OwnerId, id: i64, patch: &ReviewPatch) -> DomainResult<()> {
        let table = self.table;
        self.db
            .call(|conn| {
                ensure_owner(conn, table.table, NOUN, id, owner)?;
                conn.execute(
                    &format!(
                        "UPDATE {} SET content = COALESCE(?1, content), rating = COALESCE(?2, rating), updated_at = ?3 WHERE id = ?4",
                        table.table
                    ),
                    params![patch.content.as_deref().map(str::trim), patch.rating, now_millis(), id],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, owner: &OwnerId, id: i64) -> DomainResult<()> {
        let table = self.table;
        self.db
            .call(|conn| {
                ensure_owner(conn, table.table, NOUN, id, owner)?;
                conn.execute(&format!("DELETE FROM {} WHERE id = ?1", table.table), params![id])?;
                Ok(())
            })
            .await
    }
}
