//! Note Repository Implementation

use async_trait::async_trait;
use rusqlite::{params, Row};

use crate::domain::{DomainResult, ListQuery, NewNote, Note, NotePatch, OwnedEntity, OwnerId};

use super::db::DbState;
use super::ownership::{ensure_owner, filter_clause, now_millis};
use super::traits::OwnedRepository;

const TABLE: &str = "notes";
const COLUMNS: &str = "id, owner_id, title, content, created_at, updated_at";
const SORTABLE: &[&str] = &["created_at", "updated_at", "title"];

fn row_to_note(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        owner_id: OwnerId::new(row.get::<_, String>(1)?),
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// SQLite implementation of Note repository
#[derive(Clone)]
pub struct NoteRepository {
    db: DbState,
}

impl NoteRepository {
    pub fn new(db: DbState) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OwnedRepository<Note> for NoteRepository {
    async fn create(&self, owner: &OwnerId, draft: &NewNote) -> DomainResult<Note> {
        self.db
            .call(|conn| {
                let now = now_millis();
                let title = draft.title.trim().to_string();
                conn.execute(
                    "INSERT INTO notes (owner_id, title, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![owner.as_str(), title, draft.content, now],
                )?;
                Ok(Note {
                    id: conn.last_insert_rowid(),
                    owner_id: owner.clone(),
                    title,
                    content: draft.content.clone(),
                    created_at: now,
                    updated_at: now,
                })
            })
            .await
    }

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> DomainResult<Note> {
        self.db
            .call(|conn| {
                ensure_owner(conn, TABLE, Note::NOUN, id, owner)?;
                let note = conn.query_row(
                    &format!("SELECT {} FROM notes WHERE id = ?1", COLUMNS),
                    params![id],
                    row_to_note,
                )?;
                Ok(note)
            })
            .await
    }

    async fn list(&self, owner: &OwnerId, query: &ListQuery) -> DomainResult<Vec<Note>> {
        let column = query.sort_column(SORTABLE)?;
        let order = query.order.as_sql();
        let pattern = query.like_pattern();

        self.db
            .call(|conn| {
                let sql = format!(
                    "SELECT {} FROM notes WHERE owner_id = ?1 AND {} ORDER BY {} {}, id {}",
                    COLUMNS,
                    filter_clause("title", 2),
                    column,
                    order,
                    order
                );
                let mut stmt = conn.prepare(&sql)?;
                let notes = stmt
                    .query_map(params![owner.as_str(), pattern], row_to_note)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await
    }

    async fn update(&self, owner: &OwnerId, id: i64, patch: &NotePatch) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, TABLE, Note::NOUN, id, owner)?;
                conn.execute(
                    "UPDATE notes SET title = COALESCE(?1, title), content = COALESCE(?2, content), updated_at = ?3 WHERE id = ?4",
                    params![
                        patch.title.as_deref().map(str::trim),
                        patch.content,
                        now_millis(),
                        id
                    ],
                )?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, owner: &OwnerId, id: i64) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, TABLE, Note::NOUN, id, owner)?;
                conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
    }
}
