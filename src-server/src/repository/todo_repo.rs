//! Todo Repository Implementation

use async_trait::async_trait;
use rusqlite::{params, Row};

use crate::domain::{DomainResult, ListQuery, NewTodo, OwnedEntity, OwnerId, Todo, TodoPatch};

use super::db::DbState;
use super::ownership::{ensure_owner, filter_clause, now_millis};
use super::traits::OwnedRepository;

const TABLE: &str = "todos";
const COLUMNS: &str = "id, owner_id, title, is_completed, created_at, updated_at";
const SORTABLE: &[&str] = &["created_at", "updated_at", "title", "is_completed"];

/// SQLite implementation of Todo repository
#[derive(Clone)]
pub struct TodoRepository {
    db: DbState,
}

impl TodoRepository {
    pub fn new(db: DbState) -> Self {
        Self { db }
    }
}

fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        owner_id: OwnerId::new(row.get::<_, String>(1)?),
        title: row.get(2)?,
        is_completed: row.get::<_, i64>(3)? != 0,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[async_trait]
impl OwnedRepository<Todo> for TodoRepository {
    async fn create(&self, owner: &OwnerId, draft: &NewTodo) -> DomainResult<Todo> {
        self.db
            .call(|conn| {
                let now = now_millis();
                let title = draft.title.trim().to_string();
                conn.execute(
                    "INSERT INTO todos (owner_id, title, is_completed, created_at, updated_at) VALUES (?1, ?2, 0, ?3, ?3)",
                    params![owner.as_str(), title, now],
                )?;
                Ok(Todo {
                    id: conn.last_insert_rowid(),
                    owner_id: owner.clone(),
                    title,
                    is_completed: false,
                    created_at: now,
                    updated_at: now,
                })
            })
            .await
    }

    async fn find_by_id(&self, owner: &OwnerId, id: i64) -> DomainResult<Todo> {
        self.db
            .call(|conn| {
                ensure_owner(conn, TABLE, Todo::NOUN, id, owner)?;
                let todo = conn.query_row(
                    &format!("SELECT {} FROM todos WHERE id = ?1", COLUMNS),
                    params![id],
                    row_to_todo,
                )?;
                Ok(todo)
            })
            .await
    }

    async fn list(&self, owner: &OwnerId, query: &ListQuery) -> DomainResult<Vec<Todo>> {
        let column = query.sort_column(SORTABLE)?;
        let order = query.order.as_sql();
        let pattern = query.like_pattern();

        self.db
            .call(|conn| {
                let sql = format!(
                    "SELECT {} FROM todos WHERE owner_id = ?1 AND {} ORDER BY {} {}, id {}",
                    COLUMNS,
                    filter_clause("title", 2),
                    column,
                    order,
                    order
                );
                let mut stmt = conn.prepare(&sql)?;
                let todos = stmt
                    .query_map(params![owner.as_str(), pattern], row_to_todo)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(todos)
            })
            .await
    }

    async fn update(&self, owner: &OwnerId, id: i64, patch: &TodoPatch) -> DomainResult<()> {
        self.db
            .call(|conn| {
                ensure_owner(conn, TABLE, Todo::NOUN, id, owner)?;
                conn.execute(
                    "UPDATE todos SET title = COALESCE(?1, title), is_completed = COALESCE(?2, is_completed), updated_at = ?3 WHERE id = ?4",
                    params![
                        patch.title.as_deref().map(str::trim),
                        patch.is_completed.map(i64::from),
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
                ensure_owner(conn, TABLE, Todo::NOUN, id, owner)?;
                conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
    }
}
