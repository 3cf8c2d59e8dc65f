//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::UpstreamFailure(format!("database: {}", err))
    }
}

/// Database state wrapper
#[derive(Clone, Default)]
pub struct DbState {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl DbState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the connection while holding the lock
    pub async fn call<R, F>(&self, f: F) -> DomainResult<R>
    where
        F: FnOnce(&Connection) -> DomainResult<R> + Send,
        R: Send,
    {
        let guard = self.conn.lock().await;
        let conn = guard
            .as_ref()
            .ok_or_else(|| DomainError::upstream("Database not initialized"))?;
        off_reactor(|| f(conn))
    }

    /// Same as `call` but inside a transaction
    pub async fn transaction<R, F>(&self, f: F) -> DomainResult<R>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> DomainResult<R> + Send,
        R: Send,
    {
        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| DomainError::upstream("Database not initialized"))?;
        off_reactor(|| {
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;
            Ok(result)
        })
    }

    pub async fn close(&self) {
        self.conn.lock().await.take();
    }
}

/// Blocking SQLite work; on a multi-threaded runtime the worker hands off its other tasks first
fn off_reactor<R>(work: impl FnOnce() -> R) -> R {
    match Handle::try_current().map(|h| h.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(work),
        _ => work(),
    }
}

/// Unicode lowercase; SQLite's built-in `LOWER` folds ASCII only
fn register_functions(conn: &Connection) -> DomainResult<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Initialize database with path (`:memory:` is accepted)
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::upstream(format!("Failed to open {}: {}", db_path.display(), e)))?;

    register_functions(&conn)?;
    run_migrations(&conn)?;

    let state = DbState::new();
    *state.conn.lock().await = Some(conn);
    Ok(state)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        is_completed INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS photos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        url TEXT NOT NULL,
        storage_path TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS food_photos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        url TEXT NOT NULL,
        storage_path TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS food_reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        food_photo_id INTEGER NOT NULL REFERENCES food_photos(id) ON DELETE CASCADE,
        owner_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS pokemon (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        pokedex_number INTEGER NOT NULL,
        sprite_url TEXT,
        types TEXT NOT NULL DEFAULT '[]',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS pokemon_reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pokemon_id INTEGER NOT NULL REFERENCES pokemon(id) ON DELETE CASCADE,
        owner_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_todos_owner ON todos(owner_id);
    CREATE INDEX IF NOT EXISTS idx_photos_owner ON photos(owner_id);
    CREATE INDEX IF NOT EXISTS idx_food_photos_owner ON food_photos(owner_id);
    CREATE INDEX IF NOT EXISTS idx_food_reviews_parent ON food_reviews(food_photo_id);
    CREATE INDEX IF NOT EXISTS idx_pokemon_owner ON pokemon(owner_id);
    CREATE INDEX IF NOT EXISTS idx_pokemon_reviews_parent ON pokemon_reviews(pokemon_id);
    CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes(owner_id);
";

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)?;

    // Nicknames arrived after the first pokemon release
    if !column_exists(conn, "pokemon", "nickname")? {
        conn.execute("ALTER TABLE pokemon ADD COLUMN nickname TEXT", [])
            .map_err(|e| DomainError::upstream(format!("Failed to add nickname: {}", e)))?;
    }

    Ok(())
}
