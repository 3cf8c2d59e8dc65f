//! Session Repository Implementation
//!
//! Bearer tokens issued for a local profile. Tokens are opaque hex strings.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::domain::{DomainResult, OwnerId, Profile};

use super::db::DbState;
use super::ownership::now_millis;

/// Two random v4 UUIDs, 244 bits of OS randomness, as 64 hex chars
pub(crate) fn mint_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[derive(Clone)]
pub struct SessionRepository {
    db: DbState,
}

impl SessionRepository {
    pub fn new(db: DbState) -> Self {
        Self { db }
    }

    /// Insert or rename the local mirror of an identity
    pub async fn upsert_profile(&self, owner: &OwnerId, username: &str) -> DomainResult<Profile> {
        self.db
            .call(|conn| {
                let now = now_millis();
                conn.execute(
                    "INSERT INTO profiles (id, username, created_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET username = excluded.username",
                    params![owner.as_str(), username, now],
                )?;
                let profile = conn.query_row(
                    "SELECT id, username, created_at FROM profiles WHERE id = ?1",
                    params![owner.as_str()],
                    |row| {
                        Ok(Profile {
                            id: OwnerId::new(row.get::<_, String>(0)?),
                            username: row.get(1)?,
                            created_at: row.get(2)?,
                        })
                    },
                )?;
                Ok(profile)
            })
            .await
    }

    /// Ensure the profile exists and hand out a fresh token for it
    pub async fn issue(&self, owner: &OwnerId, username: &str) -> DomainResult<String> {
        self.upsert_profile(owner, username).await?;
        let token = mint_token();
        self.insert_token(owner, &token).await?;
        Ok(token)
    }

    /// Register a caller-chosen token, e.g. a development token from config
    pub async fn insert_token(&self, owner: &OwnerId, token: &str) -> DomainResult<()> {
        self.db
            .call(|conn| {
                conn.execute(
                    "INSERT INTO sessions (token, profile_id, created_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(token) DO UPDATE SET profile_id = excluded.profile_id",
                    params![token, owner.as_str(), now_millis()],
                )?;
                Ok(())
            })
            .await
    }

    /// Owner of `token`, if the token is live
    pub async fn verify(&self, token: &str) -> DomainResult<Option<OwnerId>> {
        self.db
            .call(|conn| {
                let owner: Option<String> = conn
                    .query_row(
                        "SELECT profile_id FROM sessions WHERE token = ?1",
                        params![token],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(owner.map(OwnerId::new))
            })
            .await
    }

    pub async fn revoke(&self, token: &str) -> DomainResult<()> {
        self.db
            .call(|conn| {
                conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
                Ok(())
            })
            .await
    }
}
