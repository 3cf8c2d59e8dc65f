//! Identity
//!
//! Maps a bearer token to the owner every repository call is scoped to.

use async_trait::async_trait;

use crate::domain::{DomainError, DomainResult, OwnerId};
use crate::repository::SessionRepository;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Owner behind `token`, or `AuthenticationRequired`
    async fn authenticate(&self, token: &str) -> DomainResult<OwnerId>;
}

#[async_trait]
impl IdentityProvider for SessionRepository {
    async fn authenticate(&self, token: &str) -> DomainResult<OwnerId> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::AuthenticationRequired);
        }
        self.verify(token)
            .await?
            .ok_or(DomainError::AuthenticationRequired)
    }
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
