//! Profile Entity
//!
//! Local mirror of an identity-provider user. Every owned row references it.

use serde::{Deserialize, Serialize};

use super::entity::OwnerId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: OwnerId,
    pub username: String,
    pub created_at: i64,
}
