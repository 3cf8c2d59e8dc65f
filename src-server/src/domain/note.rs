//! Note Entity
//!
//! Markdown notes. Content is stored as written; rendering is the client's job.

use serde::{Deserialize, Serialize};

use super::entity::{check_text, DomainError, DomainResult, Entity, OwnedEntity, OwnerId, Validate};

pub const TITLE_MAX: usize = 200;
pub const CONTENT_MAX: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub owner_id: OwnerId,
    pub title: String,
    /// Markdown source
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

fn check_content(content: &str) -> DomainResult<()> {
    if content.chars().count() > CONTENT_MAX {
        return Err(DomainError::invalid(format!(
            "Note content must be at most {} characters",
            CONTENT_MAX
        )));
    }
    Ok(())
}

impl Validate for NewNote {
    fn validate(&self) -> DomainResult<()> {
        check_text("Title", &self.title, TITLE_MAX)?;
        check_content(&self.content)
    }
}

impl Validate for NotePatch {
    fn validate(&self) -> DomainResult<()> {
        if self.title.is_none() && self.content.is_none() {
            return Err(DomainError::invalid("Nothing to update"));
        }
        if let Some(title) = &self.title {
            check_text("Title", title, TITLE_MAX)?;
        }
        if let Some(content) = &self.content {
            check_content(content)?;
        }
        Ok(())
    }
}

impl Entity for Note {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl OwnedEntity for Note {
    type Draft = NewNote;
    type Patch = NotePatch;

    const NOUN: &'static str = "Note";

    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}
