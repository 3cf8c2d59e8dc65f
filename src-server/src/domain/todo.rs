//! Todo Entity

use serde::{Deserialize, Serialize};

use super::entity::{check_text, DomainError, DomainResult, Entity, OwnedEntity, OwnerId, Validate};

pub const TITLE_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub owner_id: OwnerId,
    pub title: String,
    pub is_completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
}

/// Partial edit; absent fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl Validate for NewTodo {
    fn validate(&self) -> DomainResult<()> {
        check_text("Title", &self.title, TITLE_MAX)
    }
}

impl Validate for TodoPatch {
    fn validate(&self) -> DomainResult<()> {
        if self.title.is_none() && self.is_completed.is_none() {
            return Err(DomainError::invalid("Nothing to update"));
        }
        if let Some(title) = &self.title {
            check_text("Title", title, TITLE_MAX)?;
        }
        Ok(())
    }
}

impl Entity for Todo {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl OwnedEntity for Todo {
    type Draft = NewTodo;
    type Patch = TodoPatch;

    const NOUN: &'static str = "Todo";

    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_rejected() {
        let draft = NewTodo { title: "  ".to_string() };
        assert!(matches!(draft.validate(), Err(DomainError::ValidationFailed(_))));
    }

    #[test]
    fn test_empty_patch_rejected() {
        assert!(TodoPatch::default().validate().is_err());
        let toggle = TodoPatch { is_completed: Some(true), ..Default::default() };
        assert!(toggle.validate().is_ok());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let todo = Todo {
            id: 1,
            owner_id: OwnerId::new("u1"),
            title: "Buy milk".to_string(),
            is_completed: false,
            created_at: 10,
            updated_at: 10,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["ownerId"], "u1");
        assert_eq!(json["isCompleted"], false);
    }
}
