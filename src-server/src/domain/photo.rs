//! Photo Entities
//!
//! Gallery photos and food photos share the same stored-image shape; food
//! photos additionally carry their reviews.

use serde::{Deserialize, Serialize};

use super::entity::{check_text, DomainError, DomainResult, Entity, OwnedEntity, OwnerId, Validate};
use super::review::Review;

pub const NAME_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub owner_id: OwnerId,
    pub name: String,
    /// Public URL of the stored object
    pub url: String,
    /// Object path inside the bucket
    pub storage_path: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPhoto {
    pub id: i64,
    pub owner_id: OwnerId,
    pub name: String,
    pub url: String,
    pub storage_path: String,
    pub created_at: i64,
    pub updated_at: i64,
    /// Newest first
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Create form for both photo kinds, filled in after the upload returns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub name: String,
    pub url: String,
    pub storage_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPatch {
    #[serde(default)]
    pub name: Option<String>,
}

impl Validate for NewPhoto {
    fn validate(&self) -> DomainResult<()> {
        check_text("Name", &self.name, NAME_MAX)?;
        if self.url.trim().is_empty() {
            return Err(DomainError::invalid("Photo URL is required"));
        }
        if self.storage_path.trim().is_empty() {
            return Err(DomainError::invalid("Storage path is required"));
        }
        Ok(())
    }
}

impl Validate for PhotoPatch {
    fn validate(&self) -> DomainResult<()> {
        match &self.name {
            Some(name) => check_text("Name", name, NAME_MAX),
            None => Err(DomainError::invalid("Nothing to update")),
        }
    }
}

impl Entity for Photo {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl OwnedEntity for Photo {
    type Draft = NewPhoto;
    type Patch = PhotoPatch;

    const NOUN: &'static str = "Photo";

    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}

impl Entity for FoodPhoto {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl OwnedEntity for FoodPhoto {
    type Draft = NewPhoto;
    type Patch = PhotoPatch;

    const NOUN: &'static str = "Food photo";

    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_photo_requires_upload_fields() {
        let draft = NewPhoto {
            name: "Sunset".to_string(),
            url: String::new(),
            storage_path: "u1/abc-sunset.png".to_string(),
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_patch_name_length() {
        let long = PhotoPatch { name: Some("x".repeat(NAME_MAX + 1)) };
        assert!(long.validate().is_err());
        let ok = PhotoPatch { name: Some("Beach".to_string()) };
        assert!(ok.validate().is_ok());
    }
}
