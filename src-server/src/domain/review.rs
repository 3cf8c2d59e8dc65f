//! Review Entity
//!
//! Reviews hang off a food photo or a pokemon and disappear with it.

use serde::{Deserialize, Serialize};

use super::entity::{check_text, DomainError, DomainResult, Entity, OwnerId, Validate};

pub const CONTENT_MAX: usize = 1000;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub owner_id: OwnerId,
    /// Id of the reviewed food photo or pokemon
    pub parent_id: i64,
    pub content: String,
    pub rating: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub content: String,
    pub rating: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
}

fn check_rating(rating: i64) -> DomainResult<()> {
    if (RATING_MIN..=RATING_MAX).contains(&rating) {
        Ok(())
    } else {
        Err(DomainError::invalid(format!(
            "Rating must be between {} and {}",
            RATING_MIN, RATING_MAX
        )))
    }
}

impl Validate for NewReview {
    fn validate(&self) -> DomainResult<()> {
        check_text("Review", &self.content, CONTENT_MAX)?;
        check_rating(self.rating)
    }
}

impl Validate for ReviewPatch {
    fn validate(&self) -> DomainResult<()> {
        if self.content.is_none() && self.rating.is_none() {
            return Err(DomainError::invalid("Nothing to update"));
        }
        if let Some(content) = &self.content {
            check_text("Review", content, CONTENT_MAX)?;
        }
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        Ok(())
    }
}

impl Entity for Review {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let low = NewReview { content: "meh".to_string(), rating: 0 };
        let high = NewReview { content: "wow".to_string(), rating: 6 };
        let fine = NewReview { content: "tasty".to_string(), rating: 5 };
        assert!(low.validate().is_err());
        assert!(high.validate().is_err());
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn test_patch_checks_present_fields() {
        let patch = ReviewPatch { content: None, rating: Some(9) };
        assert!(patch.validate().is_err());
        assert!(ReviewPatch::default().validate().is_err());
    }
}
