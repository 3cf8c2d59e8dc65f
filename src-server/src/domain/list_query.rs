//! List Query
//!
//! Optional filter plus sort key/order shared by every list endpoint.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring on the feature's display field
    #[serde(default)]
    pub filter: Option<String>,
    /// Column name, snake_case or camelCase
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl ListQuery {
    pub fn filtered(filter: &str) -> Self {
        Self {
            filter: Some(filter.to_string()),
            ..Default::default()
        }
    }

    pub fn sorted(sort: &str, order: SortOrder) -> Self {
        Self {
            filter: None,
            sort: Some(sort.to_string()),
            order,
        }
    }

    /// Resolve the sort key against the columns a table allows
    pub fn sort_column(&self, allowed: &[&'static str]) -> DomainResult<&'static str> {
        let Some(requested) = self.sort.as_deref() else {
            return Ok("created_at");
        };
        let normalized = to_snake_case(requested);
        allowed
            .iter()
            .copied()
            .find(|column| *column == normalized)
            .ok_or_else(|| {
                DomainError::invalid(format!(
                    "Cannot sort by '{}'; expected one of {}",
                    requested,
                    allowed.join(", ")
                ))
            })
    }

    /// LIKE pattern for the filter, or None when there is nothing to match
    pub fn like_pattern(&self) -> Option<String> {
        let needle = self.filter.as_deref()?.trim();
        if needle.is_empty() {
            return None;
        }
        let mut escaped = String::with_capacity(needle.len() + 2);
        escaped.push('%');
        for ch in needle.to_lowercase().chars() {
            if matches!(ch, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(ch);
        }
        escaped.push('%');
        Some(escaped)
    }
}

fn to_snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for ch in input.trim().chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
