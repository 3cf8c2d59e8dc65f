//! List Actions
//!
//! The speculative patch vocabulary and the pure functions over it.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Anything that can live in an optimistic list
pub trait Keyed: Clone {
    /// Identifier assigned by the authoritative store
    type Key: Eq + Hash + Clone + Debug;

    fn key(&self) -> Self::Key;
}

/// A speculative change to a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ListAction<T: Keyed> {
    Add { item: T },
    Delete { id: T::Key },
    Update { id: T::Key, item: T },
    /// Any kind this build does not recognize
    #[serde(other)]
    Unknown,
}

impl<T: Keyed> ListAction<T> {
    /// Id of the item this action touches
    pub fn target(&self) -> Option<T::Key> {
        match self {
            ListAction::Add { item } => Some(item.key()),
            ListAction::Delete { id } | ListAction::Update { id, .. } => Some(id.clone()),
            ListAction::Unknown => None,
        }
    }
}

/// Apply a speculative action to a list without touching the input
pub fn apply<T: Keyed>(base: &[T], action: &ListAction<T>) -> Vec<T> {
    match action {
        ListAction::Add { item } => {
            let key = item.key();
            if base.iter().any(|existing| existing.key() == key) {
                return base.to_vec();
            }
            let mut next = Vec::with_capacity(base.len() + 1);
            next.push(item.clone());
            next.extend_from_slice(base);
            next
        }
        ListAction::Delete { id } => base
            .iter()
            .filter(|existing| existing.key() != *id)
            .cloned()
            .collect(),
        ListAction::Update { id, item } => base
            .iter()
            .map(|existing| {
                if existing.key() == *id {
                    item.clone()
                } else {
                    existing.clone()
                }
            })
            .collect(),
        ListAction::Unknown => base.to_vec(),
    }
}

/// Drop repeated ids, keeping the first occurrence and the given order
pub fn reconcile<T: Keyed>(confirmed: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(confirmed.len());
    confirmed
        .iter()
        .filter(|item| seen.insert(item.key()))
        .cloned()
        .collect()
}
