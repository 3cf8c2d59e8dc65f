//! Optimistic List State
//!
//! Holds the last confirmed snapshot plus at most one speculative patch.

use thiserror::Error;

use crate::action::{apply, reconcile, Keyed, ListAction};

/// Where the list is in the mutation round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Showing the last confirmed state
    #[default]
    Idle,
    /// Patch visible, mutation in flight
    Speculative,
    /// Mutation returned, refetch in flight
    Reconciling,
}

/// Returned when a mutation is started while another is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a mutation is already pending for this list")]
pub struct Busy;

#[derive(Debug, Clone)]
pub struct OptimisticList<T: Keyed> {
    confirmed: Vec<T>,
    pending: Option<ListAction<T>>,
    phase: Phase,
    /// Bumped whenever the confirmed snapshot or the patch changes
    generation: u64,
}

impl<T: Keyed> Default for OptimisticList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Keyed> OptimisticList<T> {
    pub fn new(confirmed: Vec<T>) -> Self {
        Self {
            confirmed,
            pending: None,
            phase: Phase::Idle,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while edit controls should stay disabled
    pub fn is_pending(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// The stored authoritative snapshot, duplicates included
    pub fn confirmed(&self) -> &[T] {
        &self.confirmed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> Option<&ListAction<T>> {
        self.pending.as_ref()
    }

    /// What the interface should render right now
    pub fn view(&self) -> Vec<T> {
        match &self.pending {
            Some(action) => reconcile(&apply(&self.confirmed, action)),
            None => reconcile(&self.confirmed),
        }
    }

    /// Idle -> Speculative
    pub fn begin(&mut self, action: ListAction<T>) -> Result<(), Busy> {
        if self.phase != Phase::Idle {
            return Err(Busy);
        }
        self.pending = Some(action);
        self.phase = Phase::Speculative;
        self.generation += 1;
        Ok(())
    }

    /// Speculative -> Reconciling, whatever the mutation outcome was
    pub fn settle(&mut self) {
        if self.phase == Phase::Speculative {
            self.phase = Phase::Reconciling;
        }
    }

    /// Any phase -> Idle with the refetched list stored verbatim
    pub fn resolve(&mut self, confirmed: Vec<T>) {
        self.confirmed = confirmed;
        self.pending = None;
        self.phase = Phase::Idle;
        self.generation += 1;
    }

    /// Store a snapshot fetched at `generation`, unless the list moved on since.
    ///
    /// Returns whether the snapshot was stored.
    pub fn resolve_if_current(&mut self, generation: u64, confirmed: Vec<T>) -> bool {
        if self.phase != Phase::Idle || self.generation != generation {
            return false;
        }
        self.resolve(confirmed);
        true
    }

    /// Any phase -> Idle keeping the last confirmed list
    pub fn abandon(&mut self) {
        self.pending = None;
        self.phase = Phase::Idle;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Todo {
        id: i64,
        title: &'static str,
    }

    impl Keyed for Todo {
        type Key = i64;

        fn key(&self) -> i64 {
            self.id
        }
    }

    #[test]
    fn test_full_cycle() {
        let mut list = OptimisticList::<Todo>::default();
        assert_eq!(list.phase(), Phase::Idle);

        list.begin(ListAction::Add { item: Todo { id: -1, title: "Buy milk" } }).unwrap();
        assert_eq!(list.phase(), Phase::Speculative);
        assert_eq!(list.view(), vec![Todo { id: -1, title: "Buy milk" }]);
        assert!(list.confirmed().is_empty());

        list.settle();
        assert_eq!(list.phase(), Phase::Reconciling);
        assert_eq!(list.view().len(), 1);

        list.resolve(vec![Todo { id: 10, title: "Buy milk" }]);
        assert_eq!(list.phase(), Phase::Idle);
        assert!(list.pending().is_none());
        assert_eq!(list.view(), vec![Todo { id: 10, title: "Buy milk" }]);
    }

    #[test]
    fn test_failed_mutation_reverts_on_refetch() {
        let mut list = OptimisticList::<Todo>::default();
        list.begin(ListAction::Add { item: Todo { id: 1, title: "Buy milk" } }).unwrap();
        assert_eq!(list.view(), vec![Todo { id: 1, title: "Buy milk" }]);

        list.settle();
        list.resolve(Vec::new());
        assert!(list.view().is_empty());
    }

    #[test]
    fn test_second_mutation_is_busy() {
        let mut list = OptimisticList::new(vec![Todo { id: 1, title: "a" }]);
        list.begin(ListAction::Delete { id: 1 }).unwrap();
        assert_eq!(list.begin(ListAction::Delete { id: 1 }), Err(Busy));

        list.settle();
        assert_eq!(list.begin(ListAction::Delete { id: 1 }), Err(Busy));
    }

    #[test]
    fn test_view_dedupes_without_mutating_snapshot() {
        let mut list = OptimisticList::default();
        list.resolve(vec![
            Todo { id: 3, title: "slow create" },
            Todo { id: 3, title: "fast refresh" },
        ]);

        assert_eq!(list.view(), vec![Todo { id: 3, title: "slow create" }]);
        assert_eq!(list.confirmed().len(), 2);
    }

    #[test]
    fn test_abandon_restores_confirmed() {
        let mut list = OptimisticList::new(vec![Todo { id: 1, title: "keep" }]);
        list.begin(ListAction::Delete { id: 1 }).unwrap();
        assert!(list.view().is_empty());

        list.abandon();
        assert!(!list.is_pending());
        assert_eq!(list.view(), vec![Todo { id: 1, title: "keep" }]);
    }

    #[test]
    fn test_snapshot_from_an_older_generation_is_refused() {
        let mut list = OptimisticList::new(vec![Todo { id: 1, title: "a" }]);
        let seen = list.generation();

        list.begin(ListAction::Delete { id: 1 }).unwrap();
        list.settle();
        list.resolve(Vec::new());
        assert_eq!(list.phase(), Phase::Idle);

        assert!(!list.resolve_if_current(seen, vec![Todo { id: 1, title: "a" }]));
        assert!(list.view().is_empty());

        let now = list.generation();
        assert!(list.resolve_if_current(now, vec![Todo { id: 2, title: "b" }]));
        assert_eq!(list.view(), vec![Todo { id: 2, title: "b" }]);
    }
}
