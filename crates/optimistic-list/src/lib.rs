//! Optimistic List
//!
//! Shows the intended result of a list mutation immediately and then replaces
//! it with the authoritative list once the round trip completes.
//!
//! - action: the pure reducer (`apply`) and render-time dedupe (`reconcile`)
//! - list: the Idle / Speculative / Reconciling state machine
//! - reconciler: async driver that runs a mutation and the unconditional refetch

mod action;
mod list;
mod reconciler;

pub use action::{apply, reconcile, Keyed, ListAction};
pub use list::{Busy, OptimisticList, Phase};
pub use reconciler::{Dispatched, ListSource, Reconciler};
