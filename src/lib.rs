//! Activity Hub Client
//!
//! - commands: typed wrappers over the HTTP API
//! - store: per-feature optimistic lists a UI binds to
//! - markdown: note rendering

pub mod commands;
pub mod error;
pub mod markdown;
pub mod models;
pub mod store;

pub use commands::ApiClient;
pub use error::{ClientError, ClientResult};
pub use store::FeatureStore;
