//! Commands Layer
//!
//! Operations behind the HTTP routes, independent of the transport.

mod crud;
mod envelope;
mod photo_cmd;
mod pokemon_cmd;
mod review_cmd;
mod upload_cmd;

pub use crud::*;
pub use envelope::ApiResponse;
pub use photo_cmd::*;
pub use pokemon_cmd::*;
pub use review_cmd::*;
pub use upload_cmd::*;
