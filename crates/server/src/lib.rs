//! HTTP API server for the locker.
//!
//! This crate provides the HTTP surface:
//! - Password login issuing session tokens
//! - Multipart file upload with content validation
//! - File listing, deletion, and folder management
//! - Stats and upload history over full storage scans
//! - Static asset serving for unmatched GET paths

pub mod assets;
pub mod auth;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod ratelimit;
pub mod response;
pub mod routes;
pub mod scan;
pub mod sessions;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use response::Reply;
pub use routes::create_router;
pub use sessions::SessionStore;
pub use state::AppState;
