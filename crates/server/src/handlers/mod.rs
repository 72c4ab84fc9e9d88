//! HTTP request handlers.

pub mod auth;
pub mod common;
pub mod files;
pub mod folders;
pub mod history;
pub mod stats;
pub mod upload;

pub use auth::*;
pub use common::*;
pub use files::*;
pub use folders::*;
pub use history::*;
pub use stats::*;
pub use upload::*;
