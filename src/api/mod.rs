//! HTTP API for the Medora portal.
//!
//! Stateless request handlers mapping URLs to persistence-gateway calls.

pub mod handlers;
pub mod routes;

pub use routes::configure;

use crate::storage::Storage;

/// Shared application state handed to every handler.
pub struct AppState {
    pub storage: Storage,
}
