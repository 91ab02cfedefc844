//! REST API for the store.
//!
//! This module provides the HTTP surface of the node:
//! - key-value operations (store, fetch, remove),
//! - cluster membership control (join, remove, stats),
//! - health and status endpoints.
//!
//! The API uses hyper 1.x directly with a small hand-rolled router; each
//! connection is served on its own task, and handlers receive the shared
//! [`AppState`] with the injected consensus and storage handles.

mod error;
pub mod handlers;
mod request;
mod response;
mod router;
mod server;
mod state;

pub use error::ApiError;
pub use server::{ApiServer, ServerConfig, ShutdownHandle};
pub use state::AppState;
