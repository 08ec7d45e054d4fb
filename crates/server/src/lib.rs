//! geomcp server: Google Maps geolocation tools behind an MCP streamable
//! HTTP endpoint.

pub mod config;
pub mod protocol;
pub mod provider;
pub mod routes;
pub mod session;
pub mod stream;
pub mod tools;

pub use routes::{build_router, AppState, LEGACY_SESSION_HEADER, SESSION_HEADER};
