pub mod api;
pub mod config;
pub mod error;
pub mod ids;

pub use error::GeoMcpError;
pub use ids::*;
