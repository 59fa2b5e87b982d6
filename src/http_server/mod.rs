//! # HTTP Server Module
//!
//! The key-gated read API over the provider datasets.
//!
//! # Endpoints
//!
//! - `/`, `/status` - HTML landing and status pages
//! - `/api` - Discovery document
//! - `/api/:key` - Key inspection
//! - `/api/:key/:provider/*` - Timetable reads, admission-gated

pub mod errors;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;

pub use errors::{ApiError, ApiResult, ErrorBody};
pub use routes::{RouteRecorder, RouteTable};
pub use server::HttpServer;
pub use state::{AppState, Clock, ServiceInfo};
