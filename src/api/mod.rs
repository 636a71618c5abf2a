//! API module
//!
//! HTTP surface: routing and request/response DTOs.

pub mod routes;

pub use routes::create_router;
