//! Fiken v2 API access: rate limiting, request execution and pagination

pub mod client;
pub mod endpoints;
pub mod models;
pub mod pagination;
pub mod rate_limiter;
