//! Business logic between the CLI and the API client

pub mod auth;
pub mod services;
