//! Storage layer for the Fiken CLI
//!
//! Handles the TOML configuration file and secret storage (API token and
//! default company) behind a pluggable backend.

use crate::error::StorageError;

pub mod config;
pub mod credentials;

type Result<T> = std::result::Result<T, StorageError>;
