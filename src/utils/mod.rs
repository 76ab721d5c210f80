//! Utils module - Shared utilities and helpers

/// Logger setup and verbose output
pub mod logging;

/// Text truncation and amount formatting
pub mod text;

/// Input validation for arguments and configuration values
pub mod validation;
