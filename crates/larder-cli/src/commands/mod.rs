//! Command implementations.

pub mod analyze;
pub mod bill;
pub mod chef;
pub mod pantry;

/// Shared result type for command handlers.
pub type CliResult = Result<(), Box<dyn std::error::Error>>;
