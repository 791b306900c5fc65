//! Input/output operations and error handling

/// Command-line interface and run orchestration
pub mod cli;
/// Model constants and runtime configuration defaults
pub mod configuration;
/// Error types and context helpers
pub mod error;
/// Template loading, superposition rendering and PNG export
pub mod image;
/// Terminal progress display for generation runs
pub mod progress;
