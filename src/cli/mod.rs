//! CLI Terminal Interface Module
//!
//! The interactive project assistant shell.
//!
//! ## Module Structure
//!
//! - `config` - Environment-driven configuration
//! - `commands` - Command definitions and line parsing
//! - `render` - Terminal output
//! - `utils` - Formatting helpers
//! - `shell` - Main read-dispatch-print loop

pub mod commands;
pub mod config;
pub mod render;
pub mod shell;
pub mod utils;

// Re-export main types for convenience
pub use commands::{CliCommand, CommandParser, CommandResult, ParsedLine};
pub use config::{ApiConfig, CliConfig};
pub use render::Renderer;
pub use shell::{Outcome, Shell};
