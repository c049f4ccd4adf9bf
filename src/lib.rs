//! plexcode - interactive project assistant shell
//!
//! A small read-eval-print loop with filesystem commands (`ls`, `tree`,
//! `cd`, `pwd`, `touch`, `mkdir`, `rm`) where any other line is sent as a
//! question to the Perplexity chat-completions API, together with a short
//! description of the current directory.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use plexcode::cli::{CliConfig, Shell};
//! use plexcode::llm::PerplexityClient;
//! use plexcode::tools::Workspace;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = CliConfig::from_env()?;
//! let client = PerplexityClient::new(&config.api)?;
//! let workspace = Workspace::from_process_cwd()?;
//!
//! let mut shell = Shell::new(config, workspace, client);
//! shell.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod context;
pub mod error;
pub mod llm;
pub mod tools;

// Re-export commonly used types for convenience
pub use cli::{CliConfig, Shell};
pub use error::{ApiError, ConfigError, FsError, ShellError};
pub use llm::{Completion, CompletionProvider, Message, PerplexityClient};
pub use tools::Workspace;
