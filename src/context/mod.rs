pub mod project_context;

// Re-export the main context builder for convenience
pub use project_context::{find_file_references, truncate_chars, ProjectContext};
