//! Filesystem tools backing the shell's local commands.

pub mod file_system;

pub use file_system::{validate_name, DirEntry, Workspace};
