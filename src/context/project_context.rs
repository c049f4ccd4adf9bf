use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::tools::Workspace;

/// Builds the system message that accompanies every query: where the user
/// is, what is around them, and the contents of files the query names.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    file_limit: usize,
    max_chars: usize,
}

impl ProjectContext {
    pub fn new(file_limit: usize, max_chars: usize) -> Self {
        Self {
            file_limit,
            max_chars,
        }
    }

    /// Render the context for a query issued from the given workspace
    pub fn build(&self, workspace: &Workspace, query: &str) -> String {
        let mut parts = vec![
            format!("Current Directory: {}", workspace.pwd()),
            "Available files/dirs in current directory (excluding hidden):".to_string(),
        ];

        match workspace.entries() {
            Ok(entries) if entries.is_empty() => parts.push("- (empty)".to_string()),
            Ok(entries) => {
                parts.extend(entries.iter().map(|e| format!("- {}", e.display_name())));
            }
            Err(e) => parts.push(format!("- Error accessing directory: {}", e)),
        }

        let referenced = find_file_references(workspace.current_dir(), query);
        let included: Vec<&String> = referenced.iter().take(self.file_limit).collect();
        if !included.is_empty() {
            debug!(files = ?included, "inlining referenced files");
            parts.push("\nRelevant File Content:".to_string());
            for name in included {
                match fs::read_to_string(workspace.current_dir().join(name)) {
                    Ok(content) if !content.is_empty() => {
                        parts.push(format!(
                            "\n--- {} ---\n{}\n--- End {} ---",
                            name,
                            truncate_chars(&content, self.max_chars),
                            name
                        ));
                    }
                    _ => parts.push(format!("\n(Could not read content of {})", name)),
                }
            }
        }

        parts.join("\n")
    }
}

/// Tokens shaped like `name.ext` that resolve to regular files, in order of appearance
pub fn find_file_references(dir: &Path, query: &str) -> Vec<String> {
    static FILE_REF: OnceLock<Regex> = OnceLock::new();
    let pattern = FILE_REF.get_or_init(|| Regex::new(r"[\w./-]+\.\w+").expect("valid regex"));

    let mut found: Vec<String> = Vec::new();
    for candidate in pattern.find_iter(query).map(|m| m.as_str()) {
        let candidate = candidate.trim_end_matches('.');
        if found.iter().any(|f| f == candidate) {
            continue;
        }
        if dir.join(candidate).is_file() {
            found.push(candidate.to_string());
        }
    }
    found
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_lists_entries() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("src")).unwrap();
        fs::write(temp_dir.path().join("cli.py"), "print('hi')").unwrap();
        let workspace = Workspace::new(temp_dir.path().to_path_buf());

        let context = ProjectContext::new(2, 1500).build(&workspace, "what is up");
        assert!(context.starts_with(&format!("Current Directory: {}", workspace.pwd())));
        assert!(context.contains("- cli.py"));
        assert!(context.contains("- src/"));
        assert!(!context.contains("Relevant File Content"));
    }

    #[test]
    fn test_context_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path().to_path_buf());
        let context = ProjectContext::new(2, 1500).build(&workspace, "hello");
        assert!(context.contains("- (empty)"));
    }

    #[test]
    fn test_context_inlines_referenced_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("cli.py"), "import typer").unwrap();
        let workspace = Workspace::new(temp_dir.path().to_path_buf());

        let context = ProjectContext::new(2, 1500).build(&workspace, "explain cli.py please");
        assert!(context.contains("--- cli.py ---\nimport typer\n--- End cli.py ---"));
    }

    #[test]
    fn test_context_respects_file_limit_and_truncation() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "x".repeat(20)).unwrap();
        fs::write(temp_dir.path().join("b.txt"), "b").unwrap();
        let workspace = Workspace::new(temp_dir.path().to_path_buf());

        let context = ProjectContext::new(1, 10).build(&workspace, "compare a.txt and b.txt");
        assert!(context.contains(&format!("{}...", "x".repeat(10))));
        assert!(!context.contains("--- b.txt ---"));
    }

    #[test]
    fn test_find_file_references() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("main.rs"), "").unwrap();
        let refs = find_file_references(temp_dir.path(), "look at main.rs, lib.rs and main.rs.");
        assert_eq!(refs, vec!["main.rs".to_string()]);
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé...");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
