//! CLI Utilities Module
//!
//! Formatting helpers used by the shell's renderer.

use std::path::{Path, PathBuf};
use std::time::Duration;

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Short form of the current directory for the prompt
///
/// `~` for home, `~/rel` beneath home (only the last two components once the
/// relative part grows past 30 characters), and `.../parent/name` for other
/// paths longer than 35 characters.
pub fn abbreviate_path(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home {
        if path == home {
            return "~".to_string();
        }
        if let Ok(relative) = path.strip_prefix(home) {
            let relative_str = relative.display().to_string();
            if relative_str.chars().count() > 30 {
                return format!("~/.../{}", last_components(relative, 2));
            }
            return format!("~/{}", relative_str);
        }
    }

    let full = path.display().to_string();
    if full.chars().count() > 35 {
        let parts = path.components().count();
        if parts > 2 {
            return format!(".../{}", last_components(path, 2));
        }
        return path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or(full);
    }
    full
}

fn last_components(path: &Path, n: usize) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    let start = parts.len().saturating_sub(n);
    parts[start..].iter().collect::<PathBuf>().display().to_string()
}

/// Format an elapsed time the way the shell reports request durations
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Spinner frame for a tick counter
pub fn spinner_frame(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Create a box around text lines
pub fn create_text_box(lines: &[String]) -> Vec<String> {
    if lines.is_empty() {
        return vec![];
    }

    let max_width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let mut result = Vec::with_capacity(lines.len() + 2);

    result.push(format!("╭{}╮", "─".repeat(max_width + 2)));
    for line in lines {
        let padding = max_width - line.chars().count();
        result.push(format!("│ {}{} │", line, " ".repeat(padding)));
    }
    result.push(format!("╰{}╯", "─".repeat(max_width + 2)));

    result
}
