use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::FsError;

const TREE_SPACE: &str = "    ";
const TREE_BRANCH: &str = "│   ";
const TREE_TEE: &str = "├── ";
const TREE_LAST: &str = "└── ";

/// Filesystem state of the shell: the in-process current directory pointer
/// and the handlers that operate relative to it.
///
/// The pointer is independent of the OS process working directory; only
/// [`Workspace::change_dir`] moves it.
#[derive(Debug, Clone)]
pub struct Workspace {
    current_dir: PathBuf,
}

/// A single directory entry as shown by `ls` and the query context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntry {
    /// Name with a trailing `/` for directories
    pub fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl Workspace {
    /// Create a workspace rooted at the given directory
    pub fn new(current_dir: PathBuf) -> Self {
        Self { current_dir }
    }

    /// Create a workspace at the process working directory
    pub fn from_process_cwd() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Print working directory
    pub fn pwd(&self) -> String {
        self.current_dir.display().to_string()
    }

    /// Non-hidden entries of the current directory, sorted by name
    pub fn entries(&self) -> Result<Vec<DirEntry>, FsError> {
        read_visible_entries(&self.current_dir)
            .map_err(|e| FsError::from_io("listing", &self.pwd(), self.current_dir.clone(), e))
    }

    /// Flat listing of the current directory
    pub fn list(&self) -> Result<String, FsError> {
        let entries = self.entries()?;
        if entries.is_empty() {
            return Ok("(empty)".to_string());
        }
        Ok(entries
            .iter()
            .map(DirEntry::display_name)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Indented tree of the current directory, `max_depth` levels deep
    pub fn tree(&self, max_depth: usize) -> Result<String, FsError> {
        if !self.current_dir.is_dir() {
            return Err(FsError::NotFound(self.pwd()));
        }

        let mut lines = vec![self.pwd()];
        build_tree(&self.current_dir, "", 1, max_depth, &mut lines);
        if lines.len() == 1 {
            lines[0] = format!("{} (empty)", self.pwd());
        }
        Ok(lines.join("\n"))
    }

    /// Move the current directory pointer. The pointer is untouched on failure.
    pub fn change_dir(&mut self, target: &str) -> Result<(), FsError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(FsError::MissingArgument("cd <directory>"));
        }

        let resolved = self.resolve(target);
        let metadata = match fs::metadata(&resolved) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(FsError::PermissionDenied(resolved))
            }
            Err(_) => {
                return Err(FsError::DirectoryNotFound {
                    input: target.to_string(),
                    resolved,
                })
            }
        };
        if !metadata.is_dir() {
            return Err(FsError::NotADirectory {
                input: target.to_string(),
                resolved,
            });
        }
        // A directory we cannot enumerate is as good as one we cannot enter
        if let Err(e) = fs::read_dir(&resolved) {
            return Err(FsError::from_io("entering", target, resolved, e));
        }

        debug!(from = %self.current_dir.display(), to = %resolved.display(), "changing directory");
        self.current_dir = resolved;
        Ok(())
    }

    /// Create an empty file in the current directory
    pub fn touch(&self, name: &str) -> Result<String, FsError> {
        let path = self.child_path(name, "touch <filename>")?;
        if path.symlink_metadata().is_ok() {
            return Err(FsError::AlreadyExists(name.to_string()));
        }
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| FsError::from_io("creating file", name, path.clone(), e))?;
        info!(path = %path.display(), "created file");
        Ok(format!("File created: {}", name))
    }

    /// Create a directory in the current directory
    pub fn mkdir(&self, name: &str) -> Result<String, FsError> {
        let path = self.child_path(name, "mkdir <dirname>")?;
        if path.symlink_metadata().is_ok() {
            return Err(FsError::AlreadyExists(name.to_string()));
        }
        fs::create_dir(&path)
            .map_err(|e| FsError::from_io("creating directory", name, path.clone(), e))?;
        info!(path = %path.display(), "created directory");
        Ok(format!("Directory created: {}", name))
    }

    /// Remove a file, a symlink or an empty directory
    pub fn remove(&self, name: &str) -> Result<String, FsError> {
        let path = self.child_path(name, "rm <file_or_empty_dir_name>")?;
        let metadata = match path.symlink_metadata() {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FsError::NotFound(name.to_string()))
            }
            Err(e) => return Err(FsError::from_io("removing", name, path, e)),
        };

        let message = if metadata.file_type().is_symlink() {
            let broken = fs::metadata(&path).is_err();
            fs::remove_file(&path).map_err(|e| FsError::from_io("removing", name, path.clone(), e))?;
            if broken {
                format!("Removed broken symbolic link: {}", name)
            } else {
                format!("Removed symbolic link: {}", name)
            }
        } else if metadata.is_dir() {
            let mut children =
                fs::read_dir(&path).map_err(|e| FsError::from_io("removing", name, path.clone(), e))?;
            if children.next().is_some() {
                return Err(FsError::DirectoryNotEmpty(name.to_string()));
            }
            fs::remove_dir(&path).map_err(|e| FsError::from_io("removing", name, path.clone(), e))?;
            format!("Removed empty directory: {}", name)
        } else {
            fs::remove_file(&path).map_err(|e| FsError::from_io("removing", name, path.clone(), e))?;
            format!("Removed file: {}", name)
        };

        info!(path = %path.display(), "removed");
        Ok(message)
    }

    /// Resolve a user path against the current directory without touching the disk
    pub fn resolve(&self, target: &str) -> PathBuf {
        let home = dirs::home_dir();
        let expanded = match (target, home) {
            ("~" | "$HOME", Some(home)) => home,
            (t, Some(home)) if t.starts_with("~/") => home.join(&t[2..]),
            (t, _) => PathBuf::from(t),
        };

        let joined = if expanded.is_absolute() {
            expanded
        } else {
            self.current_dir.join(expanded)
        };
        normalize(&joined)
    }

    /// Path of a direct child of the current directory, after name validation
    fn child_path(&self, name: &str, usage: &'static str) -> Result<PathBuf, FsError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FsError::MissingArgument(usage));
        }
        validate_name(name)?;
        Ok(self.current_dir.join(name))
    }
}

/// Names handled by touch/mkdir/rm must stay inside the current directory
pub fn validate_name(name: &str) -> Result<(), FsError> {
    if name == "." || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(FsError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Lexically normalize a path, resolving `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, like `cd /..`
                if !result.pop() && !result.has_root() {
                    result.push(component);
                }
            }
            other => result.push(other),
        }
    }
    result
}

fn read_visible_entries(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        // Follows symlinks so a link to a directory lists as a directory
        let is_dir = entry.path().is_dir();
        entries.push(DirEntry { name, is_dir });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn build_tree(dir: &Path, prefix: &str, level: usize, max_depth: usize, lines: &mut Vec<String>) {
    // Symlinks are listed but never descended into
    let children: Vec<walkdir::DirEntry> = match WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(children) => children
            .into_iter()
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .collect(),
        Err(_) => {
            lines.push(format!("{}{}[error reading directory]", prefix, TREE_LAST));
            return;
        }
    };

    let count = children.len();
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { TREE_LAST } else { TREE_TEE };
        let is_dir = child.file_type().is_dir();
        let name = child.file_name().to_string_lossy();
        lines.push(format!(
            "{}{}{}{}",
            prefix,
            connector,
            name,
            if is_dir { "/" } else { "" }
        ));

        if is_dir && level < max_depth {
            let extension = if is_last { TREE_SPACE } else { TREE_BRANCH };
            build_tree(
                child.path(),
                &format!("{}{}", prefix, extension),
                level + 1,
                max_depth,
                lines,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path().to_path_buf());
        (temp_dir, workspace)
    }

    #[test]
    fn test_touch_then_list() {
        let (_temp_dir, workspace) = workspace();
        assert_eq!(workspace.list().unwrap(), "(empty)");

        let message = workspace.touch("notes.txt").unwrap();
        assert_eq!(message, "File created: notes.txt");
        assert!(workspace.list().unwrap().lines().any(|l| l == "notes.txt"));
    }

    #[test]
    fn test_touch_existing_fails() {
        let (_temp_dir, workspace) = workspace();
        workspace.touch("a.txt").unwrap();
        assert!(matches!(workspace.touch("a.txt"), Err(FsError::AlreadyExists(_))));
    }

    #[test]
    fn test_list_marks_directories_and_hides_dotfiles() {
        let (temp_dir, workspace) = workspace();
        fs::create_dir(temp_dir.path().join("src")).unwrap();
        fs::write(temp_dir.path().join("Cargo.toml"), "").unwrap();
        fs::write(temp_dir.path().join(".hidden"), "").unwrap();

        let listing = workspace.list().unwrap();
        assert_eq!(listing, "Cargo.toml\nsrc/");
    }

    #[test]
    fn test_mkdir_then_rm() {
        let (temp_dir, workspace) = workspace();
        workspace.mkdir("build").unwrap();
        assert!(temp_dir.path().join("build").is_dir());

        let message = workspace.remove("build").unwrap();
        assert_eq!(message, "Removed empty directory: build");
        assert!(!temp_dir.path().join("build").exists());
    }

    #[test]
    fn test_rm_non_empty_directory_fails() {
        let (temp_dir, workspace) = workspace();
        fs::create_dir(temp_dir.path().join("full")).unwrap();
        fs::write(temp_dir.path().join("full").join("x"), "x").unwrap();

        assert!(matches!(workspace.remove("full"), Err(FsError::DirectoryNotEmpty(_))));
        assert!(temp_dir.path().join("full").exists());
    }

    #[test]
    fn test_rm_missing_fails() {
        let (_temp_dir, workspace) = workspace();
        let err = workspace.remove("ghost").unwrap_err();
        assert_eq!(err.to_string(), "File or directory not found: ghost");
    }

    #[cfg(unix)]
    #[test]
    fn test_rm_broken_symlink() {
        let (temp_dir, workspace) = workspace();
        std::os::unix::fs::symlink(temp_dir.path().join("nowhere"), temp_dir.path().join("dangling"))
            .unwrap();
        assert_eq!(
            workspace.remove("dangling").unwrap(),
            "Removed broken symbolic link: dangling"
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        let (_temp_dir, workspace) = workspace();
        for name in ["../escape", "a/b", "a\\b", ".", ".."] {
            assert!(matches!(workspace.touch(name), Err(FsError::InvalidName(_))), "{}", name);
            assert!(matches!(workspace.remove(name), Err(FsError::InvalidName(_))), "{}", name);
        }
        assert!(matches!(workspace.mkdir(""), Err(FsError::MissingArgument(_))));
    }

    #[test]
    fn test_change_dir() {
        let (temp_dir, mut workspace) = workspace();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        workspace.change_dir("sub").unwrap();
        assert_eq!(workspace.current_dir(), temp_dir.path().join("sub"));

        workspace.change_dir("..").unwrap();
        assert_eq!(workspace.current_dir(), temp_dir.path());
    }

    #[test]
    fn test_change_dir_failures_keep_pointer() {
        let (temp_dir, mut workspace) = workspace();
        fs::write(temp_dir.path().join("file.txt"), "").unwrap();

        assert!(matches!(
            workspace.change_dir("missing"),
            Err(FsError::DirectoryNotFound { .. })
        ));
        assert!(matches!(
            workspace.change_dir("file.txt"),
            Err(FsError::NotADirectory { .. })
        ));
        assert!(matches!(workspace.change_dir(""), Err(FsError::MissingArgument(_))));
        assert_eq!(workspace.current_dir(), temp_dir.path());
    }

    #[test]
    fn test_resolve_normalizes() {
        let workspace = Workspace::new(PathBuf::from("/a/b"));
        assert_eq!(workspace.resolve("../c/./d"), PathBuf::from("/a/c/d"));
        assert_eq!(workspace.resolve("/x/y/.."), PathBuf::from("/x"));
        assert_eq!(workspace.resolve("../../../.."), PathBuf::from("/"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(workspace.resolve("~"), home);
            assert_eq!(workspace.resolve("~/docs"), home.join("docs"));
        }
    }

    #[test]
    fn test_tree_rendering() {
        let (temp_dir, workspace) = workspace();
        fs::create_dir_all(temp_dir.path().join("src").join("cli")).unwrap();
        fs::write(temp_dir.path().join("src").join("main.rs"), "").unwrap();
        fs::write(temp_dir.path().join("README.md"), "").unwrap();
        fs::write(temp_dir.path().join(".git"), "").unwrap();

        let tree = workspace.tree(DEFAULT_DEPTH).unwrap();
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[0], workspace.pwd());
        assert_eq!(
            &lines[1..],
            &["├── README.md", "└── src/", "    ├── cli/", "    └── main.rs"]
        );
    }

    #[test]
    fn test_tree_depth_limit() {
        let (temp_dir, workspace) = workspace();
        fs::create_dir_all(temp_dir.path().join("a").join("b").join("c")).unwrap();

        let tree = workspace.tree(2).unwrap();
        assert!(tree.contains("b/"));
        assert!(!tree.contains("c/"));
    }

    #[cfg(unix)]
    #[test]
    fn test_tree_does_not_follow_symlink_cycles() {
        let (temp_dir, workspace) = workspace();
        let looped = temp_dir.path().join("looped");
        fs::create_dir(&looped).unwrap();
        std::os::unix::fs::symlink(&looped, looped.join("itself")).unwrap();

        let tree = workspace.tree(DEFAULT_DEPTH).unwrap();
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(&lines[1..], &["└── looped/", "    └── itself"]);
    }

    #[test]
    fn test_tree_empty() {
        let (_temp_dir, workspace) = workspace();
        assert!(workspace.tree(DEFAULT_DEPTH).unwrap().ends_with("(empty)"));
    }

    const DEFAULT_DEPTH: usize = crate::cli::config::DEFAULT_TREE_DEPTH;
}
