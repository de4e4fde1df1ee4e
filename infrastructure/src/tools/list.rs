//! Directory tree rendering: listFiles

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use toolbelt_domain::{ToolError, ToolResult};

/// Tool name constant
pub const LIST_FILES: &str = "listFiles";

/// Execute the listFiles tool — render a recursive, depth-first directory
/// tree with box-drawing glyphs and file/folder markers.
///
/// Exclusion globs use gitignore semantics (directory-aware, wildcard
/// segments) and are evaluated against paths relative to the process
/// working directory, like ignore-file entries. A directory whose
/// canonical path has already been visited is skipped, so symlink cycles
/// terminate instead of recursing forever.
pub fn execute_list_files(
    dir_path: &str,
    prefix: &str,
    ignore_globs: Option<&[String]>,
) -> Result<ToolResult, ToolError> {
    let matcher = match ignore_globs {
        Some(globs) if !globs.is_empty() => Some(build_matcher(globs)?),
        _ => None,
    };

    let mut visited = HashSet::new();
    let tree = render_tree(Path::new(dir_path), prefix, matcher.as_ref(), &mut visited)
        .map_err(|e| ToolError::io(format!("Error listing directory structure: {e}")))?;

    Ok(ToolResult::success(LIST_FILES).with_message(tree))
}

fn build_matcher(globs: &[String]) -> Result<Gitignore, ToolError> {
    let cwd = std::env::current_dir()
        .map_err(|e| ToolError::io(format!("Error resolving working directory: {e}")))?;

    let mut builder = GitignoreBuilder::new(&cwd);
    for glob in globs {
        builder
            .add_line(None, glob)
            .map_err(|e| ToolError::validation(format!("Invalid ignore pattern '{glob}': {e}")))?;
    }
    builder
        .build()
        .map_err(|e| ToolError::validation(format!("Invalid ignore patterns: {e}")))
}

fn render_tree(
    dir: &Path,
    prefix: &str,
    matcher: Option<&Gitignore>,
    visited: &mut HashSet<PathBuf>,
) -> std::io::Result<String> {
    if let Ok(canonical) = dir.canonicalize() {
        if !visited.insert(canonical) {
            // Already rendered through another path (symlink cycle).
            return Ok(String::new());
        }
    }

    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut result = String::new();
    let count = entries.len();

    for (i, entry) in entries.iter().enumerate() {
        let is_last = i + 1 == count;
        let current_prefix = format!("{prefix}{}", if is_last { "└── " } else { "├── " });
        let next_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });

        let path = entry.path();
        let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);

        if let Some(matcher) = matcher {
            if matcher.matched_path_or_any_parents(&path, is_dir).is_ignore() {
                continue;
            }
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if is_dir {
            result.push_str(&format!("{current_prefix}📁 {name}\n"));
            result.push_str(&render_tree(&path, &next_prefix, matcher, visited)?);
        } else {
            result.push_str(&format!("{current_prefix}📄 {name}\n"));
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_tree_renders_files_before_subdirectory_contents() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), "b").unwrap();

        let result = execute_list_files(dir.path().to_str().unwrap(), "", None).unwrap();
        let tree = result.message.unwrap();

        let a_pos = tree.find("📄 a.txt").unwrap();
        let sub_pos = tree.find("📁 sub").unwrap();
        let b_pos = tree.find("📄 b.txt").unwrap();
        assert!(a_pos < sub_pos);
        assert!(sub_pos < b_pos);
        // The nested entry is indented under the last top-level entry.
        assert!(tree.contains("└── 📁 sub"));
        assert!(tree.contains("    └── 📄 b.txt"));
    }

    #[test]
    fn test_glyphs_for_middle_and_last_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("one.txt"), "1").unwrap();
        fs::write(dir.path().join("two.txt"), "2").unwrap();

        let result = execute_list_files(dir.path().to_str().unwrap(), "", None).unwrap();
        let tree = result.message.unwrap();

        assert!(tree.contains("├── 📄 one.txt"));
        assert!(tree.contains("└── 📄 two.txt"));
    }

    #[test]
    fn test_ignore_globs_skip_entries() {
        // Built under the working directory so ignore-file matching,
        // which is cwd-relative, applies to the rendered paths.
        let dir = tempfile::Builder::new()
            .prefix(".listfiles-test-")
            .tempdir_in(".")
            .unwrap();
        fs::write(dir.path().join("keep.txt"), "k").unwrap();
        fs::write(dir.path().join("skip.log"), "s").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules").join("dep.js"), "d").unwrap();

        let globs = vec!["*.log".to_string(), "node_modules/".to_string()];
        let rel = dir.path().strip_prefix(".").unwrap_or(dir.path());
        let result = execute_list_files(rel.to_str().unwrap(), "", Some(&globs)).unwrap();
        let tree = result.message.unwrap();

        assert!(tree.contains("keep.txt"));
        assert!(!tree.contains("skip.log"));
        assert!(!tree.contains("node_modules"));
        assert!(!tree.contains("dep.js"));
    }

    #[test]
    fn test_missing_directory_raises_io() {
        let err = execute_list_files("/nonexistent/directory", "", None).unwrap_err();

        assert_eq!(err.code(), "IO");
        assert!(
            err.to_string()
                .starts_with("Error listing directory structure: ")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("file.txt"), "f").unwrap();
        // sub/loop -> the root being listed.
        std::os::unix::fs::symlink(dir.path(), sub.join("loop")).unwrap();

        let result = execute_list_files(dir.path().to_str().unwrap(), "", None).unwrap();
        let tree = result.message.unwrap();

        assert!(tree.contains("📄 file.txt"));
        // The cycle is rendered as a directory entry but not recursed.
        assert_eq!(tree.matches("file.txt").count(), 1);
    }
}
