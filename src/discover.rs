//! Source file discovery.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::WalkDir;

use crate::config::Config;

/// Directories never worth descending into.
const SKIPPED_DIRS: &[&str] = &["__pycache__", "node_modules", "site-packages"];

/// Collect analyzable files under `root`, sorted by file name within each
/// directory so discovery order is stable.
///
/// A `root` that is a file is returned as-is when its extension matches.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let excluded = config.exclusion_set()?;
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // The root itself is always entered.
            if e.depth() == 0 {
                return true;
            }
            if !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if !config.include_hidden && name.starts_with('.') {
                return false;
            }
            if SKIPPED_DIRS.contains(&name.as_ref()) {
                return false;
            }
            !is_excluded(&excluded, root, e.path())
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !config.matches_extension(ext) {
            continue;
        }
        if is_excluded(&excluded, root, path) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

fn is_excluded(excluded: &GlobSet, root: &Path, path: &Path) -> bool {
    if excluded.is_empty() {
        return false;
    }
    let rel = path.strip_prefix(root).unwrap_or(path);
    excluded.is_match(rel) || excluded.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_recursive_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.py");
        touch(temp.path(), "a.py");
        touch(temp.path(), "notes.txt");
        touch(temp.path(), "pkg/mod.py");
        touch(temp.path(), "pkg/__pycache__/mod.py");
        touch(temp.path(), ".venv/lib.py");

        let files = collect_files(temp.path(), &Config::default()).unwrap();
        assert_eq!(relative(temp.path(), &files), vec!["a.py", "b.py", "pkg/mod.py"]);
    }

    #[test]
    fn test_hidden_and_excluded() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".hidden/x.py");
        touch(temp.path(), "build/gen.py");
        touch(temp.path(), "src/app.py");

        let config = Config {
            include_hidden: true,
            excluded_paths: vec!["build/**".to_string()],
            ..Default::default()
        };
        let files = collect_files(temp.path(), &config).unwrap();
        assert_eq!(relative(temp.path(), &files), vec![".hidden/x.py", "src/app.py"]);
    }

    #[test]
    fn test_single_file_root() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "only.py");
        let file = temp.path().join("only.py");

        let files = collect_files(&file, &Config::default()).unwrap();
        assert_eq!(files, vec![file]);
    }
}
