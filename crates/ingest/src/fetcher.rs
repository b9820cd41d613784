//! Documentation directory scanning.

use std::path::{Path, PathBuf};

use docsqa_core::{AppError, AppResult};
use walkdir::WalkDir;

/// Collect every markdown file under `docs_dir`, sorted for deterministic
/// processing order.
pub fn fetch_markdown_files(docs_dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !docs_dir.is_dir() {
        return Err(AppError::Ingestion(format!(
            "Documentation directory not found: {:?}",
            docs_dir
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(docs_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("md"))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    tracing::debug!("Found {} markdown files under {:?}", files.len(), docs_dir);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_fetch_finds_nested_markdown_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guides/ci")).unwrap();
        fs::write(dir.path().join("intro.md"), "# Intro").unwrap();
        fs::write(dir.path().join("guides/ci/jenkins.md"), "# Jenkins").unwrap();
        fs::write(dir.path().join("guides/notes.txt"), "not markdown").unwrap();

        let files = fetch_markdown_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("guides/ci/jenkins.md"));
        assert!(files[1].ends_with("intro.md"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = fetch_markdown_files(&missing).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
