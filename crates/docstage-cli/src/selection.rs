//! Turning command-line paths into candidate files.

use anyhow::{Context, Result};
use docstage_core::models::CandidateFile;
use std::path::Path;
use tokio::fs;

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

async fn candidate_from_file(path: &Path) -> Result<CandidateFile> {
    let metadata = fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();
    let mime = guess_mime(&name);

    Ok(CandidateFile::from_path(name, mime, path, metadata.len()))
}

/// Load one selection: a single file, or every regular file directly inside a
/// directory (sorted by name, not recursive).
pub async fn load_selection(path: &Path) -> Result<Vec<CandidateFile>> {
    let metadata = fs::metadata(path)
        .await
        .with_context(|| format!("Cannot open {}", path.display()))?;

    if !metadata.is_dir() {
        return Ok(vec![candidate_from_file(path).await?]);
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(path)
        .await
        .with_context(|| format!("Failed to list {}", path.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for file_path in paths {
        files.push(candidate_from_file(&file_path).await?);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("invoice.pdf"), "application/pdf");
        assert_eq!(guess_mime("scan.PNG"), "image/png");
        assert_eq!(guess_mime("notes.txt"), "text/plain");
        assert_eq!(guess_mime("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_directory_selection_is_sorted_and_flat() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"bb").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.pdf"), b"c").unwrap();

        let files = load_selection(dir.path()).await.unwrap();

        let names: Vec<_> = files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert_eq!(files[1].byte_size(), 2);
        assert_eq!(files[0].mime_type(), "application/pdf");
    }

    #[tokio::test]
    async fn test_single_file_and_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.pdf");
        std::fs::write(&path, b"1").unwrap();

        assert_eq!(load_selection(&path).await.unwrap().len(), 1);
        assert!(load_selection(&dir.path().join("missing.pdf")).await.is_err());
    }
}
