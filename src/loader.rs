//! PDF discovery and per-page text extraction.
//!
//! Walks the input directory for PDF files and extracts their page texts.
//! Extraction failures are hard errors: a corrupt PDF aborts the ingestion
//! run rather than being silently skipped.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::models::{Document, Page};

/// Patterns matched against paths relative to the input directory.
const PDF_GLOBS: &[&str] = &["**/*.pdf", "**/*.PDF"];

/// Recursively discover PDF files under `input_dir`, sorted by relative
/// path for deterministic ordering.
pub fn find_pdfs(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.exists() {
        bail!("Input directory does not exist: {}", input_dir.display());
    }

    let include_set = build_globset(PDF_GLOBS)?;
    let mut paths = Vec::new();

    for entry in WalkDir::new(input_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(input_dir).unwrap_or(path);
        if include_set.is_match(relative) {
            paths.push(path.to_path_buf());
        }
    }

    paths.sort();
    Ok(paths)
}

/// Load every PDF under `input_dir` as a [`Document`] with per-page text.
pub fn load_documents(input_dir: &Path) -> Result<Vec<Document>> {
    let paths = find_pdfs(input_dir)?;
    let mut documents = Vec::with_capacity(paths.len());

    for path in &paths {
        documents.push(load_pdf(input_dir, path)?);
    }

    Ok(documents)
}

fn load_pdf(input_dir: &Path, path: &Path) -> Result<Document> {
    let page_texts = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| anyhow::anyhow!("Failed to extract text from {}: {}", path.display(), e))?;

    let name = path
        .strip_prefix(input_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    let pages = page_texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Page {
            number: i + 1,
            text,
        })
        .collect();

    Ok(Document { name, pages })
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_directory_finds_nothing() {
        let tmp = TempDir::new().unwrap();
        let paths = find_pdfs(tmp.path()).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("nope");
        assert!(find_pdfs(&gone).is_err());
    }

    #[test]
    fn only_pdf_extensions_match() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.pdf"), b"x").unwrap();
        fs::write(tmp.path().join("b.PDF"), b"x").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        fs::write(tmp.path().join("c.pdf.bak"), b"x").unwrap();

        let paths = find_pdfs(tmp.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
    }

    #[test]
    fn discovery_recurses_into_subdirectories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("nested/deep")).unwrap();
        fs::write(tmp.path().join("nested/deep/doc.pdf"), b"x").unwrap();

        let paths = find_pdfs(tmp.path()).unwrap();
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn corrupt_pdf_propagates_extraction_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.pdf"), b"not a pdf").unwrap();
        let err = load_documents(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("bad.pdf"));
    }
}
