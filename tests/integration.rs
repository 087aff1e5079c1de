//! Binary-level integration tests.
//!
//! Each test drives the compiled `ragpipe` binary against a temporary
//! directory tree with a generated config, asserting on stdout/stderr and
//! exit status. Everything exercised here stays offline: the no-input and
//! precondition-failure paths short-circuit before any provider call.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ragpipe_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ragpipe");
    path
}

/// Create a workspace with `config/ragpipe.toml`, an empty `data/`
/// directory, and an `indexes/` parent for the index pair.
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::create_dir_all(root.join("config")).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    let config_content = format!(
        r#"[paths]
input_dir = "{}/data"
index_dir = "{}/indexes/pdf_index"

[chunking]
chunk_size = 800
chunk_overlap = 150

[retrieval]
top_k = 4

[generation]
api_key_env = "RAGPIPE_ITEST_API_KEY"

[server]
bind = "127.0.0.1:8000"
"#,
        root.display(),
        root.display()
    );

    let config_path = root.join("config").join("ragpipe.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ragpipe(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ragpipe_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ragpipe binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn ingest_empty_directory_reports_no_pdfs_and_writes_nothing() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_ragpipe(&config_path, &["ingest"]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(
        stdout.contains("No PDFs found."),
        "expected no-input outcome, got: {}",
        stdout
    );

    let index_dir = _tmp.path().join("indexes/pdf_index");
    assert!(
        !index_dir.exists(),
        "no index artifacts may be written for an empty input directory"
    );
}

#[test]
fn ingest_non_pdf_files_are_ignored() {
    let (_tmp, config_path) = setup_test_env();
    fs::write(_tmp.path().join("data/notes.txt"), "plain text, not a pdf").unwrap();

    let (stdout, _, success) = run_ragpipe(&config_path, &["ingest"]);
    assert!(success);
    assert!(stdout.contains("No PDFs found."), "got: {}", stdout);
}

#[test]
fn ingest_corrupt_pdf_propagates_failure() {
    let (_tmp, config_path) = setup_test_env();
    fs::write(_tmp.path().join("data/bad.pdf"), b"not a valid pdf").unwrap();

    let (stdout, stderr, success) = run_ragpipe(&config_path, &["ingest"]);
    assert!(
        !success,
        "corrupt PDF must fail the run: stdout={}, stderr={}",
        stdout, stderr
    );
    assert!(
        stderr.contains("bad.pdf"),
        "error should name the failing file, got: {}",
        stderr
    );
}

#[test]
fn query_without_index_fails_with_missing_artifacts() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_ragpipe(&config_path, &["query", "What is this about?"]);
    assert!(!success, "query must fail without an index: {}", stdout);
    assert!(
        stderr.contains("Index artifacts missing"),
        "expected missing-index condition, got: {}",
        stderr
    );
}

#[test]
fn invalid_chunking_config_is_rejected() {
    let (_tmp, config_path) = setup_test_env();
    let bad = fs::read_to_string(&config_path)
        .unwrap()
        .replace("chunk_overlap = 150", "chunk_overlap = 800");
    fs::write(&config_path, bad).unwrap();

    let (_, stderr, success) = run_ragpipe(&config_path, &["ingest"]);
    assert!(!success);
    assert!(
        stderr.contains("chunk_overlap"),
        "expected config validation message, got: {}",
        stderr
    );
}

#[test]
fn ingest_cli_overrides_take_effect() {
    let (_tmp, config_path) = setup_test_env();
    let other = _tmp.path().join("elsewhere");
    fs::create_dir_all(&other).unwrap();

    let (stdout, _, success) = run_ragpipe(
        &config_path,
        &["ingest", "--input-dir", other.to_str().unwrap()],
    );
    assert!(success);
    assert!(
        stdout.contains(&format!("ingest {}", other.display())),
        "override directory should be scanned, got: {}",
        stdout
    );
}
