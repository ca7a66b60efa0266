use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn folio_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_folio"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let content_dir = root.join("content");
    fs::create_dir_all(&content_dir).unwrap();
    fs::write(
        content_dir.join("a.mdx"),
        "---\ntitle: A\ndate: 2024-01-01\nexcerpt: First\n---\nhello",
    )
    .unwrap();
    fs::write(
        content_dir.join("b.mdx"),
        "---\ntitle: B\ndate: 2024-06-01\n---\nworld",
    )
    .unwrap();
    fs::write(
        content_dir.join("_draft.mdx"),
        "---\ntitle: Draft\ndate: 2025-01-01\n---\nnot yet",
    )
    .unwrap();

    let config_content = format!(
        r#"[content]
root = "{}/content"
extensions = ["mdx", "md"]
exclude_globs = ["_*"]

[render]
external_links_new_tab = true
"#,
        root.display()
    );

    let config_path = config_dir.join("folio.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_folio(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = folio_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run folio binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_ids() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_folio(&config_path, &["ids"]);
    assert!(success, "ids failed: stderr={}", stderr);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_list_json_newest_first() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_folio(&config_path, &["list", "--json"]);
    assert!(success, "list failed: stderr={}", stderr);

    let docs: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let docs = docs.as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["identifier"], "b");
    assert_eq!(docs[0]["date"], "2024-06-01");
    assert_eq!(docs[0]["html_body"], "<p>world</p>\n");
    assert_eq!(docs[1]["identifier"], "a");
    assert_eq!(docs[1]["excerpt"], "First");
}

#[test]
fn test_list_no_body() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_folio(&config_path, &["list", "--json", "--no-body"]);
    assert!(success);
    let docs: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(docs[0]["html_body"], "");
}

#[test]
fn test_list_table() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_folio(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("IDENTIFIER"));
    let b = stdout.find("2024-06-01").unwrap();
    let a = stdout.find("2024-01-01").unwrap();
    assert!(b < a, "expected newest first, got: {}", stdout);
}

#[test]
fn test_get_document() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_folio(&config_path, &["get", "a", "--json"]);
    assert!(success, "get failed: stderr={}", stderr);
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["title"], "A");
    assert_eq!(doc["html_body"], "<p>hello</p>\n");

    let (stdout, _, success) = run_folio(&config_path, &["get", "b"]);
    assert!(success);
    assert!(stdout.contains("June 1, 2024"));
    assert!(stdout.contains("<p>world</p>"));
}

#[test]
fn test_get_missing_exits_nonzero() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_folio(&config_path, &["get", "missing"]);
    assert!(!success);
    assert!(stderr.contains("not found"));

    // Excluded files are not documents.
    let (_, _, success) = run_folio(&config_path, &["get", "_draft"]);
    assert!(!success);
}

#[test]
fn test_malformed_document_skipped_and_reported() {
    let (tmp, config_path) = setup_test_env();
    fs::write(
        tmp.path().join("content").join("broken.mdx"),
        "---\ntitle: Broken\ndate: 2024-03-01\n",
    )
    .unwrap();

    let (stdout, _, success) = run_folio(&config_path, &["list", "--json"]);
    assert!(success, "one broken document must not fail the listing");
    let docs: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(docs.as_array().unwrap().len(), 2);

    let (_, _, success) = run_folio(&config_path, &["get", "broken"]);
    assert!(!success);

    let (stdout, _, success) = run_folio(&config_path, &["check"]);
    assert!(!success);
    assert!(stdout.contains("broken"));
    assert!(stdout.contains("malformed header"));
}

#[test]
fn test_check_ok() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_folio(&config_path, &["check"]);
    assert!(success);
    assert!(stdout.contains("documents: 2"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_export_to_file() {
    let (tmp, config_path) = setup_test_env();
    let out = tmp.path().join("dist").join("posts.json");

    let (_, stderr, success) = run_folio(
        &config_path,
        &["export", "--output", out.to_str().unwrap()],
    );
    assert!(success, "export failed: stderr={}", stderr);
    assert!(stderr.contains("Exported 2 documents"));

    let data: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(data["documents"].as_array().unwrap().len(), 2);
    assert_eq!(data["documents"][0]["identifier"], "b");
    assert!(data["skipped"].as_array().unwrap().is_empty());
}

#[test]
fn test_empty_content_root() {
    let (tmp, config_path) = setup_test_env();
    let content = tmp.path().join("content");
    fs::remove_dir_all(&content).unwrap();
    fs::create_dir(&content).unwrap();

    let (stdout, _, success) = run_folio(&config_path, &["ids"]);
    assert!(success);
    assert!(stdout.trim().is_empty());

    let (stdout, _, success) = run_folio(&config_path, &["list", "--json"]);
    assert!(success);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn test_missing_config_uses_defaults_with_root_override() {
    let (tmp, _config_path) = setup_test_env();
    let missing = tmp.path().join("nope.toml");
    let root = tmp.path().join("content");

    let (stdout, stderr, success) = run_folio(
        &missing,
        &["--root", root.to_str().unwrap(), "ids"],
    );
    assert!(success, "stderr={}", stderr);
    // No exclude globs in the default config.
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["_draft", "a", "b"]);
}

#[test]
fn test_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("folio.toml");
    fs::write(&config_path, "[content]\nroot = \"x\"\nextensions = []\n").unwrap();

    let (_, stderr, success) = run_folio(&config_path, &["ids"]);
    assert!(!success);
    assert!(stderr.contains("content.extensions"));
}

#[test]
fn test_headerless_document_get_and_check() {
    let (tmp, config_path) = setup_test_env();
    fs::write(
        tmp.path().join("content").join("plain.mdx"),
        "# Just a body\n\nhello",
    )
    .unwrap();

    let (stdout, _, success) = run_folio(&config_path, &["ids"]);
    assert!(success);
    assert!(stdout.lines().any(|line| line == "plain"));

    let (stdout, stderr, success) = run_folio(&config_path, &["get", "plain"]);
    assert!(success, "get failed: stderr={}", stderr);
    assert!(stdout.contains("(undated)"));
    assert!(stdout.contains("<h1>Just a body</h1>"));

    let (stdout, _, success) = run_folio(&config_path, &["check"]);
    assert!(!success);
    assert!(stdout.contains("plain"));
    assert!(stdout.contains("document has no date"));
}
