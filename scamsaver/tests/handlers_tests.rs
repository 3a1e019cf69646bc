use scamsaver::handlers::*;
use scamsaver_analyzer::USER_FACING_FAILURE;
use scamsaver_analyzer::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_build_config_with_key() {
    let key = "abc123".to_string();
    let config = build_config(Some(&key), DEFAULT_MODEL, DEFAULT_BASE_URL).unwrap();

    assert_eq!(config.api_key, "abc123");
    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
fn test_build_config_trims_key() {
    let key = "  abc123\n".to_string();
    let config = build_config(Some(&key), DEFAULT_MODEL, DEFAULT_BASE_URL).unwrap();
    assert_eq!(config.api_key, "abc123");
}

#[test]
fn test_build_config_custom_model_and_endpoint() {
    let key = "abc123".to_string();
    let config = build_config(Some(&key), "gemini-pro", "http://localhost:9000/v1beta").unwrap();

    assert_eq!(
        config.generate_content_url(),
        "http://localhost:9000/v1beta/models/gemini-pro:generateContent"
    );
}

#[test]
fn test_build_config_missing_key() {
    let result = build_config(None, DEFAULT_MODEL, DEFAULT_BASE_URL);
    assert!(result.unwrap_err().contains("GEMINI_API_KEY"));
}

#[test]
fn test_build_config_blank_key() {
    let key = "   ".to_string();
    assert!(build_config(Some(&key), DEFAULT_MODEL, DEFAULT_BASE_URL).is_err());
}

#[test]
fn test_build_config_empty_model() {
    let key = "abc123".to_string();
    assert!(build_config(Some(&key), "", DEFAULT_BASE_URL).is_err());
}

#[test]
fn test_resolve_output_path_plain() {
    assert_eq!(
        resolve_output_path("reports/out.json"),
        PathBuf::from("reports/out.json")
    );
}

#[test]
fn test_resolve_output_path_expands_tilde() {
    let resolved = resolve_output_path("~/report.md");
    assert!(!resolved.to_string_lossy().starts_with('~'));
    assert!(resolved.ends_with("report.md"));
}

#[test]
fn test_emit_report_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("report.txt");

    emit_report("report body\n", Some(&path))?;

    assert_eq!(std::fs::read_to_string(&path)?, "report body\n");
    Ok(())
}

#[test]
fn test_emit_report_to_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.txt");

    let err = emit_report("body", Some(&path)).unwrap_err();
    assert!(err.contains("Failed to write report"));
}

#[test]
fn test_require_target_accepts_input_verbatim() {
    assert_eq!(require_target(" example.com ").unwrap(), " example.com ");
}

#[test]
fn test_require_target_empty_uses_generic_message() {
    assert_eq!(require_target("").unwrap_err(), USER_FACING_FAILURE);
    assert_eq!(require_target("   ").unwrap_err(), USER_FACING_FAILURE);
}
