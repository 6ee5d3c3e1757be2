use eolfmt_config::{ConfigError, EolfmtConfig, CONFIG_FILE_NAME, END_OF_LINE_KEY};
use eolfmt_core::LineEnding;
use pretty_assertions::assert_eq;

#[test]
fn loads_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "fallback_end_of_line = \"cr\"\n\n[conventions]\nend_of_line = \"crlf\"\n",
    )
    .unwrap();

    let config = EolfmtConfig::load_from_path(&path).unwrap();
    assert_eq!(config.fallback_end_of_line(), LineEnding::Cr);
    assert_eq!(config.conventions.lookup(END_OF_LINE_KEY), Some("crlf"));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    let err = EolfmtConfig::load_from_path(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string());
        }
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn diagnostics_survive_loading_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[conventions]\nend_of_line = \"lf\"\n\n[extra]\nkey = 1\n").unwrap();

    let (config, diagnostics) = EolfmtConfig::load_from_path_with_diagnostics(&path).unwrap();
    assert_eq!(config.conventions.lookup(END_OF_LINE_KEY), Some("lf"));
    assert_eq!(diagnostics.unknown_keys, vec!["extra".to_owned()]);
}

#[test]
fn typed_convention_values_do_not_block_end_of_line() {
    let (config, diagnostics) = EolfmtConfig::load_from_str_with_diagnostics(
        "[conventions]\nend_of_line = \"crlf\"\nindent_size = 4\ninsert_final_newline = true\n",
    )
    .unwrap();

    assert!(diagnostics.is_empty());
    assert_eq!(config.conventions.lookup(END_OF_LINE_KEY), Some("crlf"));
    assert_eq!(config.conventions.lookup("indent_size"), Some("4"));
    assert_eq!(config.conventions.lookup("insert_final_newline"), Some("true"));
}
