use phonebook_core::{ConfigError, SerialFormat, Settings, UniquenessPolicy};

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("config.toml");

    let settings = Settings::load_or_init(&path, dir.path()).unwrap();
    assert!(path.is_file());
    assert_eq!(settings, Settings::with_defaults(dir.path()));

    let reloaded = Settings::load_or_init(&path, "/unused/default").unwrap();
    assert_eq!(reloaded, settings);
}

#[test]
fn saved_changes_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let data_dir = tempfile::tempdir().unwrap();

    let mut settings = Settings::load_or_init(&path, dir.path()).unwrap();
    settings.set_serial_format(SerialFormat::Html);
    settings.set_write_auth_rule(UniquenessPolicy::UniqueAll);
    settings.set_data_dir(data_dir.path()).unwrap();
    settings.save(&path).unwrap();

    let reloaded = Settings::load_or_init(&path, dir.path()).unwrap();
    assert_eq!(reloaded.serial_format, SerialFormat::Html);
    assert_eq!(reloaded.write_auth_rule, UniquenessPolicy::UniqueAll);
    assert_eq!(reloaded.data_dir, data_dir.path());

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("serial_format = \"html\""));
    assert!(content.contains("write_auth_rule = \"all\""));
}

#[test]
fn unsupported_values_in_file_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "serial_format = \"xml\"\n").unwrap();

    let err = Settings::load_or_init(&path, dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(value) if value == "xml"));
}

#[test]
fn malformed_file_reports_parse_error_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "serial_format = [\n").unwrap();

    let err = Settings::load_or_init(&path, dir.path()).unwrap_err();
    match err {
        ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}
