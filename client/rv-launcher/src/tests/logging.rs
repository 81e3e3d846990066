use crate::logging::{current_log_path, filter_directive};

use rv_config::{LogLevel, LoggingConfig};

use std::path::Path;
use std::str::FromStr;

#[test]
fn test_filter_directive_uses_configured_level() {
    let config = LoggingConfig {
        level: LogLevel::from_str("debug").unwrap(),
        dir: "logs".into(),
    };

    assert_eq!(filter_directive(&config), "debug,backend=debug");
}

#[test]
fn test_filter_directive_default_is_info() {
    assert_eq!(
        filter_directive(&LoggingConfig::default()),
        "info,backend=info"
    );
}

#[test]
fn test_current_log_path_is_dated() {
    let path = current_log_path(Path::new("/tmp/rv/logs"));
    let name = path.file_name().unwrap().to_string_lossy().to_string();

    assert!(name.starts_with("roboview."));
    assert!(name.ends_with(".log"));
    assert_eq!(name.len(), "roboview.2026-01-01.log".len());
}
