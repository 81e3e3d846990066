use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, none, ok, some};
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let _temp = setup_config_dir();
    let _root = EnvGuard::remove("RV_PROJECT_ROOT_DIR");

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.backend.program.as_str(), eq(crate::DEFAULT_PROGRAM));
    assert_that!(
        config.backend.args,
        eq(&vec!["-m".to_string(), "roboview.main".to_string()])
    );
    assert_that!(config.endpoint.base_url.as_str(), eq(crate::DEFAULT_BASE_URL));
    assert_that!(config.startup.startup_timeout_secs, eq(100));
    assert_that!(config.startup.poll_interval_ms, eq(500));
    assert_that!(config.project.root_dir, none());
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();
    let _root = EnvGuard::remove("RV_PROJECT_ROOT_DIR");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_missing_config_dir_when_load_then_dir_created() {
    // Given
    let temp = tempfile::TempDir::new().unwrap();
    let config_dir = temp.path().join("nested").join(".roboview");

    // When
    let result = Config::load_from_dir(&config_dir);

    // Then
    assert_that!(result, ok(anything()));
    assert_that!(config_dir.is_dir(), eq(true));
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [backend]
            program = "/opt/venv/bin/python"
            args = ["-m", "roboview.main", "--port", "9000"]

            [endpoint]
            base_url = "http://127.0.0.1:9000/api/v1/system"

            [startup]
            startup_timeout_secs = 30
            poll_interval_ms = 250
        "#,
    )
    .unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.backend.program.as_str(), eq("/opt/venv/bin/python"));
    assert_that!(config.backend.args.len(), eq(4));
    assert_that!(
        config.endpoint.base_url.as_str(),
        eq("http://127.0.0.1:9000/api/v1/system")
    );
    assert_that!(config.startup.startup_timeout_secs, eq(30));
    assert_that!(config.startup.poll_interval_ms, eq(250));
    assert_that!(config.startup.probe_timeout_ms, eq(1000));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_overrides_toml() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [startup]
            poll_interval_ms = 250
        "#,
    )
    .unwrap();
    let _poll = EnvGuard::set("RV_POLL_INTERVAL_MS", "750");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.startup.poll_interval_ms, eq(750));
}

#[test]
#[serial]
fn given_unparseable_env_var_when_load_then_keeps_previous_value() {
    // Given
    let _temp = setup_config_dir();
    let _timeout = EnvGuard::set("RV_STARTUP_TIMEOUT_SECS", "soon");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.startup.startup_timeout_secs, eq(100));
}

#[test]
#[serial]
fn given_project_root_env_when_load_then_working_dir_defaults_to_root() {
    // Given
    let _temp = setup_config_dir();
    let project = tempfile::TempDir::new().unwrap();
    let _root = EnvGuard::set("RV_PROJECT_ROOT_DIR", project.path().to_str().unwrap());
    let _wd = EnvGuard::remove("RV_BACKEND_WORKING_DIR");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(
        config.backend_working_dir(),
        some(eq(&project.path().to_path_buf()))
    );
    assert_that!(config.validate(), ok(anything()));
}

#[test]
#[serial]
fn given_log_level_env_when_load_then_level_applied() {
    // Given
    let _temp = setup_config_dir();
    let _level = EnvGuard::set("RV_LOG_LEVEL", "DEBUG");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.logging.level.as_directive(), eq("debug"));
}

// =========================================================================
// Error Tests
// =========================================================================

#[test]
#[serial]
fn given_malformed_toml_when_load_then_error_names_file() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[startup\npoll = ").unwrap();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, err(anything()));
    let message = result.unwrap_err().to_string();
    assert!(message.contains("config.toml"), "got: {message}");
}

#[test]
#[serial]
fn given_non_http_base_url_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _url = EnvGuard::set("RV_ENDPOINT_BASE_URL", "127.0.0.1:8000");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}

#[test]
#[serial]
fn given_empty_program_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _program = EnvGuard::set("RV_BACKEND_PROGRAM", "  ");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}

#[test]
#[serial]
fn given_missing_project_root_dir_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _root = EnvGuard::set("RV_PROJECT_ROOT_DIR", "/definitely/not/a/real/dir");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}

#[test]
#[serial]
fn given_log_dir_escaping_config_dir_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _dir = EnvGuard::set("RV_LOG_DIR", "../logs");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}
