use crate::LintConfigDiscovery;
use crate::tests::EnvGuard;

use googletest::assert_that;
use googletest::prelude::{eq, none, some};
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn given_no_env_file_when_find_then_none() {
    // Given
    let project = TempDir::new().unwrap();
    let _env = EnvGuard::remove("ROBOCOP_CONFIG_PATH");

    // When
    let found = LintConfigDiscovery::new(project.path()).find();

    // Then
    assert_that!(found, none());
}

#[test]
#[serial]
fn given_env_file_with_relative_path_when_find_then_resolved_against_root() {
    // Given
    let project = TempDir::new().unwrap();
    let _env = EnvGuard::remove("ROBOCOP_CONFIG_PATH");
    std::fs::write(project.path().join("robocop.toml"), "[tool.robocop]\n").unwrap();
    std::fs::write(
        project.path().join(".env"),
        "OTHER=1\nROBOCOP_CONFIG_PATH=robocop.toml\n",
    )
    .unwrap();

    // When
    let found = LintConfigDiscovery::new(project.path()).find();

    // Then
    assert_that!(found, some(eq(&project.path().join("robocop.toml"))));
}

#[test]
#[serial]
fn given_env_file_pointing_at_missing_file_when_find_then_none() {
    // Given
    let project = TempDir::new().unwrap();
    let _env = EnvGuard::remove("ROBOCOP_CONFIG_PATH");
    std::fs::write(
        project.path().join(".env"),
        "ROBOCOP_CONFIG_PATH=missing.toml\n",
    )
    .unwrap();

    // When
    let found = LintConfigDiscovery::new(project.path()).find();

    // Then
    assert_that!(found, none());
}

#[test]
#[serial]
fn given_env_file_pointing_at_directory_when_find_then_none() {
    // Given
    let project = TempDir::new().unwrap();
    let _env = EnvGuard::remove("ROBOCOP_CONFIG_PATH");
    std::fs::create_dir(project.path().join("conf")).unwrap();
    std::fs::write(project.path().join(".env"), "ROBOCOP_CONFIG_PATH=conf\n").unwrap();

    // When
    let found = LintConfigDiscovery::new(project.path()).find();

    // Then
    assert_that!(found, none());
}

#[test]
#[serial]
fn given_process_env_and_env_file_when_find_then_process_env_wins() {
    // Given
    let project = TempDir::new().unwrap();
    let override_dir = TempDir::new().unwrap();
    let override_file = override_dir.path().join(".robocop");
    std::fs::write(&override_file, "--include *.robot\n").unwrap();
    std::fs::write(project.path().join("robocop.toml"), "").unwrap();
    std::fs::write(
        project.path().join(".env"),
        "ROBOCOP_CONFIG_PATH=robocop.toml\n",
    )
    .unwrap();
    let _env = EnvGuard::set("ROBOCOP_CONFIG_PATH", override_file.to_str().unwrap());

    // When
    let found = LintConfigDiscovery::new(project.path()).find();

    // Then
    assert_that!(found, some(eq(&override_file)));
}

#[test]
#[serial]
fn given_empty_project_root_when_find_then_none() {
    let _env = EnvGuard::remove("ROBOCOP_CONFIG_PATH");

    let found = LintConfigDiscovery::new("").find();

    assert_that!(found, none());
}
