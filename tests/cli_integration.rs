//! CLI integration tests.
//!
//! These tests verify argument parsing, configuration loading and the
//! settings the CLI hands to the composer.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use tcc_runner::cli::{parse_args_from, Args};
use tcc_runner::config::Config;
use tcc_runner::{
    CommandComposer, EditorState, Mode, Platform, SettingKey, Settings,
    UnsupportedPlatformPolicy,
};

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("tcc-runner")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn settings_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.action.is_none());
    assert!(result.config.is_none());
    assert!(result.flags.is_none());
    assert!(result.args.is_none());
    assert!(!result.print);
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-n",
        "-c",
        "/etc/tcc-runner.json",
        "--flags",
        "-Wall",
        "--args",
        "-o out",
        "--platform",
        "linux",
        "-l",
        "debug",
        "compile",
        "main.c",
    ]))
    .unwrap();

    assert!(result.print);
    assert_eq!(result.config, Some(PathBuf::from("/etc/tcc-runner.json")));
    assert_eq!(result.flags, Some("-Wall".to_string()));
    assert_eq!(result.args, Some("-o out".to_string()));
    assert_eq!(result.platform, Some("linux".to_string()));
    assert_eq!(result.log_level, Some("debug".to_string()));
    assert_eq!(result.action, Some(Mode::Compile));
    assert_eq!(result.file, Some(PathBuf::from("main.c")));
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_priority_cli_over_file() {
    let file = settings_file(
        r#"{
        "platform": { "identifier": "win32", "install_dir": "/from/file" },
        "logging": { "level": "warn" }
    }"#,
    );

    let args = Args {
        config: Some(file.path().to_path_buf()),
        platform: Some("linux".to_string()),
        log_level: Some("debug".to_string()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();

    assert_eq!(config.platform(), Platform::Linux);
    assert_eq!(config.install_dir().unwrap(), PathBuf::from("/from/file"));
    assert_eq!(config.log_filter(), "debug");
}

#[test]
fn test_config_missing_file() {
    let args = Args {
        config: Some(PathBuf::from("/definitely/not/here.json")),
        ..Args::default()
    };

    assert!(Config::load(&args).is_err());
}

#[test]
fn test_strict_platform_flag() {
    let args = Args {
        platform: Some("darwin".to_string()),
        install_dir: Some(PathBuf::from("/opt/tcc-runner")),
        strict_platform: true,
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    assert_eq!(config.platform.unsupported, UnsupportedPlatformPolicy::Reject);
    assert!(config.resolver().unwrap().resolve_executable_path().is_err());
}

#[test]
fn test_unsupported_platform_falls_back_by_default() {
    let args = Args {
        platform: Some("darwin".to_string()),
        install_dir: Some(PathBuf::from("/opt/tcc-runner")),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    let path = config.resolver().unwrap().resolve_executable_path().unwrap();
    assert!(path.starts_with("/opt/tcc-runner"));
    assert!(path.ends_with("tcc-win32/tcc.exe"));
}

// ============================================================================
// Settings Tests
// ============================================================================

#[test]
fn test_settings_from_config_file() {
    let file = settings_file(r#"{"tcc": {"flags": "-Wall", "args": "-o out"}}"#);
    let args = Args {
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    let settings = config.user_settings(&args).without_env();

    assert_eq!(settings.get(SettingKey::Flags), Some("-Wall".to_string()));
    assert_eq!(settings.get(SettingKey::Args), Some("-o out".to_string()));
}

#[test]
fn test_cli_settings_override_file() {
    let file = settings_file(r#"{"tcc": {"flags": "-Wall", "args": "-o out"}}"#);
    let args = Args {
        config: Some(file.path().to_path_buf()),
        flags: Some("-g".to_string()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    let settings = config.user_settings(&args).without_env();

    assert_eq!(settings.get(SettingKey::Flags), Some("-g".to_string()));
    assert_eq!(settings.get(SettingKey::Args), Some("-o out".to_string()));
}

#[test]
fn test_compose_example_command() {
    let file = settings_file(r#"{"tcc": {"flags": "-Wall", "args": "-o out"}}"#);
    let args = Args {
        config: Some(file.path().to_path_buf()),
        platform: Some("linux".to_string()),
        install_dir: Some(PathBuf::from("/opt/tcc-runner")),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    let settings = config.user_settings(&args).without_env();
    let editor = EditorState::new();
    let resolver = config.resolver().unwrap();

    let composer = CommandComposer::new(&settings, &editor, &resolver);
    assert_eq!(
        composer.build_command(Mode::Compile).unwrap().to_string(),
        "/usr/bin/tcc -Wall -o out"
    );
}

#[test]
fn test_null_settings_use_fallbacks() {
    let file = settings_file(r#"{"tcc": {"flags": null, "args": null}}"#);
    let args = Args {
        config: Some(file.path().to_path_buf()),
        platform: Some("linux".to_string()),
        install_dir: Some(PathBuf::from("/opt/tcc-runner")),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    let settings = config.user_settings(&args).without_env();
    let editor = EditorState::with_document("/src/hello.c").unwrap();
    let resolver = config.resolver().unwrap();

    let composer = CommandComposer::new(&settings, &editor, &resolver);
    let cmd = composer.build_command(Mode::Run).unwrap();

    assert_eq!(cmd.flags, format!("\"{}\"", editor_path(&editor)));
    assert_eq!(cmd.args, "");
    assert!(cmd.run);
}

fn editor_path(editor: &EditorState) -> String {
    use tcc_runner::Editor;
    editor.active_document().unwrap().display().to_string()
}
