/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::fs;

use submacro::app_config::{Config, ConfigSource, LogLevel};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.log_file.is_none());
    assert_eq!(
        config.automation.autoload_dirs().collect::<Vec<_>>(),
        vec!["?user/automation/autoload/", "?data/automation/autoload/"]
    );
    assert!(config.app.last_version.is_empty());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf").join("config.json");

    let (config, source) = Config::load_or_create(&path)?;

    assert_eq!(source, ConfigSource::Created);
    assert_eq!(config, Config::default());
    assert!(path.exists());
    Ok(())
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "config.json",
        r#"{"log_level": "debug", "automation": {"autoload": "/a|  |/b"}}"#,
    )?;

    let (config, source) = Config::load_or_create(&path)?;

    assert_eq!(source, ConfigSource::File);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.automation.autoload_dirs().collect::<Vec<_>>(), vec!["/a", "/b"]);
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidFile_shouldUseDefaultsAndKeepFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "config.json", "{ not json")?;

    let (config, source) = Config::load_or_create(&path)?;

    assert_eq!(source, ConfigSource::InvalidFallback);
    assert_eq!(config, Config::default());
    assert_eq!(fs::read_to_string(&path)?, "{ not json");
    Ok(())
}

#[test]
fn test_rememberVersion_shouldReportChangesOnly() {
    let mut config = Config::default();
    assert!(config.remember_version("1.0.0"));
    assert!(!config.remember_version("1.0.0"));
    assert!(config.remember_version("1.1.0"));
    assert_eq!(config.app.last_version, "1.1.0");
}

#[test]
fn test_save_thenLoad_shouldPreserveValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.log_level = LogLevel::Warn;
    config.log_file = Some("?user/run.log".to_string());
    config.save(&path)?;

    let (loaded, _) = Config::load_or_create(&path)?;
    assert_eq!(loaded, config);
    Ok(())
}
