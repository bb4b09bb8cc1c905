use savegroup::settings::DATA_PATH_KEY;
use savegroup::{Settings, parse};
use std::fs;
use std::path::PathBuf;

const DEFAULTS: &str = r#"{
    "data-path": "/opt/knight",
    "music-volume": 0.7,
    "fullscreen": false,
    "max-fps": 60
}"#;

#[test]
fn user_values_override_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_nodes(parse(DEFAULTS)?, parse(r#"{"fullscreen": true}"#)?)?;
    assert_eq!(settings.get::<bool>("fullscreen"), Some(true));
    assert_eq!(settings.get::<f64>("music-volume"), Some(0.7));
    assert_eq!(settings.get::<i32>("max-fps"), Some(60));
    assert_eq!(settings.get::<String>("missing"), None);
    Ok(())
}

#[test]
fn mismatched_kind_falls_back_to_default() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_nodes(parse(DEFAULTS)?, parse(r#"{"max-fps": "fast"}"#)?)?;
    assert_eq!(settings.get::<i32>("max-fps"), Some(60));
    assert_eq!(settings.get::<bool>("max-fps"), None);
    Ok(())
}

#[test]
fn load_creates_user_file_and_saves_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let defaults = dir.path().join("Settings.json");
    let user = dir.path().join("profile").join("settings.json");
    fs::write(&defaults, DEFAULTS)?;

    let mut settings = Settings::load(&defaults, &user)?;
    assert!(user.is_file());
    assert_eq!(settings.get::<f64>("music-volume"), Some(0.7));

    settings.set_user("music-volume", 0.25)?;
    settings.save_user()?;

    let reloaded = Settings::load(&defaults, &user)?;
    assert_eq!(reloaded.get::<f64>("music-volume"), Some(0.25));
    Ok(())
}

#[test]
fn reset_user_restores_default() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::from_nodes(parse(DEFAULTS)?, parse("{}")?)?;
    settings.set_user("max-fps", 144)?;
    assert_eq!(settings.get::<i32>("max-fps"), Some(144));
    assert!(settings.reset_user("max-fps"));
    assert_eq!(settings.get::<i32>("max-fps"), Some(60));
    assert!(settings.set_user("music-volume", f64::NAN).is_err());
    Ok(())
}

#[test]
fn data_dir_reads_data_path() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_nodes(parse(DEFAULTS)?, parse("{}")?)?;
    if !cfg!(windows) {
        assert_eq!(settings.data_dir(), Some(PathBuf::from("/opt/knight")));
    }
    assert_eq!(settings.get::<String>(DATA_PATH_KEY).as_deref(), Some("/opt/knight"));
    Ok(())
}

#[test]
fn save_without_user_file_is_an_error() {
    assert!(Settings::new().save_user().is_err());
}

#[test]
fn settings_files_must_be_objects() -> Result<(), Box<dyn std::error::Error>> {
    assert!(Settings::from_nodes(parse("[1]")?, parse("{}")?).is_err());
    Ok(())
}
