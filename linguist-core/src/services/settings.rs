use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::model::settings::Settings;
use crate::services::persist;

const SETTINGS_FILE: &str = "settings.json";

/// `$LINGUIST_HOME`, or `.linguist` under the working directory.
pub fn data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("LINGUIST_HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".linguist")
}

/// Settings stored in `dir`; defaults when the file does not exist yet.
pub fn load_from(dir: &Path) -> Result<Settings> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }

    let data = fs::read_to_string(&path)?;
    Ok(serde_json::from_str::<Settings>(&data)?)
}

pub fn save_to(dir: &Path, mut settings: Settings) -> Result<Settings> {
    if settings.source_language.trim().is_empty() {
        settings.source_language = Settings::default().source_language;
    }
    if settings.tm_path.trim().is_empty() {
        settings.tm_path = Settings::default().tm_path;
    }

    let json = serde_json::to_string_pretty(&settings)?;
    let path = dir.join(SETTINGS_FILE);
    persist::write_atomic(&path, json.as_bytes())?;

    info!(path = %path.display(), "settings saved");
    Ok(settings)
}

/// Absolute location of the translation memory for these settings.
pub fn tm_file(dir: &Path, settings: &Settings) -> PathBuf {
    let tm = Path::new(&settings.tm_path);
    if tm.is_absolute() {
        tm.to_path_buf()
    } else {
        dir.join(tm)
    }
}
