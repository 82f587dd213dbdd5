//! JSON persistence for the user's filter settings.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{ScannerError, ThresholdConfig};

const APP_DIR: &str = "momentum-scanner";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/momentum-scanner/settings.json`, or the working
    /// directory when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_default()
            .join(SETTINGS_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing is stored, which callers treat as "no filter".
    pub fn load(&self) -> Result<Option<ThresholdConfig>, ScannerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let config = serde_json::from_str(&raw).map_err(|e| {
            ScannerError::Settings(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(config))
    }

    pub fn save(&self, config: &ThresholdConfig) -> Result<(), ScannerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Filter settings saved");
        Ok(())
    }

    /// Seed the defaults on first start and return whatever is stored.
    pub fn ensure_default(&self) -> Result<ThresholdConfig, ScannerError> {
        if let Some(existing) = self.load()? {
            return Ok(existing);
        }
        let config = ThresholdConfig::default();
        self.save(&config)?;
        tracing::info!(path = %self.path.display(), "Stored default filter settings");
        Ok(config)
    }

    pub fn reset(&self) -> Result<ThresholdConfig, ScannerError> {
        let config = ThresholdConfig::default();
        self.save(&config)?;
        Ok(config)
    }
}
