use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::SynthConfig;
use crate::error::SettingsError;

pub const DEFAULT_SETTINGS_FILE: &str = "midia.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,
    pub process_path: String,
    pub health_path: String,
    /// `None` waits for the service forever.
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7860".to_string(),
            process_path: "/process-midi".to_string(),
            health_path: "/health".to_string(),
            timeout_secs: Some(120),
        }
    }
}

impl ServiceSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub service: ServiceSettings,
    pub synth: SynthConfig,
}

impl Settings {
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;

        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let ron_string = fs::read_to_string(path)?;
        let settings: Settings = ron::from_str(&ron_string)?;

        Ok(settings)
    }

    /// Loads `path`, or `midia.ron` in the working directory when no path is
    /// given. A missing default file means default settings.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Wave;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("midia-settings-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: Settings =
            ron::from_str(r#"(service: (base_url: "http://example.test:8000", timeout_secs: None))"#)
                .unwrap();

        assert_eq!(settings.service.base_url, "http://example.test:8000");
        assert_eq!(settings.service.process_path, "/process-midi");
        assert_eq!(settings.service.timeout(), None);
        assert_eq!(settings.synth.max_voices, 32);
    }

    #[test]
    fn default_timeout_is_bounded() {
        assert_eq!(
            ServiceSettings::default().timeout(),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip.ron");
        let mut settings = Settings::default();
        settings.synth.wave = Wave::Saw;
        settings.service.timeout_secs = Some(5);

        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();

        assert_eq!(loaded.synth.wave, Wave::Saw);
        assert_eq!(loaded.service.timeout_secs, Some(5));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = temp_path("does-not-exist.ron");
        assert!(matches!(
            Settings::load_or_default(Some(&path)),
            Err(SettingsError::Io(_))
        ));
    }
}
