use anyhow::{Context, Result};
use std::path::Path;

use pitch_journey::{DataLoader, Dataset, JourneyConfig, LoadError};

/// Bundled content with optional pacing overrides read from disk.
#[derive(Debug, Clone, Default)]
pub struct TesterLoader {
    config: JourneyConfig,
}

impl TesterLoader {
    /// Read journey configuration overrides from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn with_config_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = JourneyConfig::from_json(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(Self { config })
    }
}

impl DataLoader for TesterLoader {
    type Error = LoadError;

    fn load_dataset(&self) -> Result<Dataset, Self::Error> {
        let data = Dataset::bundled()?;
        data.validate()?;
        Ok(data)
    }

    fn load_config(&self) -> Result<JourneyConfig, Self::Error> {
        Ok(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(label: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pitch-tester-{label}-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let path = temp_file("config", r#"{ "transition_ms": 250 }"#);
        let loader = TesterLoader::with_config_file(&path).unwrap();
        let config = loader.load_config().unwrap();
        assert_eq!(config.transition_ms, 250);
        assert_eq!(config.auto_advance_ms, JourneyConfig::default().auto_advance_ms);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let path = temp_file("bad-config", r#"{ "history_capacity": 0 }"#);
        let err = TesterLoader::with_config_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("history capacity"));
    }
}
