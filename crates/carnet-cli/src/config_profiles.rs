//! Persistent CLI profile configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use carnet_core::config::ClientConfig;
use carnet_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "cli-config.json";
const PROFILE_ENV: &str = "CARNET_PROFILE";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, ClientConfig>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("carnet").join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    normalize_text_option(value.map(str::to_string))
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!(
                "Failed to read config at {}: {}",
                path.display(),
                error
            ))
        })?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            CliError::Config(format!(
                "Failed to parse config at {}: {}",
                path.display(),
                error
            ))
        })?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Explicit flag, then `CARNET_PROFILE`, then the active profile.
    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        self.resolve_profile_name_with_env(explicit, std::env::var(PROFILE_ENV).ok().as_deref())
    }

    fn resolve_profile_name_with_env(&self, explicit: Option<&str>, env: Option<&str>) -> String {
        normalize_profile_name(explicit)
            .or_else(|| normalize_profile_name(env))
            .or_else(|| normalize_profile_name(self.active_profile.as_deref()))
            .unwrap_or_else(|| "default".to_string())
    }

    pub fn profile(&self, name: &str) -> ClientConfig {
        self.profiles.get(name).cloned().unwrap_or_default()
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut ClientConfig {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.api_base_url = profile.api_base_url();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalize_profile_name_rejects_empty() {
        assert_eq!(normalize_profile_name(None), None);
        assert_eq!(normalize_profile_name(Some(" ")), None);
        assert_eq!(normalize_profile_name(Some(" work ")), Some("work".to_string()));
    }

    #[test]
    fn config_roundtrip_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CliProfilesConfig {
            version: 1,
            active_profile: Some(" default ".to_string()),
            profiles: BTreeMap::new(),
        };
        config.profile_mut_or_default("default").api_base_url =
            Some(" https://api.example.com/api ".to_string());

        config.save_to_path(&path).unwrap();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.active_profile.as_deref(), Some("default"));
        assert_eq!(
            loaded.profile("default").api_base_url.as_deref(),
            Some("https://api.example.com/api")
        );
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CliProfilesConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, CliProfilesConfig::default());
    }

    #[test]
    fn resolve_profile_name_prefers_explicit_then_env_then_active() {
        let config = CliProfilesConfig {
            version: 1,
            active_profile: Some("work".to_string()),
            profiles: BTreeMap::new(),
        };
        assert_eq!(
            config.resolve_profile_name_with_env(Some("mobile"), Some("env")),
            "mobile"
        );
        assert_eq!(config.resolve_profile_name_with_env(None, Some("env")), "env");
        assert_eq!(config.resolve_profile_name_with_env(None, None), "work");
        assert_eq!(
            CliProfilesConfig::default().resolve_profile_name_with_env(None, None),
            "default"
        );
    }
}
