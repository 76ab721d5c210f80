use super::Result;
use crate::api::endpoints::BASE_URL;
use crate::api::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::api::rate_limiter::DEFAULT_MIN_DELAY;
use crate::error::{ConfigError, StorageError};
use crate::storage::credentials::KeyringBackend;
use crate::utils::validation::validate_url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR_NAME: &str = "fiken";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Keys accepted by `fiken config set`.
pub const CONFIG_KEYS: [&str; 4] = ["api-url", "rate-limit-ms", "keyring-backend", "page-size"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyring_backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Config {
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path(None)?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
            path: config_path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path(None)?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigSaveFailed {
            message: e.to_string(),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    /// `--config-dir` if given, otherwise `<user config dir>/fiken`.
    pub fn config_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
        match override_dir {
            Some(dir) => Ok(dir.to_path_buf()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(StorageError::ConfigDirNotFound),
        }
    }

    pub fn config_file_path(override_dir: Option<&Path>) -> Result<PathBuf> {
        Ok(Self::config_dir(override_dir)?.join(CONFIG_FILE_NAME))
    }

    /// Validate and store one `config set` key.
    pub fn set_value(&mut self, key: &str, value: &str) -> std::result::Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match key {
            "api-url" => {
                validate_url(value).map_err(|e| invalid(&e.to_string()))?;
                self.api_url = Some(value.trim_end_matches('/').to_string());
            }
            "rate-limit-ms" => {
                let floor = DEFAULT_MIN_DELAY.as_millis() as u64;
                let millis = value
                    .parse::<u64>()
                    .ok()
                    .filter(|millis| *millis >= floor)
                    .ok_or_else(|| {
                        invalid(&format!("expected at least {} milliseconds", floor))
                    })?;
                self.rate_limit_ms = Some(millis);
            }
            "keyring-backend" => {
                let backend = value.parse::<KeyringBackend>()?;
                self.keyring_backend = Some(backend.as_str().to_string());
            }
            "page-size" => {
                let size = value
                    .parse::<u32>()
                    .ok()
                    .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
                    .ok_or_else(|| invalid("expected a number between 1 and 100"))?;
                self.page_size = Some(size);
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Environment override first, then the file, then the built-in URL.
    pub fn effective_api_url(&self, env_override: Option<&str>) -> String {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or(self.api_url.as_deref())
            .unwrap_or(BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn effective_min_delay(&self) -> Duration {
        self.rate_limit_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_MIN_DELAY)
    }

    pub fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Flag (or its environment variable) first, then the file, then `auto`.
    pub fn effective_keyring_backend(
        &self,
        flag: Option<&str>,
    ) -> std::result::Result<KeyringBackend, ConfigError> {
        flag.or(self.keyring_backend.as_deref())
            .map(str::parse)
            .unwrap_or(Ok(KeyringBackend::Auto))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.effective_api_url(None), BASE_URL);
        assert_eq!(config.effective_min_delay(), Duration::from_millis(250));
        assert_eq!(config.effective_page_size(), 25);
        assert_eq!(
            config.effective_keyring_backend(None).unwrap(),
            KeyringBackend::Auto
        );
    }

    #[test]
    fn test_config_load_missing_file_is_default() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load(Some(temp_dir.path().join("config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_save() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            api_url: Some("http://localhost:8080".to_string()),
            rate_limit_ms: Some(0),
            keyring_backend: Some("file".to_string()),
            page_size: Some(50),
        };
        config
            .save(Some(config_path.clone()))
            .expect("Failed to save config");

        let loaded = Config::load(Some(config_path)).expect("Failed to load config");
        assert_eq!(loaded, config);
        assert_eq!(loaded.effective_min_delay(), Duration::ZERO);
    }

    #[test]
    fn test_config_parse_error_names_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "rate_limit_ms = \"fast\"").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(matches!(err, StorageError::ConfigParseError { .. }));
    }

    #[test]
    fn test_set_value_validates_keys() {
        let mut config = Config::default();

        config.set_value("api-url", "http://127.0.0.1:9000/").unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://127.0.0.1:9000"));

        config.set_value("rate-limit-ms", "500").unwrap();
        assert_eq!(config.rate_limit_ms, Some(500));

        config.set_value("keyring-backend", "FILE").unwrap();
        assert_eq!(config.keyring_backend.as_deref(), Some("file"));

        config.set_value("page-size", "100").unwrap();
        assert_eq!(config.page_size, Some(100));

        assert!(matches!(
            config.set_value("page-size", "101"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("rate-limit-ms", "-1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("rate-limit-ms", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("rate-limit-ms", "249"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(config.rate_limit_ms, Some(500));
        config.set_value("rate-limit-ms", "250").unwrap();
        assert_eq!(config.rate_limit_ms, Some(250));
        assert!(matches!(
            config.set_value("api-url", "ftp://nope"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("keyring-backend", "pigeon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("color", "blue"),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_effective_values_precedence() {
        let config = Config {
            api_url: Some("http://from-file.test".to_string()),
            keyring_backend: Some("keychain".to_string()),
            ..Default::default()
        };

        assert_eq!(
            config.effective_api_url(Some("http://from-env.test/")),
            "http://from-env.test"
        );
        assert_eq!(config.effective_api_url(Some("  ")), "http://from-file.test");
        assert_eq!(config.effective_api_url(None), "http://from-file.test");

        assert_eq!(
            config.effective_keyring_backend(Some("file")).unwrap(),
            KeyringBackend::File
        );
        assert_eq!(
            config.effective_keyring_backend(None).unwrap(),
            KeyringBackend::Keychain
        );
    }

    #[test]
    fn test_config_dir_override() {
        let dir = Config::config_dir(Some(Path::new("/tmp/fiken-test"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/fiken-test"));
        assert_eq!(
            Config::config_file_path(Some(Path::new("/tmp/fiken-test"))).unwrap(),
            PathBuf::from("/tmp/fiken-test/config.toml")
        );
    }
}
