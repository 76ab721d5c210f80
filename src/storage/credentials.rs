use super::Result;
use crate::error::{AuthError, ConfigError, StorageError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

pub const SERVICE_NAME: &str = "fiken-cli";
pub const SECRETS_FILE_NAME: &str = "secrets.toml";

const KEY_API_TOKEN: &str = "api-token";
const KEY_DEFAULT_COMPANY: &str = "default-company";

const LEGACY_TOKEN_FILE_NAME: &str = "token";
const LEGACY_CONFIG_FILE_NAME: &str = "config.json";

/// Key/value storage for secrets.
pub trait SecretStore: Send + Sync {
    fn get_secret(&self, key: &str) -> Result<Option<String>>;
    fn set_secret(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a key that does not exist succeeds.
    fn delete_secret(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyringBackend {
    Auto,
    SecretService,
    Keychain,
    WinCred,
    File,
}

impl KeyringBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyringBackend::Auto => "auto",
            KeyringBackend::SecretService => "secret-service",
            KeyringBackend::Keychain => "keychain",
            KeyringBackend::WinCred => "wincred",
            KeyringBackend::File => "file",
        }
    }
}

impl fmt::Display for KeyringBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyringBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(KeyringBackend::Auto),
            "secret-service" => Ok(KeyringBackend::SecretService),
            "keychain" => Ok(KeyringBackend::Keychain),
            "wincred" => Ok(KeyringBackend::WinCred),
            "file" => Ok(KeyringBackend::File),
            other => Err(ConfigError::InvalidValue {
                field: "keyring-backend".to_string(),
                value: other.to_string(),
                reason: "expected one of auto, secret-service, keychain, wincred, file".to_string(),
            }),
        }
    }
}

/// Open the store for `backend`. The OS-specific keyring names all resolve
/// to the platform's native keyring.
pub fn open_store(backend: KeyringBackend, config_dir: &Path) -> Box<dyn SecretStore> {
    match backend {
        KeyringBackend::File => Box::new(FileStore::new(config_dir.join(SECRETS_FILE_NAME))),
        _ => Box::new(KeyringStore::new(SERVICE_NAME)),
    }
}

/// Secrets in the OS keyring.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key)
            .map_err(|e| StorageError::KeyringError(e.to_string()))
    }
}

impl SecretStore for KeyringStore {
    fn get_secret(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(v) => Ok(Some(v)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::KeyringError(e.to_string())),
        }
    }

    fn set_secret(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StorageError::KeyringError(e.to_string()))
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::KeyringError(e.to_string())),
        }
    }
}

/// Secrets in a TOML file readable only by the owner.
///
/// Used where no OS keyring is available (containers, CI).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_io(&self, source: io::Error) -> StorageError {
        StorageError::FileIo {
            path: self.path.to_string_lossy().to_string(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.file_io(e)),
        };
        toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
            path: self.path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }

    fn write_all(&self, secrets: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.file_io(e))?;
        }
        let content = toml::to_string(secrets).map_err(|e| StorageError::ConfigSaveFailed {
            message: e.to_string(),
        })?;
        fs::write(&self.path, content).map_err(|e| self.file_io(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| self.file_io(e))?;
        }
        Ok(())
    }
}

impl SecretStore for FileStore {
    fn get_secret(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_secret(&self, key: &str, value: &str) -> Result<()> {
        let mut secrets = self.read_all()?;
        secrets.insert(key.to_string(), value.to_string());
        self.write_all(&secrets)
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        let mut secrets = self.read_all()?;
        if secrets.remove(key).is_some() {
            self.write_all(&secrets)?;
        }
        Ok(())
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn secrets(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.secrets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SecretStore for MemoryStore {
    fn get_secret(&self, key: &str) -> Result<Option<String>> {
        Ok(self.secrets().get(key).cloned())
    }

    fn set_secret(&self, key: &str, value: &str) -> Result<()> {
        self.secrets().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        self.secrets().remove(key);
        Ok(())
    }
}

#[derive(Deserialize)]
struct LegacyConfig {
    #[serde(default)]
    default_company: String,
}

/// What `migrate_legacy` moved into the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub token: bool,
    pub default_company: bool,
}

/// API token and default company on top of a `SecretStore`.
pub struct Credentials {
    store: Box<dyn SecretStore>,
    config_dir: PathBuf,
}

impl Credentials {
    pub fn new(store: Box<dyn SecretStore>, config_dir: PathBuf) -> Self {
        Self { store, config_dir }
    }

    fn legacy_token_path(&self) -> PathBuf {
        self.config_dir.join(LEGACY_TOKEN_FILE_NAME)
    }

    fn legacy_config_path(&self) -> PathBuf {
        self.config_dir.join(LEGACY_CONFIG_FILE_NAME)
    }

    /// Move the plaintext `token` file and `config.json` left by older
    /// releases into the store, deleting them afterwards.
    pub fn migrate_legacy(&self) -> Result<Migration> {
        let mut migration = Migration::default();

        let token_path = self.legacy_token_path();
        if let Ok(content) = fs::read_to_string(&token_path) {
            let token = content.trim();
            if !token.is_empty() {
                self.store.set_secret(KEY_API_TOKEN, token)?;
                migration.token = true;
            }
            remove_if_exists(&token_path)?;
        }

        let config_path = self.legacy_config_path();
        if let Ok(content) = fs::read_to_string(&config_path) {
            match serde_json::from_str::<LegacyConfig>(&content) {
                Ok(legacy) => {
                    let company = legacy.default_company.trim();
                    if !company.is_empty() {
                        self.store.set_secret(KEY_DEFAULT_COMPANY, company)?;
                        migration.default_company = true;
                    }
                    remove_if_exists(&config_path)?;
                }
                Err(e) => log::warn!("ignoring unreadable {}: {}", config_path.display(), e),
            }
        }

        Ok(migration)
    }

    fn migrate_quietly(&self) {
        match self.migrate_legacy() {
            Ok(migration) => {
                if migration.token {
                    eprintln!("✅ Migrated API token from plaintext file to secure storage");
                }
                if migration.default_company {
                    eprintln!("✅ Migrated default company from config.json to secure storage");
                }
            }
            Err(e) => log::warn!("legacy credential migration failed: {}", e),
        }
    }

    /// The stored token, trimmed. Missing and blank tokens are both `NoToken`.
    pub fn load_token(&self) -> crate::Result<String> {
        self.migrate_quietly();
        let token = self.store.get_secret(KEY_API_TOKEN)?.unwrap_or_default();
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::NoToken.into());
        }
        Ok(token.to_string())
    }

    pub fn save_token(&self, token: &str) -> crate::Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyToken.into());
        }
        self.store.set_secret(KEY_API_TOKEN, token)?;
        Ok(())
    }

    pub fn remove_token(&self) -> Result<()> {
        self.store.delete_secret(KEY_API_TOKEN)?;
        remove_if_exists(&self.legacy_token_path())
    }

    pub fn has_token(&self) -> bool {
        if self.legacy_token_path().exists() {
            return true;
        }
        matches!(self.store.get_secret(KEY_API_TOKEN), Ok(Some(token)) if !token.trim().is_empty())
    }

    pub fn default_company(&self) -> Result<Option<String>> {
        self.migrate_quietly();
        Ok(self
            .store
            .get_secret(KEY_DEFAULT_COMPANY)?
            .map(|company| company.trim().to_string())
            .filter(|company| !company.is_empty()))
    }

    /// Store the default company slug. An empty slug clears it.
    pub fn set_default_company(&self, slug: &str) -> Result<()> {
        let slug = slug.trim();
        if slug.is_empty() {
            self.store.delete_secret(KEY_DEFAULT_COMPANY)
        } else {
            self.store.set_secret(KEY_DEFAULT_COMPANY, slug)
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::FileIo {
            path: path.to_string_lossy().to_string(),
            source,
        }),
    }
}

/// Mask a token for display, keeping four characters at each end.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}
