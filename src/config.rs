use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sign-in restrictions
    pub auth: AuthConfig,
    /// Remote repository settings
    pub repository: RepositoryConfig,
    /// Local store settings
    pub local_store: LocalStoreConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Where backend identifiers are read from
    pub environment: EnvironmentFileConfig,
}

/// Authentication settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The only email domain allowed to sign in
    pub allowed_domain: String,
}

/// Collection names and listing limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Collection holding user profiles
    pub users_collection: String,
    /// Collection holding items
    pub items_collection: String,
    /// Maximum documents fetched per listing
    pub default_list_limit: usize,
    /// Maximum documents scanned per search
    pub search_limit: usize,
}

/// Local SQLite store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalStoreConfig {
    /// Database file path
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level
    pub level: String,
    /// Daily-rolled log file, stdout only when unset
    pub file_path: Option<String>,
    /// `json` or `text`
    pub format: String,
}

/// Settings file location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentFileConfig {
    /// Bundled `KEY=value` settings file holding backend identifiers
    pub env_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig {
                allowed_domain: "iiitdm.ac.in".to_string(),
            },
            repository: RepositoryConfig {
                users_collection: "users".to_string(),
                items_collection: "items".to_string(),
                default_list_limit: 50,
                search_limit: 100,
            },
            local_store: LocalStoreConfig {
                path: "data/items.db".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            environment: EnvironmentFileConfig {
                env_file: ".env".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .add_source(Config::try_from(&Self::default())?)
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("LOST_FOUND").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Load defaults overlaid with a single config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration from {}: {}", path.display(), e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let domain = self.auth.allowed_domain.trim();
        if domain.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(anyhow::anyhow!(
                "Invalid allowed_domain: {:?}. Expected a bare domain such as iiitdm.ac.in",
                self.auth.allowed_domain
            ));
        }

        if self.repository.users_collection.is_empty() || self.repository.items_collection.is_empty() {
            return Err(anyhow::anyhow!("Collection names cannot be empty"));
        }
        if self.repository.default_list_limit == 0 {
            return Err(anyhow::anyhow!("default_list_limit must be greater than 0"));
        }
        if self.repository.search_limit == 0 {
            return Err(anyhow::anyhow!("search_limit must be greater than 0"));
        }

        if self.local_store.path.trim().is_empty() {
            return Err(anyhow::anyhow!("local_store.path cannot be empty"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        Ok(())
    }

    /// Path of the local store file
    pub fn local_store_path(&self) -> PathBuf {
        PathBuf::from(&self.local_store.path)
    }
}

/// Key for [`EnvironmentConfig::project_number`]
pub const FIREBASE_PROJECT_NUMBER: &str = "FIREBASE_PROJECT_NUMBER";
/// Key for [`EnvironmentConfig::project_id`]
pub const FIREBASE_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
/// Key for [`EnvironmentConfig::storage_bucket`]
pub const FIREBASE_STORAGE_BUCKET: &str = "FIREBASE_STORAGE_BUCKET";
/// Key for [`EnvironmentConfig::mobile_sdk_app_id`]
pub const FIREBASE_MOBILE_SDK_APP_ID: &str = "FIREBASE_MOBILE_SDK_APP_ID";
/// Key for [`EnvironmentConfig::oauth_client_id_android`]
pub const FIREBASE_OAUTH_CLIENT_ID_ANDROID: &str = "FIREBASE_OAUTH_CLIENT_ID_ANDROID";
/// Key for [`EnvironmentConfig::oauth_client_id_web`]
pub const FIREBASE_OAUTH_CLIENT_ID_WEB: &str = "FIREBASE_OAUTH_CLIENT_ID_WEB";
/// Key for [`EnvironmentConfig::api_key`]
pub const FIREBASE_API_KEY: &str = "FIREBASE_API_KEY";
/// Key for [`EnvironmentConfig::crash_reporting_api_key`]
pub const FIREBASE_CRASH_REPORTING_API_KEY: &str = "FIREBASE_CRASH_REPORTING_API_KEY";
/// Key for [`EnvironmentConfig::certificate_hash`]
pub const FIREBASE_CERTIFICATE_HASH: &str = "FIREBASE_CERTIFICATE_HASH";
/// Key for [`EnvironmentConfig::package_name`]
pub const ANDROID_PACKAGE_NAME: &str = "ANDROID_PACKAGE_NAME";

/// Backend connection identifiers
///
/// Each value is resolved once, at construction: process environment first,
/// then the bundled settings file, then the built-in placeholder. The struct is
/// then passed to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// Numeric project identifier
    pub project_number: String,
    /// Project id
    pub project_id: String,
    /// Blob storage bucket
    pub storage_bucket: String,
    /// Mobile SDK application id
    pub mobile_sdk_app_id: String,
    /// OAuth client id for the mobile client
    pub oauth_client_id_android: String,
    /// OAuth client id requested for id tokens
    pub oauth_client_id_web: String,
    /// Web API key
    pub api_key: String,
    /// Crash reporting API key
    pub crash_reporting_api_key: String,
    /// Signing certificate hash
    pub certificate_hash: String,
    /// Application package name
    pub package_name: String,
}

impl EnvironmentConfig {
    /// Resolve from the process environment and the settings file at `env_file`.
    /// A missing or unreadable file is not an error.
    pub fn load(env_file: &Path) -> Self {
        let file_values = read_env_file(env_file);
        Self::resolve(|key| std::env::var(key).ok(), &file_values)
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve<F>(env: F, file_values: &HashMap<String, String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| -> String {
            if let Some(value) = env(key).filter(|v| !v.is_empty()) {
                return value;
            }
            if let Some(value) = file_values.get(key).filter(|v| !v.is_empty()) {
                return value.clone();
            }
            default.to_string()
        };

        Self {
            project_number: get(FIREBASE_PROJECT_NUMBER, "your_project_number_here"),
            project_id: get(FIREBASE_PROJECT_ID, "your_project_id_here"),
            storage_bucket: get(FIREBASE_STORAGE_BUCKET, "your_project_id.firebasestorage.app"),
            mobile_sdk_app_id: get(FIREBASE_MOBILE_SDK_APP_ID, "1:your_project_number:android:your_app_id_hash"),
            oauth_client_id_android: get(
                FIREBASE_OAUTH_CLIENT_ID_ANDROID,
                "your_project_number-your_android_client_id.apps.googleusercontent.com",
            ),
            oauth_client_id_web: get(
                FIREBASE_OAUTH_CLIENT_ID_WEB,
                "your_project_number-your_web_client_id.apps.googleusercontent.com",
            ),
            api_key: get(FIREBASE_API_KEY, "your_firebase_api_key_here"),
            crash_reporting_api_key: get(FIREBASE_CRASH_REPORTING_API_KEY, "your_crash_reporting_api_key_here"),
            certificate_hash: get(FIREBASE_CERTIFICATE_HASH, "your_certificate_hash_here"),
            package_name: get(ANDROID_PACKAGE_NAME, "com.institute.lostandfound"),
        }
    }

    /// Key/value pairs for display, with keys and hashes masked
    pub fn masked_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (FIREBASE_PROJECT_NUMBER, self.project_number.clone()),
            (FIREBASE_PROJECT_ID, self.project_id.clone()),
            (FIREBASE_STORAGE_BUCKET, self.storage_bucket.clone()),
            (FIREBASE_MOBILE_SDK_APP_ID, self.mobile_sdk_app_id.clone()),
            (FIREBASE_OAUTH_CLIENT_ID_ANDROID, self.oauth_client_id_android.clone()),
            (FIREBASE_OAUTH_CLIENT_ID_WEB, self.oauth_client_id_web.clone()),
            (FIREBASE_API_KEY, mask(&self.api_key)),
            (FIREBASE_CRASH_REPORTING_API_KEY, mask(&self.crash_reporting_api_key)),
            (FIREBASE_CERTIFICATE_HASH, mask(&self.certificate_hash)),
            (ANDROID_PACKAGE_NAME, self.package_name.clone()),
        ]
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

/// Parse a bundled `.env` file without touching the process environment
fn read_env_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            warn!("{} not loaded, using system environment variables: {}", path.display(), e);
            return HashMap::new();
        },
    };

    let mut values = HashMap::new();
    for entry in iter {
        match entry {
            Ok((key, value)) => {
                values.insert(key, value);
            },
            Err(e) => warn!("Skipping malformed line in {}: {}", path.display(), e),
        }
    }
    debug!("Loaded {} entries from {}", values.len(), path.display());
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.auth.allowed_domain, "iiitdm.ac.in");
        assert_eq!(config.repository.default_list_limit, 50);
        assert_eq!(config.repository.search_limit, 100);
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.repository.search_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn mask_keeps_a_short_prefix() {
        assert_eq!(mask("AIzaSyExample"), "AIza****");
        assert_eq!(mask(""), "****");
    }
}
