//! # Configuration Loader / 配置加载器
//!
//! Reads `config.toml`, layers environment overrides on top and reports
//! suspicious backend credentials. A missing file means defaults.
//!
//! 读取配置文件，叠加环境变量覆盖，并检查后端凭据。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use nm_app::AppPaths;
use nm_core::config::{AppConfig, BackendConfig};
use nm_core::ports::{AppDirsError, AppDirsPort};
use nm_platform::DirsAppDirsAdapter;
use thiserror::Error;
use tracing::{error, info, warn};

pub const BACKEND_URL_ENV: &str = "NOMAI_BACKEND_URL";
pub const BACKEND_ANON_KEY_ENV: &str = "NOMAI_BACKEND_ANON_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to resolve app directories: {0}")]
    AppDirs(#[from] AppDirsError),
}

/// Load configuration from a TOML file. A missing file yields defaults.
/// 从 TOML 文件加载配置；文件不存在时使用默认值。
pub fn load_config(config_path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })
        }
    };

    AppConfig::from_toml_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}

/// Environment wins over the file for backend credentials.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.is_empty()) {
        config.backend.url = url;
    }
    if let Some(key) = lookup(BACKEND_ANON_KEY_ENV).filter(|v| !v.is_empty()) {
        config.backend.anon_key = key;
    }
}

/// `.env` → file (explicit path or `<app data>/config.toml`) → environment.
pub fn load_app_config(explicit_path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let config_path = match explicit_path {
        Some(path) => path,
        None => {
            let dirs = DirsAppDirsAdapter::new().get_app_dirs()?;
            AppPaths::from_app_dirs(&dirs).config_path
        }
    };

    let mut config = load_config(&config_path)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialIssue {
    MissingUrl,
    PlaceholderUrl,
    MissingAnonKey,
    /// A service-role secret is configured where the public key belongs.
    ServiceRoleKey,
    UnrecognizedKey,
}

impl CredentialIssue {
    pub fn is_fatal(self) -> bool {
        !matches!(self, CredentialIssue::ServiceRoleKey)
    }
}

pub fn inspect_credentials(backend: &BackendConfig) -> Vec<CredentialIssue> {
    let mut issues = Vec::new();

    let url = backend.url.trim();
    if url.is_empty() {
        issues.push(CredentialIssue::MissingUrl);
    } else if url.contains("your-project-id") || url.contains("placeholder") {
        issues.push(CredentialIssue::PlaceholderUrl);
    }

    let key = backend.anon_key.trim();
    if key.is_empty() {
        issues.push(CredentialIssue::MissingAnonKey);
    } else if key.starts_with("sb_secret") {
        issues.push(CredentialIssue::ServiceRoleKey);
    } else if !key.starts_with("eyJ") && !key.starts_with("sb_publishable") {
        issues.push(CredentialIssue::UnrecognizedKey);
    }

    issues
}

pub fn log_credential_issues(config: &AppConfig) {
    let issues = inspect_credentials(&config.backend);
    if issues.is_empty() {
        info!(url = %config.backend.url, "backend credentials configured");
        return;
    }

    for issue in issues {
        if issue.is_fatal() {
            error!(
                ?issue,
                "backend credentials misconfigured; set {BACKEND_URL_ENV} and {BACKEND_ANON_KEY_ENV} or edit config.toml"
            );
        } else {
            warn!(?issue, "service-role key configured on a client; use the anon key");
        }
    }
}
