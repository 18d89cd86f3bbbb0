use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::{QueryOptions, RequestOptions};
use crate::storage::StoreNamespace;

/// Application configuration DTO.
///
/// 应用配置 DTO。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub request: RequestConfig,
    pub query: QueryConfig,
    pub storage: StorageConfig,
    pub connectivity: ConnectivityConfig,
}

/// Remote identity/data service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL (may be empty - reported at bootstrap, not rejected here)
    /// 服务地址（可能为空，由启动阶段报告）
    pub url: String,
    /// Public anon key sent as `apikey`.
    pub anon_key: String,
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound on the loading indicator during startup.
    /// 启动时 loading 标志的最长持续时间。
    pub init_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 1_000,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub namespace_prefix: String,
    pub known_store_names: Vec<String>,
    pub namespace_marker: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let ns = StoreNamespace::default();
        Self {
            namespace_prefix: ns.prefix,
            known_store_names: ns.known_names,
            namespace_marker: ns.marker,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Host to probe; empty means "derive from backend url".
    pub probe_host: String,
    pub probe_port: u16,
    pub probe_interval_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_host: String::new(),
            probe_port: 443,
            probe_interval_ms: 5_000,
            probe_timeout_ms: 3_000,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    /// 解析 TOML 文本。
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            retries: self.request.retries,
            retry_delay: Duration::from_millis(self.request.retry_delay_ms),
            timeout: Duration::from_millis(self.request.timeout_ms),
        }
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            retries: self.query.retries,
            retry_delay: Duration::from_millis(self.query.retry_delay_ms),
        }
    }

    pub fn store_namespace(&self) -> StoreNamespace {
        StoreNamespace {
            prefix: self.storage.namespace_prefix.clone(),
            marker: self.storage.namespace_marker.clone(),
            known_names: self.storage.known_store_names.clone(),
        }
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.session.init_timeout_ms)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.init_timeout(), Duration::from_millis(8_000));
        assert_eq!(config.request_options(), RequestOptions::default());
        assert_eq!(config.query_options(), QueryOptions::default());
        assert_eq!(config.store_namespace(), StoreNamespace::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [backend]
            url = "https://abc.supabase.co"

            [request]
            retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://abc.supabase.co");
        assert_eq!(config.backend.anon_key, "");
        assert_eq!(config.backend.request_timeout_ms, 10_000);
        assert_eq!(config.request.retries, 5);
        assert_eq!(config.request.retry_delay_ms, 1_000);
        assert_eq!(config.connectivity.probe_port, 443);
    }

    #[test]
    fn storage_section_maps_to_namespace() {
        let config = AppConfig::from_toml_str(
            r#"
            [storage]
            namespace_prefix = "test-"
            known_store_names = ["a", "b"]
            "#,
        )
        .unwrap();

        let ns = config.store_namespace();
        assert_eq!(ns.prefix, "test-");
        assert_eq!(ns.known_names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ns.marker, "NomAI");
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(AppConfig::from_toml_str("[session]\ninit_timeout_ms = \"soon\"").is_err());
    }
}
