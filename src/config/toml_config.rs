use crate::config::{
    DEFAULT_BIND, DEFAULT_CLIENT_TIMEOUT_MS, DEFAULT_METADATA_SERVICE, DEFAULT_RATINGS_SERVICE,
    MAX_TIMEOUT_MS,
};
use crate::core::aggregator::DEFAULT_MAX_IN_FLIGHT;
use crate::core::policy::FailurePolicy;
use crate::core::ConfigProvider;
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_socket_addr, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceEntry>,
    pub aggregation: Option<AggregationConfig>,
    pub client: Option<ClientConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub ratings_service: Option<String>,
    pub metadata_service: Option<String>,
    /// 0 disables the bound.
    pub max_in_flight: Option<usize>,
    pub failure_policy: Option<FailurePolicy>,
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub timeout_ms: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 先處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RATINGS_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn aggregation(&self) -> AggregationConfig {
        self.aggregation.clone().unwrap_or_default()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_socket_addr("server.bind", self.bind_address())?;

        for (name, entry) in &self.services {
            validate_non_empty_string("services", name)?;
            validate_url(&format!("services.{}.url", name), &entry.url)?;
        }

        // 聚合器用到的兩個服務都必須有位址
        for required in [self.ratings_service(), self.metadata_service()] {
            if !self.services.contains_key(required) {
                return Err(CatalogError::MissingConfigError {
                    field: format!("services.{}.url", required),
                });
            }
        }

        let aggregation = self.aggregation();
        if let Some(ms) = aggregation.request_timeout_ms {
            validate_range("aggregation.request_timeout_ms", ms, 1, MAX_TIMEOUT_MS)?;
        }
        if let Some(ms) = self.client.as_ref().and_then(|c| c.timeout_ms) {
            validate_range("client.timeout_ms", ms, 1, MAX_TIMEOUT_MS)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn bind_address(&self) -> &str {
        self.server
            .as_ref()
            .map(|s| s.bind.as_str())
            .unwrap_or(DEFAULT_BIND)
    }

    fn ratings_service(&self) -> &str {
        self.aggregation
            .as_ref()
            .and_then(|a| a.ratings_service.as_deref())
            .unwrap_or(DEFAULT_RATINGS_SERVICE)
    }

    fn metadata_service(&self) -> &str {
        self.aggregation
            .as_ref()
            .and_then(|a| a.metadata_service.as_deref())
            .unwrap_or(DEFAULT_METADATA_SERVICE)
    }

    fn service_urls(&self) -> Vec<(String, String)> {
        self.services
            .iter()
            .map(|(name, entry)| (name.clone(), entry.url.clone()))
            .collect()
    }

    fn max_in_flight(&self) -> Option<usize> {
        match self.aggregation().max_in_flight {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_MAX_IN_FLIGHT),
        }
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.aggregation().failure_policy.unwrap_or_default()
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.aggregation()
            .request_timeout_ms
            .map(Duration::from_millis)
    }

    fn client_timeout(&self) -> Duration {
        let ms = self
            .client
            .as_ref()
            .and_then(|c| c.timeout_ms)
            .unwrap_or(DEFAULT_CLIENT_TIMEOUT_MS);
        Duration::from_millis(ms)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[server]
bind = "127.0.0.1:9090"

[services.ratings-data-service]
url = "http://localhost:8083"

[services.movie-info-service]
url = "http://localhost:8081"

[aggregation]
max_in_flight = 4
failure_policy = "best-effort"
request_timeout_ms = 2500

[client]
timeout_ms = 750
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9090");
        assert_eq!(config.max_in_flight(), Some(4));
        assert_eq!(config.failure_policy(), FailurePolicy::BestEffort);
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.client_timeout(), Duration::from_millis(750));
        assert_eq!(config.service_urls().len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_content = r#"
[services.ratings-data-service]
url = "http://localhost:8083"

[services.movie-info-service]
url = "http://localhost:8081"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_address(), DEFAULT_BIND);
        assert_eq!(config.ratings_service(), DEFAULT_RATINGS_SERVICE);
        assert_eq!(config.max_in_flight(), Some(DEFAULT_MAX_IN_FLIGHT));
        assert_eq!(config.failure_policy(), FailurePolicy::Strict);
        assert_eq!(config.request_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_in_flight_is_unbounded() {
        let toml_content = r#"
[services.ratings-data-service]
url = "http://localhost:8083"

[services.movie-info-service]
url = "http://localhost:8081"

[aggregation]
max_in_flight = 0
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.max_in_flight(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_CATALOG_RATINGS_URL", "http://ratings.test:8083");

        let toml_content = r#"
[services.ratings-data-service]
url = "${TEST_CATALOG_RATINGS_URL}"

[services.movie-info-service]
url = "http://localhost:8081"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.services["ratings-data-service"].url,
            "http://ratings.test:8083"
        );

        std::env::remove_var("TEST_CATALOG_RATINGS_URL");
    }

    #[test]
    fn test_missing_service_fails_validation() {
        let toml_content = r#"
[services.ratings-data-service]
url = "http://localhost:8083"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        match config.validate() {
            Err(CatalogError::MissingConfigError { field }) => {
                assert_eq!(field, "services.movie-info-service.url")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_renamed_services_are_looked_up() {
        let toml_content = r#"
[services.ratings]
url = "http://localhost:8083"

[services.movies]
url = "http://localhost:8081"

[aggregation]
ratings_service = "ratings"
metadata_service = "movies"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.ratings_service(), "ratings");
        assert_eq!(config.metadata_service(), "movies");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_invalid_url() {
        let toml_content = r#"
[services.ratings-data-service]
url = "invalid-url"

[services.movie-info-service]
url = "http://localhost:8081"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_policy_is_a_parse_error() {
        let toml_content = r#"
[aggregation]
failure_policy = "lenient"
"#;

        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
    }
}
