pub mod toml_config;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_RATINGS_SERVICE: &str = "ratings-data-service";
pub const DEFAULT_METADATA_SERVICE: &str = "movie-info-service";
pub const DEFAULT_CLIENT_TIMEOUT_MS: u64 = 5_000;
pub const MAX_TIMEOUT_MS: u64 = 600_000;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use crate::core::aggregator::DEFAULT_MAX_IN_FLIGHT;
    use crate::core::policy::FailurePolicy;
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_range, validate_socket_addr, validate_url, Validate};
    use clap::Parser;
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "movie-catalog")]
    #[command(about = "Serves a user's rated movies joined with movie details")]
    pub struct CliConfig {
        #[arg(long, env = "CATALOG_CONFIG", help = "Load settings from a TOML file instead of flags")]
        pub config: Option<PathBuf>,

        #[arg(long, env = "CATALOG_BIND", default_value = DEFAULT_BIND)]
        pub bind: String,

        #[arg(long, env = "RATINGS_SERVICE_URL", default_value = "http://localhost:8083")]
        pub ratings_url: String,

        #[arg(long, env = "METADATA_SERVICE_URL", default_value = "http://localhost:8081")]
        pub metadata_url: String,

        #[arg(
            long,
            env = "CATALOG_MAX_IN_FLIGHT",
            default_value_t = DEFAULT_MAX_IN_FLIGHT,
            help = "Concurrent metadata lookups per request, 0 for unbounded"
        )]
        pub max_in_flight: usize,

        #[arg(long, env = "CATALOG_FAILURE_POLICY", default_value = "strict")]
        pub failure_policy: FailurePolicy,

        #[arg(long, env = "CATALOG_REQUEST_TIMEOUT_MS")]
        pub request_timeout_ms: Option<u64>,

        #[arg(long, env = "CATALOG_CLIENT_TIMEOUT_MS", default_value_t = DEFAULT_CLIENT_TIMEOUT_MS)]
        pub client_timeout_ms: u64,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,
    }

    impl ConfigProvider for CliConfig {
        fn bind_address(&self) -> &str {
            &self.bind
        }

        fn ratings_service(&self) -> &str {
            DEFAULT_RATINGS_SERVICE
        }

        fn metadata_service(&self) -> &str {
            DEFAULT_METADATA_SERVICE
        }

        fn service_urls(&self) -> Vec<(String, String)> {
            vec![
                (DEFAULT_RATINGS_SERVICE.to_string(), self.ratings_url.clone()),
                (DEFAULT_METADATA_SERVICE.to_string(), self.metadata_url.clone()),
            ]
        }

        fn max_in_flight(&self) -> Option<usize> {
            (self.max_in_flight > 0).then_some(self.max_in_flight)
        }

        fn failure_policy(&self) -> FailurePolicy {
            self.failure_policy
        }

        fn request_timeout(&self) -> Option<Duration> {
            self.request_timeout_ms.map(Duration::from_millis)
        }

        fn client_timeout(&self) -> Duration {
            Duration::from_millis(self.client_timeout_ms)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_socket_addr("bind", &self.bind)?;
            validate_url("ratings_url", &self.ratings_url)?;
            validate_url("metadata_url", &self.metadata_url)?;
            validate_range("client_timeout_ms", self.client_timeout_ms, 1, MAX_TIMEOUT_MS)?;
            if let Some(ms) = self.request_timeout_ms {
                validate_range("request_timeout_ms", ms, 1, MAX_TIMEOUT_MS)?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = CliConfig::try_parse_from(["movie-catalog"]).unwrap();

            assert_eq!(config.bind_address(), DEFAULT_BIND);
            assert_eq!(config.failure_policy(), FailurePolicy::Strict);
            assert_eq!(config.max_in_flight(), Some(DEFAULT_MAX_IN_FLIGHT));
            assert_eq!(config.request_timeout(), None);
            assert_eq!(
                config.client_timeout(),
                Duration::from_millis(DEFAULT_CLIENT_TIMEOUT_MS)
            );
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_flags_override_defaults() {
            let config = CliConfig::try_parse_from([
                "movie-catalog",
                "--ratings-url",
                "http://ratings.internal:9000",
                "--max-in-flight",
                "0",
                "--failure-policy",
                "best-effort",
                "--request-timeout-ms",
                "1500",
            ])
            .unwrap();

            assert_eq!(config.max_in_flight(), None);
            assert_eq!(config.failure_policy(), FailurePolicy::BestEffort);
            assert_eq!(config.request_timeout(), Some(Duration::from_millis(1500)));
            assert!(config.service_urls().contains(&(
                DEFAULT_RATINGS_SERVICE.to_string(),
                "http://ratings.internal:9000".to_string()
            )));
        }

        #[test]
        fn test_rejects_unknown_policy() {
            let result =
                CliConfig::try_parse_from(["movie-catalog", "--failure-policy", "lenient"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_validation_rejects_bad_url() {
            let config =
                CliConfig::try_parse_from(["movie-catalog", "--metadata-url", "not a url"])
                    .unwrap();
            assert!(config.validate().is_err());
        }
    }
}
