use crate::core::{ConfigProvider, ServiceResolver};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::validate_url;
use std::collections::HashMap;
use url::Url;

/// Resolves service names from a fixed table, typically built from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    services: HashMap<String, Url>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, service_name: &str, url: &str) -> Result<()> {
        let parsed = validate_url(&format!("services.{}.url", service_name), url)?;
        self.services.insert(service_name.to_string(), parsed);
        Ok(())
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let mut resolver = Self::new();
        for (name, url) in config.service_urls() {
            resolver.register(&name, &url)?;
        }
        Ok(resolver)
    }
}

impl ServiceResolver for StaticResolver {
    fn resolve(&self, service_name: &str) -> Result<Url> {
        self.services
            .get(service_name)
            .cloned()
            .ok_or_else(|| CatalogError::ServiceNotRegistered {
                service: service_name.to_string(),
            })
    }
}
