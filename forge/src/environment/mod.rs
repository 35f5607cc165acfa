use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use forge_api_rest::RestServerConfig;
use forge_config::Config;
use forge_core_contact_impl::{ContactFeatureConfig, ContactFeatureServiceImpl};
use forge_core_health_impl::{HealthFeatureConfig, HealthFeatureServiceImpl};
use forge_templates_impl::TemplateServiceImpl;
use types::{Email, RestServer, Template};

pub mod types;

/// The default provider, capable of providing all the dependencies
#[derive(Debug, Clone)]
pub struct Provider {
    config: ConfigProvider,
    email: Email,
    template: Template,
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            email,
            template: TemplateServiceImpl::new()?,
        })
    }

    pub fn rest_server(&self) -> RestServer {
        RestServer {
            health: HealthFeatureServiceImpl::new(
                self.email.clone(),
                self.config.health_feature_config.clone(),
            ),
            contact: ContactFeatureServiceImpl {
                template: self.template.clone(),
                email: self.email.clone(),
                config: self.config.contact_feature_config.clone(),
            },
            config: self.config.rest_server_config.clone(),
        }
    }
}

/// Reduced provider, holding the service configs derived from [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    // API
    rest_server_config: RestServerConfig,

    // Core
    contact_feature_config: ContactFeatureConfig,
    health_feature_config: HealthFeatureConfig,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let rest_server_config = RestServerConfig {
            host: config.http.host,
            port: config.http.port,
            allowed_origins: config
                .http
                .allowed_origins
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin)
                        .with_context(|| format!("Invalid allowed origin {origin:?}"))
                })
                .collect::<anyhow::Result<_>>()?,
        };

        // Core
        let contact_feature_config = ContactFeatureConfig {
            recipient: Arc::new(config.contact.recipient.clone().into()),
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        };

        Ok(Self {
            rest_server_config,
            contact_feature_config,
            health_feature_config,
        })
    }
}
