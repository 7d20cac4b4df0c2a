//! Provider registry
//!
//! Maps provider names to concrete implementations.

pub mod imagen;
pub mod mock;
pub mod openai;

use crate::config::ElgaConfig;
use crate::provider::GenerationProvider;
use elga_core::{ElgaError, Result};

/// Create a provider by name with configuration.
///
/// Fails with [`ElgaError::MissingCredential`] when a network provider has
/// no API key, so a batch aborts before any job runs.
pub fn create_provider(name: &str, config: &ElgaConfig) -> Result<Box<dyn GenerationProvider>> {
    if !available_providers().contains(&name) {
        return Err(ElgaError::UnknownProvider {
            name: name.to_string(),
            available: available_providers().join(", "),
        });
    }

    if !config.is_enabled(name) {
        return Err(ElgaError::ConfigError(format!(
            "Provider '{}' is disabled in config",
            name
        )));
    }

    match name {
        "openai" => Ok(Box::new(openai::OpenAiProvider::from_config(config)?)),
        "imagen" => Ok(Box::new(imagen::ImagenProvider::from_config(config)?)),
        _ => Ok(Box::new(mock::MockProvider::new())),
    }
}

/// List all available provider names
pub fn available_providers() -> Vec<&'static str> {
    vec!["openai", "imagen", "mock"]
}

/// Error for a provider whose API key is not configured
pub(crate) fn missing_credential(provider: &str) -> ElgaError {
    let env_var = ElgaConfig::credential_env_var(provider)
        .map(str::to_string)
        .unwrap_or_else(|| format!("ELGA_{}_API_KEY", provider.to_uppercase()));
    ElgaError::MissingCredential {
        provider: provider.to_string(),
        env_var,
    }
}
