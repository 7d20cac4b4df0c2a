//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `ELGA_{PROVIDER}_API_KEY`, then the provider's
//!    conventional variable (`OPENAI_API_KEY`, `GEMINI_API_KEY`)
//! 2. Project-local: `.elga/config.toml`
//! 3. Global: `~/.elga/config.toml`

use elga_core::{ElgaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default directory generated images are written to, relative to the
/// working directory
pub const DEFAULT_OUTPUT_DIR: &str = "public/images/generated";

/// Default pause between provider calls
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Providers that need a credential, with the conventional env variable
const CREDENTIAL_VARS: [(&str, &str); 2] = [("openai", "OPENAI_API_KEY"), ("imagen", "GEMINI_API_KEY")];

/// Provider-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            model: None,
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider used when neither the CLI nor the collection names one
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Overrides the collection's own delay when set
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub skip_existing: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            collection: default_collection(),
            output_dir: default_output_dir(),
            delay_ms: None,
            skip_existing: true,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_collection() -> String {
    "photo".to_string()
}
fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElgaConfigFile {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub generation: Option<GenerationConfig>,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct ElgaConfig {
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
}

impl ElgaConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let global = Self::global_config_path();
        Self::load_layers(
            global.as_deref(),
            Path::new(".elga/config.toml"),
            |name| std::env::var(name).ok(),
        )
    }

    /// Load config from a specific file path only, plus env overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let file = Self::load_file(path)?;
        let mut config = Self::default();
        config.merge(file);
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load the global and project layers (each optional on disk) and apply
    /// overrides from `env`
    pub fn load_layers(
        global: Option<&Path>,
        local: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        // Layer 1: Global config (~/.elga/config.toml)
        if let Some(global_path) = global {
            if global_path.exists() {
                config.merge(Self::load_file(global_path)?);
            }
        }

        // Layer 2: Project-local config (.elga/config.toml)
        if local.exists() {
            config.merge(Self::load_file(local)?);
        }

        // Layer 3: Environment variable overrides
        config.apply_env_overrides(env);

        Ok(config)
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
    }

    /// Get API URL override for a provider
    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    /// Get model override for a provider
    pub fn model(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.model.as_deref())
    }

    /// Check if a provider is enabled
    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    /// The environment variable an operator should set for a provider
    pub fn credential_env_var(provider_name: &str) -> Option<&'static str> {
        CREDENTIAL_VARS
            .iter()
            .find(|(name, _)| *name == provider_name)
            .map(|(_, var)| *var)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.generation.output_dir)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".elga").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ElgaConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let config: ElgaConfigFile = toml::from_str(&content).map_err(|e| {
            ElgaError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    fn merge(&mut self, overlay: ElgaConfigFile) {
        for (name, provider) in overlay.providers {
            let entry = self.providers.entry(name).or_default();
            if provider.api_key.is_some() {
                entry.api_key = provider.api_key;
            }
            if provider.api_url.is_some() {
                entry.api_url = provider.api_url;
            }
            if provider.model.is_some() {
                entry.model = provider.model;
            }
            entry.enabled = provider.enabled;
        }

        // A [generation] table replaces the lower layer's wholesale; unset
        // fields take their defaults
        if let Some(generation) = overlay.generation {
            self.generation = generation;
        }
    }

    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        for (name, conventional) in CREDENTIAL_VARS {
            let prefixed = format!("ELGA_{}_API_KEY", name.to_uppercase());
            let key = [prefixed.as_str(), conventional]
                .into_iter()
                .filter_map(&env)
                .find(|value| !value.trim().is_empty());
            if let Some(key) = key {
                let entry = self.providers.entry(name.to_string()).or_default();
                entry.api_key = Some(key);
            }
        }

        if let Some(dir) = env("ELGA_OUTPUT_DIR").filter(|d| !d.trim().is_empty()) {
            self.generation.output_dir = dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("elga_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(path: &Path, content: &str) {
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_layers_from_files() {
        let dir = temp_dir();
        let global = dir.join("global.toml");
        let local = dir.join("local.toml");
        write_file(
            &global,
            r#"
[providers.openai]
api_key = "global-key"
model = "gpt-image-1"

[providers.imagen]
api_key = "g-key"
enabled = false
"#,
        );
        write_file(
            &local,
            r#"
[providers.openai]
api_key = "local-key"

[generation]
default_provider = "imagen"
collection = "watercolor"
delay_ms = 2500
"#,
        );

        let config = ElgaConfig::load_layers(Some(global.as_path()), &local, no_env).unwrap();
        assert_eq!(config.api_key("openai"), Some("local-key"));
        assert_eq!(config.model("openai"), Some("gpt-image-1"));
        assert!(!config.is_enabled("imagen"));
        assert_eq!(config.generation.default_provider, "imagen");
        assert_eq!(config.generation.collection, "watercolor");
        assert_eq!(config.generation.delay_ms, Some(2500));
        assert_eq!(config.generation.output_dir, DEFAULT_OUTPUT_DIR);
        assert!(config.generation.skip_existing);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = temp_dir();
        let config =
            ElgaConfig::load_layers(Some(dir.join("nope.toml").as_path()), &dir.join("none.toml"), no_env)
                .unwrap();
        assert_eq!(config.generation.default_provider, "openai");
        assert_eq!(config.generation.collection, "photo");
        assert_eq!(config.api_key("openai"), None);
        assert!(config.is_enabled("openai"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_var_override() {
        let dir = temp_dir();
        let local = dir.join("config.toml");
        write_file(&local, "[providers.imagen]\napi_key = \"file-key\"\n");

        let env = env_from(&[("GEMINI_API_KEY", "env-key"), ("OPENAI_API_KEY", "sk-test")]);
        let config = ElgaConfig::load_layers(None, &local, env).unwrap();
        assert_eq!(config.api_key("imagen"), Some("env-key"));
        assert_eq!(config.api_key("openai"), Some("sk-test"));
        assert!(config.is_enabled("openai"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_prefixed_env_var_wins_and_empty_is_unset() {
        let dir = temp_dir();
        let env = env_from(&[
            ("ELGA_OPENAI_API_KEY", "prefixed"),
            ("OPENAI_API_KEY", "plain"),
            ("GEMINI_API_KEY", "   "),
            ("ELGA_OUTPUT_DIR", "out/images"),
        ]);
        let config = ElgaConfig::load_layers(None, &dir.join("none.toml"), env).unwrap();
        assert_eq!(config.api_key("openai"), Some("prefixed"));
        assert_eq!(config.api_key("imagen"), None);
        assert_eq!(config.output_dir(), PathBuf::from("out/images"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_blank_file_key_counts_as_missing() {
        let dir = temp_dir();
        let local = dir.join("config.toml");
        write_file(&local, "[providers.openai]\napi_key = \"\"\n");
        let config = ElgaConfig::load_layers(None, &local, no_env).unwrap();
        assert_eq!(config.api_key("openai"), None);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = temp_dir();
        let local = dir.join("config.toml");
        write_file(&local, "[providers.openai\n");
        let err = ElgaConfig::load_layers(None, &local, no_env).unwrap_err();
        assert!(matches!(err, ElgaError::ConfigError(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_credential_env_var_names() {
        assert_eq!(ElgaConfig::credential_env_var("openai"), Some("OPENAI_API_KEY"));
        assert_eq!(ElgaConfig::credential_env_var("imagen"), Some("GEMINI_API_KEY"));
        assert_eq!(ElgaConfig::credential_env_var("mock"), None);
    }
}
