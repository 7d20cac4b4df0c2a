//! Provider listing

use anyhow::Result;
use elga_asset_gen::providers::{available_providers, create_provider};
use elga_asset_gen::ElgaConfig;
use elga_core::ElgaError;

pub fn run() -> Result<()> {
    let config = ElgaConfig::load()?;

    println!("{} provider(s):\n", available_providers().len());
    for name in available_providers() {
        let status = match create_provider(name, &config) {
            Ok(provider) => provider.health_check()?.to_string(),
            Err(ElgaError::MissingCredential { env_var, .. }) => {
                format!("no API key (set {})", env_var)
            }
            Err(e) => e.to_string(),
        };
        let default = if name == config.generation.default_provider {
            "  (default)"
        } else {
            ""
        };
        println!("  {:<8} {}{}", name, status, default);
    }
    Ok(())
}
