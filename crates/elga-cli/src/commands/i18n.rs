//! Message bundle commands

use anyhow::Result;
use clap::Subcommand;
use elga_i18n::{resolve_locale, switch_locale, Catalog, Locale, Translator};

#[derive(Subcommand)]
pub enum I18nCommands {
    /// Report keys missing from, or shaped differently in, non-default locales
    Check {
        /// Exit with an error when any gap is found
        #[arg(long)]
        strict: bool,
    },

    /// Look up a message
    Get {
        /// Locale code (unsupported codes fall back to the default)
        locale: String,

        /// Dotted key path, e.g. home.hero.title
        key: String,

        /// Resolve the key relative to this namespace
        #[arg(long)]
        namespace: Option<String>,

        /// Print the stored value as JSON instead of the display string
        #[arg(long)]
        raw: bool,
    },

    /// Print the equivalent of a site path in another locale
    Route {
        /// Current site path, e.g. /id/approach?tab=2
        path: String,

        /// Target locale code
        locale: String,
    },
}

pub fn run(cmd: I18nCommands) -> Result<()> {
    match cmd {
        I18nCommands::Check { strict } => run_check(strict),
        I18nCommands::Get {
            locale,
            key,
            namespace,
            raw,
        } => run_get(&locale, &key, namespace.as_deref(), raw),
        I18nCommands::Route { path, locale } => run_route(&path, &locale),
    }
}

fn run_check(strict: bool) -> Result<()> {
    let catalog = Catalog::embedded()?;
    let gaps = catalog.coverage_gaps();

    let reference = catalog.bundle(Locale::DEFAULT).leaf_paths().len();
    println!(
        "Checked {} locale(s) against '{}' ({} keys)",
        Locale::ALL.len(),
        Locale::DEFAULT,
        reference
    );

    if gaps.is_empty() {
        println!("No gaps found.");
        return Ok(());
    }

    println!("{} gap(s):\n", gaps.len());
    for gap in &gaps {
        println!("  {}", gap);
    }

    if strict {
        anyhow::bail!("{} message bundle gap(s)", gaps.len());
    }
    Ok(())
}

fn run_get(locale: &str, key: &str, namespace: Option<&str>, raw: bool) -> Result<()> {
    let catalog = Catalog::embedded()?;
    let locale = resolve_locale(Some(locale));
    let mut translator = Translator::new(&catalog, locale);
    if let Some(ns) = namespace {
        translator = translator.scoped(ns);
    }

    if raw {
        match translator.raw(key) {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value.to_json())?),
            None => anyhow::bail!("No message at '{}' for locale '{}'", key, locale),
        }
    } else {
        println!("{}", translator.text(key));
    }
    Ok(())
}

fn run_route(path: &str, locale: &str) -> Result<()> {
    let target: Locale = locale.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    println!("{}", switch_locale(path, target));
    Ok(())
}
