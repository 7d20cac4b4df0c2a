//! Batch image generation command

use anyhow::Result;
use elga_asset_gen::config::DEFAULT_DELAY_MS;
use elga_asset_gen::providers::create_provider;
use elga_asset_gen::{
    run_batch, BatchOptions, BatchReport, ElgaConfig, GenerationProvider, HttpFetcher, JobList,
    JobOutcome, StyleGuide,
};
use elga_core::ElgaError;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Default)]
pub struct GenerateArgs {
    pub collection: Option<String>,
    pub jobs: Option<PathBuf>,
    pub style: Option<PathBuf>,
    pub provider: Option<String>,
    pub output: Option<PathBuf>,
    pub delay_ms: Option<u64>,
    pub overwrite: bool,
    pub only: Vec<String>,
    pub config: Option<PathBuf>,
}

/// Everything a batch needs, resolved before any file is touched
struct Plan {
    list: JobList,
    provider: Box<dyn GenerationProvider>,
    options: BatchOptions,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let config = match args.config {
        Some(ref path) => ElgaConfig::load_from_file(path),
        None => ElgaConfig::load(),
    }
    .map_err(explain)?;

    let Plan {
        list,
        provider,
        options,
    } = plan(&args, &config)?;

    println!(
        "Generating '{}' ({} job(s)) via {} into {}",
        list.collection,
        list.len(),
        provider.name(),
        options.output_dir.display()
    );
    if let Some(ref s) = list.style {
        println!("  Style: {} (prompts enriched with palette + constraints)", s.name);
    }
    println!("  Delay between calls: {}ms\n", options.delay.as_millis());

    let report =
        run_batch(&list, provider.as_ref(), &HttpFetcher::new(), &options).map_err(explain)?;
    print_report(&report);
    Ok(())
}

/// Resolve the job list, provider and batch options from flags and config
fn plan(args: &GenerateArgs, config: &ElgaConfig) -> Result<Plan> {
    let mut list = match (&args.jobs, &args.collection) {
        (Some(path), _) => JobList::load(path),
        (None, Some(name)) => JobList::builtin(name),
        (None, None) => JobList::builtin(&config.generation.collection),
    }
    .map_err(explain)?;

    if let Some(ref path) = args.style {
        list.style = Some(StyleGuide::load(path).map_err(explain)?);
    }

    if !args.only.is_empty() {
        list = list.select(&args.only).map_err(explain)?;
    }

    let provider_name = pick_provider(args.provider.as_deref(), &list, config);
    tracing::debug!(provider = provider_name, collection = %list.collection, "resolved provider");
    let provider = create_provider(provider_name, config).map_err(explain)?;

    let options = BatchOptions {
        output_dir: args.output.clone().unwrap_or_else(|| config.output_dir()),
        skip_existing: config.generation.skip_existing && !args.overwrite,
        delay: pick_delay(args.delay_ms, &list, config),
    };

    Ok(Plan {
        list,
        provider,
        options,
    })
}

/// Attach a hint to errors that the operator fixes in config or environment
fn explain(err: ElgaError) -> anyhow::Error {
    if err.is_configuration() {
        anyhow::Error::new(err).context(
            "Nothing was generated. Check ~/.elga/config.toml, .elga/config.toml and the provider's API key variable",
        )
    } else {
        err.into()
    }
}

/// Command line, then the collection's own provider, then the config default
fn pick_provider<'a>(cli: Option<&'a str>, list: &'a JobList, config: &'a ElgaConfig) -> &'a str {
    cli.or(list.provider.as_deref())
        .unwrap_or(&config.generation.default_provider)
}

/// Command line, then config, then the collection, then the built-in default
fn pick_delay(cli: Option<u64>, list: &JobList, config: &ElgaConfig) -> Duration {
    let ms = cli
        .or(config.generation.delay_ms)
        .or(list.delay_ms)
        .unwrap_or(DEFAULT_DELAY_MS);
    Duration::from_millis(ms)
}

fn print_report(report: &BatchReport) {
    for job in &report.jobs {
        match &job.outcome {
            JobOutcome::Generated { path, bytes } => {
                println!("  {}  -> Generated {} ({} bytes)", job.name, path.display(), bytes)
            }
            JobOutcome::Skipped { path } => {
                println!("  {}  -> Skipped, {} exists", job.name, path.display())
            }
            JobOutcome::Failed { error } => println!("  {}  -> FAILED: {}", job.name, error),
        }
    }

    println!(
        "\nDone in {:.1}s: {} job(s), {} generated, {} skipped, {} failed",
        report.elapsed.as_secs_f64(),
        report.total(),
        report.generated(),
        report.skipped(),
        report.failed()
    );
    if report.failed() > 0 {
        println!("Re-run the same command to retry failed jobs.");
    }
}
