//! Batch generation
//!
//! Runs a job list against one provider, one job at a time and in order.
//! Existing outputs are skipped, failures are recorded per job, and a fixed
//! delay separates consecutive provider calls.

use crate::fetch::Fetcher;
use crate::job::{GenerationJob, JobList};
use crate::provider::{GenerationProvider, ImagePayload, ProviderStatus};
use elga_core::{ElgaError, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    /// Leave jobs whose output file already exists untouched
    pub skip_existing: bool,
    /// Pause before every provider call after the first
    pub delay: Duration,
}

impl BatchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            skip_existing: true,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.skip_existing = !overwrite;
        self
    }
}

/// What happened to a single job
#[derive(Debug)]
pub enum JobOutcome {
    Generated { path: PathBuf, bytes: u64 },
    Skipped { path: PathBuf },
    Failed { error: ElgaError },
}

#[derive(Debug)]
pub struct JobReport {
    pub name: String,
    pub outcome: JobOutcome,
}

/// Result of a batch run, one entry per job in list order
#[derive(Debug)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn generated(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Generated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Failed { .. }))
    }

    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    fn count(&self, pred: impl Fn(&JobOutcome) -> bool) -> usize {
        self.jobs.iter().filter(|j| pred(&j.outcome)).count()
    }
}

/// Run every job in `list` against `provider`.
///
/// Returns `Err` only when the batch cannot start: the provider has no
/// credential or the output directory cannot be created. Per-job failures
/// end up in the report and never stop the batch.
pub fn run_batch(
    list: &JobList,
    provider: &dyn GenerationProvider,
    fetcher: &dyn Fetcher,
    options: &BatchOptions,
) -> Result<BatchReport> {
    match provider.health_check()? {
        ProviderStatus::Available => {}
        ProviderStatus::NoApiKey => return Err(crate::providers::missing_credential(provider.name())),
        ProviderStatus::Unavailable(reason) => {
            return Err(ElgaError::ProviderError(format!(
                "{} is unavailable: {}",
                provider.name(),
                reason
            )))
        }
    }

    std::fs::create_dir_all(&options.output_dir)?;

    tracing::info!(
        collection = %list.collection,
        provider = provider.name(),
        jobs = list.len(),
        output = %options.output_dir.display(),
        "starting batch"
    );

    let started = Instant::now();
    let mut reports = Vec::with_capacity(list.len());
    let mut called_before = false;

    for job in &list.jobs {
        let path = job.output_path(&options.output_dir);

        if options.skip_existing && path.exists() {
            tracing::info!(job = %job.name, path = %path.display(), "skipping, already exists");
            reports.push(JobReport {
                name: job.name.clone(),
                outcome: JobOutcome::Skipped { path },
            });
            continue;
        }

        if called_before && !options.delay.is_zero() {
            std::thread::sleep(options.delay);
        }
        called_before = true;

        let outcome = match generate_one(job, list, provider, fetcher, &path) {
            Ok(bytes) => {
                tracing::info!(job = %job.name, path = %path.display(), bytes, "generated");
                JobOutcome::Generated { path, bytes }
            }
            Err(error) => {
                tracing::warn!(job = %job.name, error = %error, "generation failed");
                JobOutcome::Failed { error }
            }
        };
        reports.push(JobReport {
            name: job.name.clone(),
            outcome,
        });
    }

    let report = BatchReport {
        jobs: reports,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        generated = report.generated(),
        skipped = report.skipped(),
        failed = report.failed(),
        "batch finished"
    );
    Ok(report)
}

fn generate_one(
    job: &GenerationJob,
    list: &JobList,
    provider: &dyn GenerationProvider,
    fetcher: &dyn Fetcher,
    dest: &Path,
) -> Result<u64> {
    let request = provider.request_for(job, list.style.as_ref());
    tracing::debug!(job = %job.name, shape = %request.shape, "requesting image");
    let payload = provider.generate(&request)?;
    write_payload(&payload, &job.name, dest, fetcher)
}

/// Write a payload to `dest` through a sibling `.part` file, so `dest`
/// only ever appears complete.
fn write_payload(
    payload: &ImagePayload,
    job_name: &str,
    dest: &Path,
    fetcher: &dyn Fetcher,
) -> Result<u64> {
    let part = part_path(dest);

    let written = match payload {
        ImagePayload::Url(url) if url.trim().is_empty() => {
            Err(ElgaError::EmptyPayload(job_name.to_string()))
        }
        ImagePayload::Url(url) => fetcher.download(url, &part),
        ImagePayload::Inline(data) => ImagePayload::decode_inline(data).and_then(|bytes| {
            if bytes.is_empty() {
                return Err(ElgaError::EmptyPayload(job_name.to_string()));
            }
            std::fs::write(&part, &bytes)?;
            Ok(bytes.len() as u64)
        }),
    };

    match written {
        Ok(0) => {
            let _ = std::fs::remove_file(&part);
            Err(ElgaError::EmptyPayload(job_name.to_string()))
        }
        Ok(bytes) => match std::fs::rename(&part, dest) {
            Ok(()) => Ok(bytes),
            Err(e) => {
                let _ = std::fs::remove_file(&part);
                Err(e.into())
            }
        },
        Err(e) => {
            let _ = std::fs::remove_file(&part);
            Err(e)
        }
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
