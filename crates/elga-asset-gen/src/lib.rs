//! Elga Asset Gen - batch image generation for the website
//!
//! Drives a fixed, ordered list of generation jobs against one image
//! provider (OpenAI, Imagen, or a local mock), writing one PNG per job.
//! Jobs whose output file already exists are skipped, so an interrupted
//! run resumes where it stopped; a failing job is logged and the batch
//! moves on.

pub mod batch;
pub mod config;
pub mod fetch;
mod http;
pub mod job;
pub mod provider;
pub mod providers;
pub mod style;

pub use batch::{run_batch, BatchOptions, BatchReport, JobOutcome, JobReport};
pub use config::ElgaConfig;
pub use fetch::{Fetcher, HttpFetcher};
pub use job::{AspectRatio, GenerationJob, JobList, OutputShape};
pub use provider::{GenerateRequest, GenerationProvider, ImagePayload, ProviderStatus};
pub use style::StyleGuide;
