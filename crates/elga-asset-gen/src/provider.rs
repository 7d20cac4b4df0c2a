//! Generation provider trait and request/result types

use base64::Engine;
use elga_core::{ElgaError, Result};
use std::fmt;

use crate::job::{GenerationJob, OutputShape};
use crate::style::StyleGuide;

/// A request for exactly one image
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Job name, for error messages and provider-side bookkeeping
    pub name: String,
    /// The final prompt sent to the provider
    pub prompt: String,
    pub shape: OutputShape,
}

/// The image a provider hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// A URL to download the image from
    Url(String),
    /// Base64-encoded image bytes
    Inline(String),
}

impl ImagePayload {
    /// Decode an inline payload. Accepts a bare base64 string or a
    /// `data:image/...;base64,` URL.
    pub fn decode_inline(data: &str) -> Result<Vec<u8>> {
        let encoded = match data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => data,
        };
        let cleaned: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| ElgaError::DecodeError(e.to_string()))
    }
}

/// Status returned by a provider health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Available,
    Unavailable(String),
    NoApiKey,
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Available => write!(f, "available"),
            ProviderStatus::Unavailable(reason) => write!(f, "unavailable ({})", reason),
            ProviderStatus::NoApiKey => write!(f, "no API key"),
        }
    }
}

/// Trait implemented by each image provider (OpenAI, Imagen, Mock)
pub trait GenerationProvider: Send {
    /// Provider name (e.g. "openai", "imagen", "mock")
    fn name(&self) -> &str;

    /// Check the provider can be called (credential present)
    fn health_check(&self) -> Result<ProviderStatus>;

    /// Request one image. Blocks until the provider answers.
    fn generate(&self, request: &GenerateRequest) -> Result<ImagePayload>;

    /// Build the final prompt for a job
    fn build_prompt(&self, job: &GenerationJob, style: Option<&StyleGuide>) -> String {
        match style {
            Some(s) => s.enrich_prompt(job),
            None => job.prompt.trim().to_string(),
        }
    }

    /// Build the full request for a job
    fn request_for(&self, job: &GenerationJob, style: Option<&StyleGuide>) -> GenerateRequest {
        GenerateRequest {
            name: job.name.clone(),
            prompt: self.build_prompt(job, style),
            shape: job.shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_inline_plain_and_data_url() {
        assert_eq!(ImagePayload::decode_inline("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            ImagePayload::decode_inline("data:image/png;base64,aGVs\nbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_inline_rejects_garbage() {
        let err = ImagePayload::decode_inline("not base64!!").unwrap_err();
        assert!(matches!(err, ElgaError::DecodeError(_)));
    }
}
