//! Mock provider for testing and dry runs
//!
//! Renders a small solid-colour PNG per job without any network calls.
//! Tests can make it fail or return nothing for chosen job names, hand out
//! URLs instead of inline data, and inspect which jobs it was asked for.

use crate::provider::*;
use base64::Engine;
use elga_core::{ElgaError, Result};
use std::collections::HashSet;
use std::sync::Mutex;

/// Placeholders are rendered at this fraction of the requested size
const PLACEHOLDER_SCALE: u32 = 16;

/// A provider that generates placeholder images locally
#[derive(Default)]
pub struct MockProvider {
    fail_on: HashSet<String>,
    empty_on: HashSet<String>,
    url_base: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a provider error for these job names
    pub fn failing_on(mut self, names: &[&str]) -> Self {
        self.fail_on.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Return an empty payload for these job names
    pub fn empty_for(mut self, names: &[&str]) -> Self {
        self.empty_on.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Answer with `{base}/{name}.png` URLs instead of inline images
    pub fn serving_urls(mut self, base: &str) -> Self {
        self.url_base = Some(base.trim_end_matches('/').to_string());
        self
    }

    /// Job names requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn record_call(&self, name: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name.to_string());
        }
    }
}

impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn generate(&self, request: &GenerateRequest) -> Result<ImagePayload> {
        self.record_call(&request.name);

        if self.fail_on.contains(&request.name) {
            return Err(ElgaError::ProviderError(format!(
                "mock failure for '{}'",
                request.name
            )));
        }

        if self.empty_on.contains(&request.name) {
            return Ok(ImagePayload::Inline(String::new()));
        }

        if let Some(ref base) = self.url_base {
            return Ok(ImagePayload::Url(format!("{}/{}.png", base, request.name)));
        }

        let (width, height) = request.shape.dimensions();
        let png = placeholder_png(
            &request.name,
            (width / PLACEHOLDER_SCALE).max(1),
            (height / PLACEHOLDER_SCALE).max(1),
        )?;
        Ok(ImagePayload::Inline(
            base64::engine::general_purpose::STANDARD.encode(png),
        ))
    }
}

/// Encode a solid-colour PNG whose colour is derived from `name`
pub fn placeholder_png(name: &str, width: u32, height: u32) -> Result<Vec<u8>> {
    let hash_val = name
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let r = ((hash_val >> 16) & 0xFF) as u8;
    let g = ((hash_val >> 8) & 0xFF) as u8;
    let b = (hash_val & 0xFF) as u8;

    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([r, g, b, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| ElgaError::ProviderError(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}
