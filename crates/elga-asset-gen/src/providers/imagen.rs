//! Imagen provider (Gemini API)
//!
//! Aspect-ratio based requests to the `:predict` endpoint. Images always
//! come back inline as base64.

use crate::config::ElgaConfig;
use crate::http;
use crate::provider::*;
use elga_core::{ElgaError, Result};

const DEFAULT_IMAGEN_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_IMAGEN_MODEL: &str = "imagen-4.0-ultra-generate-001";

/// Imagen provider for watercolor-style collections
pub struct ImagenProvider {
    api_key: String,
    api_url: String,
    model: String,
}

impl ImagenProvider {
    /// Create a new ImagenProvider from config
    pub fn from_config(config: &ElgaConfig) -> Result<Self> {
        let api_key = config
            .api_key("imagen")
            .ok_or_else(|| super::missing_credential("imagen"))?
            .to_string();

        let api_url = config
            .api_url("imagen")
            .unwrap_or(DEFAULT_IMAGEN_URL)
            .trim_end_matches('/')
            .to_string();

        let model = config
            .model("imagen")
            .unwrap_or(DEFAULT_IMAGEN_MODEL)
            .to_string();

        Ok(Self {
            api_key,
            api_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:predict", self.api_url, self.model)
    }

    fn payload(&self, request: &GenerateRequest) -> serde_json::Value {
        serde_json::json!({
            "instances": [{ "prompt": request.prompt }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": request.shape.aspect_ratio().as_str(),
                "outputMimeType": "image/png"
            }
        })
    }
}

impl GenerationProvider for ImagenProvider {
    fn name(&self) -> &str {
        "imagen"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        if self.api_key.is_empty() {
            return Ok(ProviderStatus::NoApiKey);
        }
        Ok(ProviderStatus::Available)
    }

    fn generate(&self, request: &GenerateRequest) -> Result<ImagePayload> {
        let headers = [("x-goog-api-key", self.api_key.clone())];
        let response =
            http::post_json_with_retry(&self.endpoint(), &headers, &self.payload(request), "Imagen")?;
        parse_imagen_response(&response, &request.name)
    }
}

/// Extract the first image from a `:predict` response
pub fn parse_imagen_response(response: &serde_json::Value, job_name: &str) -> Result<ImagePayload> {
    if let Some(message) = response
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(ElgaError::ProviderError(format!("Imagen: {}", message)));
    }

    let first = response
        .get("predictions")
        .and_then(|p| p.as_array())
        .and_then(|arr| arr.first());

    if let Some(reason) = first
        .and_then(|p| p.get("raiFilteredReason"))
        .and_then(|r| r.as_str())
    {
        return Err(ElgaError::ProviderError(format!(
            "Imagen filtered '{}': {}",
            job_name, reason
        )));
    }

    first
        .and_then(|p| p.get("bytesBase64Encoded"))
        .and_then(|b| b.as_str())
        .filter(|b| !b.is_empty())
        .map(|b| ImagePayload::Inline(b.to_string()))
        .ok_or_else(|| ElgaError::EmptyPayload(job_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::job::{AspectRatio, OutputShape};

    fn provider() -> ImagenProvider {
        let mut config = ElgaConfig::default();
        config.providers.insert(
            "imagen".to_string(),
            ProviderConfig {
                api_key: Some("g-test".to_string()),
                api_url: Some("https://proxy.example.com/models/".to_string()),
                ..Default::default()
            },
        );
        ImagenProvider::from_config(&config).unwrap()
    }

    #[test]
    fn test_parse_inline_prediction() {
        let json = serde_json::json!({
            "predictions": [{ "mimeType": "image/png", "bytesBase64Encoded": "aGVsbG8=" }]
        });
        assert_eq!(
            parse_imagen_response(&json, "temple-offerings").unwrap(),
            ImagePayload::Inline("aGVsbG8=".to_string())
        );
    }

    #[test]
    fn test_parse_no_predictions() {
        let json = serde_json::json!({});
        let err = parse_imagen_response(&json, "temple-offerings").unwrap_err();
        assert!(matches!(err, ElgaError::EmptyPayload(_)));
    }

    #[test]
    fn test_parse_filtered_prediction() {
        let json = serde_json::json!({
            "predictions": [{ "raiFilteredReason": "blocked by safety filter" }]
        });
        let err = parse_imagen_response(&json, "children-nature").unwrap_err();
        assert!(err.to_string().contains("children-nature"));
        assert!(err.to_string().contains("safety filter"));
    }

    #[test]
    fn test_endpoint_and_payload() {
        let provider = provider();
        assert_eq!(
            provider.endpoint(),
            "https://proxy.example.com/models/imagen-4.0-ultra-generate-001:predict"
        );

        let request = GenerateRequest {
            name: "banjar-meeting".to_string(),
            prompt: "a pavilion".to_string(),
            shape: OutputShape::parse_size("1536x1024").unwrap(),
        };
        let payload = provider.payload(&request);
        assert_eq!(payload["parameters"]["sampleCount"], 1);
        assert_eq!(payload["parameters"]["aspectRatio"], "4:3");
        assert_eq!(payload["instances"][0]["prompt"], "a pavilion");
        assert_eq!(payload["parameters"]["outputMimeType"], "image/png");

        let square = GenerateRequest {
            shape: OutputShape::Aspect(AspectRatio::Square),
            ..request
        };
        assert_eq!(provider.payload(&square)["parameters"]["aspectRatio"], "1:1");
    }
}
