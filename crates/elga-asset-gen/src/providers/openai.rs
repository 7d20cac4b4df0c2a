//! OpenAI image generation provider
//!
//! Size-based requests against the Images API. Responses carry either a
//! hosted URL or the image inline as `b64_json`, depending on the model.

use crate::config::ElgaConfig;
use crate::http;
use crate::provider::*;
use elga_core::{ElgaError, Result};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/images/generations";
const DEFAULT_OPENAI_MODEL: &str = "gpt-image-1";

/// OpenAI provider (gpt-image-1 by default)
pub struct OpenAiProvider {
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a new OpenAiProvider from config
    pub fn from_config(config: &ElgaConfig) -> Result<Self> {
        let api_key = config
            .api_key("openai")
            .ok_or_else(|| super::missing_credential("openai"))?
            .to_string();

        let api_url = config
            .api_url("openai")
            .unwrap_or(DEFAULT_OPENAI_URL)
            .to_string();

        let model = config
            .model("openai")
            .unwrap_or(DEFAULT_OPENAI_MODEL)
            .to_string();

        Ok(Self {
            api_key,
            api_url,
            model,
        })
    }

    fn payload(&self, request: &GenerateRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "prompt": request.prompt,
            "n": 1,
            "size": request.shape.size_string(),
            "quality": "high"
        })
    }
}

impl GenerationProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        if self.api_key.is_empty() {
            return Ok(ProviderStatus::NoApiKey);
        }
        Ok(ProviderStatus::Available)
    }

    fn generate(&self, request: &GenerateRequest) -> Result<ImagePayload> {
        let headers = [("Authorization", format!("Bearer {}", self.api_key))];
        let response =
            http::post_json_with_retry(&self.api_url, &headers, &self.payload(request), "OpenAI")?;
        parse_openai_response(&response, &request.name)
    }
}

/// Extract the first image from an Images API response
pub fn parse_openai_response(response: &serde_json::Value, job_name: &str) -> Result<ImagePayload> {
    if let Some(message) = response
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(ElgaError::ProviderError(format!("OpenAI: {}", message)));
    }

    let first = response
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|arr| arr.first());

    let url = first
        .and_then(|img| img.get("url"))
        .and_then(|u| u.as_str())
        .filter(|u| !u.is_empty());
    if let Some(url) = url {
        return Ok(ImagePayload::Url(url.to_string()));
    }

    first
        .and_then(|img| img.get("b64_json"))
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

    #[test]
    fn test_parse_url_response() {
        let json = serde_json::json!({
            "created": 1713833628,
            "data": [{ "url": "https://example.com/generated.png" }]
        });
        assert_eq!(
            parse_openai_response(&json, "hero").unwrap(),
            ImagePayload::Url("https://example.com/generated.png".to_string())
        );
    }

    #[test]
    fn test_parse_b64_response() {
        let json = serde_json::json!({ "data": [{ "b64_json": "aGVsbG8=" }] });
        assert_eq!(
            parse_openai_response(&json, "hero").unwrap(),
            ImagePayload::Inline("aGVsbG8=".to_string())
        );
    }

    #[test]
    fn test_parse_empty_response_is_empty_payload() {
        let json = serde_json::json!({ "data": [] });
        let err = parse_openai_response(&json, "hero-bali-coast").unwrap_err();
        assert!(matches!(err, ElgaError::EmptyPayload(ref name) if name == "hero-bali-coast"));

        let json = serde_json::json!({ "data": [{ "url": null, "b64_json": "" }] });
        assert!(matches!(
            parse_openai_response(&json, "x").unwrap_err(),
            ElgaError::EmptyPayload(_)
        ));
    }

    #[test]
    fn test_parse_error_response() {
        let json = serde_json::json!({
            "error": { "message": "Billing hard limit has been reached", "type": "billing" }
        });
        let err = parse_openai_response(&json, "x").unwrap_err();
        assert!(err.to_string().contains("Billing hard limit"));
    }

    #[test]
    fn test_payload_requests_one_image_at_size() {
        let mut config = ElgaConfig::default();
        config.providers.insert(
            "openai".to_string(),
            ProviderConfig {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
        );
        let provider = OpenAiProvider::from_config(&config).unwrap();
        let request = GenerateRequest {
            name: "hero".to_string(),
            prompt: "a coast".to_string(),
            shape: OutputShape::Aspect(AspectRatio::Landscape16x9),
        };

        let payload = provider.payload(&request);
        assert_eq!(payload["n"], 1);
        assert_eq!(payload["size"], "1536x1024");
        assert_eq!(payload["model"], "gpt-image-1");
        assert_eq!(provider.health_check().unwrap(), ProviderStatus::Available);
    }
}
