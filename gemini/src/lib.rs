//! Minimal Google Gemini API client.
//!
//! This crate provides a focused client for the `generateContent` API with:
//! - Plain-text and schema-constrained JSON generation
//! - Image generation (inline base64 payloads)
//! - Speech synthesis (24 kHz mono 16-bit PCM, base64)

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_VOICE: &str = "Kore";

/// Sample rate of speech payloads returned by the TTS models.
pub const TTS_SAMPLE_RATE: u32 = 24_000;

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    text_model: String,
    image_model: String,
    tts_model: String,
    voice: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.into(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
        }
    }

    /// Create a Gemini client from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| Error::NoApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Set the model used for text generation.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Set the model used for image generation.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Set the model used for speech synthesis.
    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    /// Set the prebuilt voice used for speech synthesis.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Generate plain text from a prompt.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, Error> {
        let request = ApiRequest::from_prompt(prompt);
        let response = self.generate(&self.text_model, &request).await?;

        let text = response.text();
        if text.is_empty() {
            return Err(Error::Parse("no text in response".to_string()));
        }
        Ok(text)
    }

    /// Generate JSON constrained by a response schema.
    pub async fn generate_json(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        let mut request = ApiRequest::from_prompt(prompt);
        request.generation_config = Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            ..GenerationConfig::default()
        });

        let response = self.generate(&self.text_model, &request).await?;
        let text = response.text();
        if text.is_empty() {
            return Err(Error::Parse("no JSON in response".to_string()));
        }

        serde_json::from_str(&text).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Generate an image and return its inline base64 payload.
    pub async fn generate_image(&self, prompt: &str) -> Result<InlineData, Error> {
        let mut request = ApiRequest::from_prompt(prompt);
        request.generation_config = Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            ..GenerationConfig::default()
        });

        let response = self.generate(&self.image_model, &request).await?;
        response
            .inline_data()
            .ok_or_else(|| Error::Parse("no image data in response".to_string()))
    }

    /// Synthesize speech for the given text.
    ///
    /// The returned payload is base64-encoded 16-bit little-endian PCM at
    /// [`TTS_SAMPLE_RATE`], mono.
    pub async fn generate_speech(&self, text: &str) -> Result<InlineData, Error> {
        let mut request = ApiRequest::from_prompt(text);
        request.generation_config = Some(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: self.voice.clone(),
                    },
                },
            }),
            ..GenerationConfig::default()
        });

        let response = self.generate(&self.tts_model, &request).await?;
        response
            .inline_data()
            .ok_or_else(|| Error::Parse("no audio data in response".to_string()))
    }

    async fn generate(&self, model: &str, request: &ApiRequest) -> Result<ApiResponse, Error> {
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{API_BASE}/models/{model}:generateContent"))
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

// ============================================================================
// Public types
// ============================================================================

/// An inline binary payload returned by the API.
#[derive(Debug, Clone)]
pub struct InlineData {
    /// MIME type of the payload (e.g. `image/png`).
    pub mime_type: String,

    /// Base64-encoded payload bytes.
    pub data: String,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl ApiRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![ApiContent {
                parts: vec![ApiRequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiContent {
    parts: Vec<ApiRequestPart>,
}

#[derive(Debug, Serialize)]
struct ApiRequestPart {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

impl ApiResponse {
    /// Concatenate all text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Find the first inline payload in the first candidate.
    fn inline_data(&self) -> Option<InlineData> {
        self.candidates.first().and_then(|c| {
            c.content.parts.iter().find_map(|p| {
                p.inline_data.as_ref().map(|d| InlineData {
                    mime_type: d.mime_type.clone(),
                    data: d.data.clone(),
                })
            })
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    content: ApiResponseContent,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<ApiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiInlineData {
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Gemini::new("test-key");
        assert_eq!(client.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(client.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(client.tts_model, DEFAULT_TTS_MODEL);
        assert_eq!(client.voice, DEFAULT_VOICE);
    }

    #[test]
    fn test_client_builders() {
        let client = Gemini::new("test-key")
            .with_text_model("gemini-2.5-pro")
            .with_voice("Puck");
        assert_eq!(client.text_model, "gemini-2.5-pro");
        assert_eq!(client.voice, "Puck");
    }

    #[test]
    fn test_request_serialization() {
        let request = ApiRequest::from_prompt("hello");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        // Absent config must not serialize at all.
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn test_speech_config_serialization() {
        let mut request = ApiRequest::from_prompt("bee");
        request.generation_config = Some(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: "Kore".to_string(),
                    },
                },
            }),
            ..GenerationConfig::default()
        });

        let value = serde_json::to_value(&request).unwrap();
        let config = &value["generationConfig"];
        assert_eq!(config["responseModalities"][0], "AUDIO");
        assert_eq!(
            config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "A happy "}, {"text": "puppy."}]
                }
            }]
        }"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "A happy puppy.");
        assert!(response.inline_data().is_none());
    }

    #[test]
    fn test_response_inline_data_extraction() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "aGk="}}
                    ]
                }
            }]
        }"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();
        let inline = response.inline_data().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "aGk=");
    }

    #[test]
    fn test_empty_response() {
        let response: ApiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");
        assert!(response.inline_data().is_none());
    }
}
