//! The seam between the cache façade and the remote generative provider.
//!
//! The façade depends on the [`GenerationClient`] trait rather than a
//! concrete provider, so tests can substitute a deterministic double and
//! another provider can be slotted in behind the same surface.

use crate::asset::AudioClip;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a remote generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed provider response: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API key not configured")]
    NoApiKey,
}

impl From<gemini::Error> for GenerationError {
    fn from(err: gemini::Error) -> Self {
        match err {
            gemini::Error::NoApiKey => Self::NoApiKey,
            gemini::Error::Network(message) => Self::Network(message),
            gemini::Error::Api { status, message } => Self::Provider { status, message },
            gemini::Error::Parse(message) => Self::Parse(message),
            gemini::Error::Config(message) => Self::Config(message),
        }
    }
}

/// A remote generative-content provider.
///
/// One method per modality; prompts are built by the caller. No retries,
/// no timeouts beyond the underlying client's own.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate an image, returned as a data URI.
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Synthesize speech for the given text.
    async fn generate_speech(&self, text: &str) -> Result<AudioClip, GenerationError>;

    /// Generate plain text.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Generate JSON constrained by a response schema.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError>;
}

/// Production [`GenerationClient`] backed by the Gemini API.
pub struct GeminiGenerator {
    client: gemini::Gemini,
}

impl GeminiGenerator {
    pub fn new(client: gemini::Gemini) -> Self {
        Self { client }
    }

    /// Build a generator from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, GenerationError> {
        Ok(Self::new(gemini::Gemini::from_env()?))
    }
}

#[async_trait]
impl GenerationClient for GeminiGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        let inline = self.client.generate_image(prompt).await?;
        Ok(format!(
            "data:{};base64,{}",
            inline.mime_type, inline.data
        ))
    }

    async fn generate_speech(&self, text: &str) -> Result<AudioClip, GenerationError> {
        let inline = self.client.generate_speech(text).await?;
        AudioClip::from_pcm16_base64(&inline.data, gemini::TTS_SAMPLE_RATE, 1)
            .map_err(|e| GenerationError::Parse(e.to_string()))
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(self.client.generate_text(prompt).await?)
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        Ok(self.client.generate_json(prompt, schema).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: GenerationError = gemini::Error::Api {
            status: 429,
            message: "RESOURCE_EXHAUSTED".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            GenerationError::Provider { status: 429, .. }
        ));

        let err: GenerationError = gemini::Error::NoApiKey.into();
        assert!(matches!(err, GenerationError::NoApiKey));
    }
}
