//! Testing utilities.
//!
//! `MockClient` is a deterministic [`GenerationClient`] for tests: canned
//! outputs, per-modality call counters, and a scripted failure queue.
//! `CacheHarness` bundles it with an in-memory persistent tier and an
//! [`AssetCache`] ready to exercise.

use crate::asset::AudioClip;
use crate::cache::AssetCache;
use crate::provider::{GenerationClient, GenerationError};
use crate::store::MemoryKv;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A scripted generation client that never touches the network.
///
/// Successful responses are derived deterministically from the prompt, so
/// distinct requests yield distinct payloads. Failures are queued with
/// [`MockClient::push_failure`] and consumed in order by the next calls,
/// whatever their modality.
#[derive(Default)]
pub struct MockClient {
    image_calls: AtomicUsize,
    audio_calls: AtomicUsize,
    text_calls: AtomicUsize,
    structured_calls: AtomicUsize,
    failures: Mutex<VecDeque<GenerationError>>,
    structured_response: Mutex<Option<serde_json::Value>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next generation call.
    pub fn push_failure(&self, err: GenerationError) {
        self.failures.lock().push_back(err);
    }

    /// A provider error carrying quota vocabulary, as the real provider
    /// words it.
    pub fn quota_failure() -> GenerationError {
        GenerationError::Provider {
            status: 429,
            message: "RESOURCE_EXHAUSTED: quota exceeded for requests per minute".to_string(),
        }
    }

    /// A generic provider failure.
    pub fn provider_failure() -> GenerationError {
        GenerationError::Provider {
            status: 500,
            message: "internal error".to_string(),
        }
    }

    /// Override the next structured responses (replayed for every call
    /// until changed).
    pub fn set_structured_response(&self, value: serde_json::Value) {
        *self.structured_response.lock() = Some(value);
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    pub fn audio_calls(&self) -> usize {
        self.audio_calls.load(Ordering::SeqCst)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.image_calls() + self.audio_calls() + self.text_calls() + self.structured_calls()
    }

    fn next_failure(&self) -> Option<GenerationError> {
        self.failures.lock().pop_front()
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.next_failure() {
            return Err(err);
        }
        Ok(format!("data:image/png;base64,{}", BASE64.encode(prompt)))
    }

    async fn generate_speech(&self, text: &str) -> Result<AudioClip, GenerationError> {
        self.audio_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.next_failure() {
            return Err(err);
        }
        // A short clip whose length depends on the text, one frame per byte.
        Ok(AudioClip {
            sample_rate: 24_000,
            channels: 1,
            samples: vec![0.1; text.len().max(1)],
        })
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.next_failure() {
            return Err(err);
        }
        Ok("A beautiful, whimsical, and colorful illustration of a happy bee in a garden."
            .to_string())
    }

    async fn generate_structured(
        &self,
        _prompt: &str,
        _schema: serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.next_failure() {
            return Err(err);
        }
        if let Some(value) = self.structured_response.lock().clone() {
            return Ok(value);
        }
        Ok(serde_json::json!([
            { "question": "Who is the story about?", "answer": "A happy bee." },
            { "question": "Where does the bee live?", "answer": "In a garden." },
            { "question": "How does the story end?", "answer": "Everyone is friends." }
        ]))
    }
}

/// An [`AssetCache`] wired to a [`MockClient`] and an in-memory
/// persistent tier, with both collaborators kept accessible.
pub struct CacheHarness {
    pub cache: AssetCache,
    pub client: Arc<MockClient>,
    pub persistent: Arc<MemoryKv>,
}

impl CacheHarness {
    pub fn new() -> Self {
        Self::build(MemoryKv::new())
    }

    /// Harness whose persistent tier rejects writes past `bytes`.
    pub fn with_store_capacity(bytes: usize) -> Self {
        Self::build(MemoryKv::with_capacity(bytes))
    }

    fn build(persistent: MemoryKv) -> Self {
        let persistent = Arc::new(persistent);
        let client = Arc::new(MockClient::new());
        let cache = AssetCache::new(persistent.clone(), client.clone());
        Self {
            cache,
            client,
            persistent,
        }
    }

    /// Total remote calls made so far, across all modalities.
    pub fn remote_calls(&self) -> usize {
        self.client.total_calls()
    }
}

impl Default for CacheHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let client = MockClient::new();
        client.generate_image("a").await.unwrap();
        client.generate_image("b").await.unwrap();
        client.generate_speech("c").await.unwrap();
        assert_eq!(client.image_calls(), 2);
        assert_eq!(client.audio_calls(), 1);
        assert_eq!(client.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_failure_queue() {
        let client = MockClient::new();
        client.push_failure(MockClient::provider_failure());

        assert!(client.generate_image("a").await.is_err());
        // The queue is consumed; the next call succeeds.
        assert!(client.generate_image("a").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_images_depend_on_prompt() {
        let client = MockClient::new();
        let a = client.generate_image("a").await.unwrap();
        let b = client.generate_image("b").await.unwrap();
        assert_ne!(a, b);
    }
}
