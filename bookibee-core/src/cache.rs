//! The get-or-generate façade over the two-tier store.
//!
//! Every operation has the same shape: derive the key, consult the store,
//! return a hit, otherwise call the provider with a style-specific prompt,
//! store the result in both tiers and return it. Failures propagate as
//! [`CacheError`]; retry is a user-initiated replay of the same call.
//!
//! Persistent-tier hits are trusted verbatim and never re-validated
//! against the provider. Two racing requests for the same uncached key may
//! both reach the provider; the results are semantically equivalent and
//! the last write wins.

use crate::asset::{Asset, AudioClip, ComprehensionQuestion};
use crate::classify::Classifier;
use crate::keys;
use crate::library::{Story, StoryId};
use crate::prompts;
use crate::provider::{GenerationClient, GenerationError};
use crate::store::{KeyValueStore, TieredStore};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to the UI layer by cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

impl CacheError {
    /// Whether this failure is a provider quota or rate limit.
    ///
    /// Detected by vocabulary in the provider message, since quota errors
    /// arrive as ordinary API errors with distinctive wording.
    pub fn is_quota(&self) -> bool {
        let CacheError::Generation(err) = self else {
            return false;
        };
        let message = err.to_string().to_lowercase();
        message.contains("quota")
            || message.contains("limit")
            || message.contains("resource has been exhausted")
            || message.contains("resource_exhausted")
    }

    /// A non-technical message suitable for young readers.
    pub fn friendly_message(&self) -> &'static str {
        if self.is_quota() {
            "The bee is tired! Please wait a moment and try again."
        } else {
            "Oops! Something went wrong. Please try again."
        }
    }
}

/// A generated cover image together with the prompt that produced it.
///
/// The prompt is returned so the caller can persist it on the story for
/// later regeneration.
#[derive(Debug, Clone)]
pub struct CoverArt {
    pub image: String,
    pub prompt: Option<String>,
}

/// The generated-asset cache service.
///
/// Explicitly constructed and dependency-injected; create one per app
/// session (page lifetime) and share it by reference. Only these methods
/// write the session tier, always through the full get-or-generate
/// sequence.
pub struct AssetCache {
    store: TieredStore,
    classifier: Classifier,
    client: Arc<dyn GenerationClient>,
}

impl AssetCache {
    /// Create a cache over a persistent store and a generation client,
    /// with the default classifier.
    pub fn new(persistent: Arc<dyn KeyValueStore>, client: Arc<dyn GenerationClient>) -> Self {
        Self {
            store: TieredStore::new(persistent),
            classifier: Classifier::default(),
            client,
        }
    }

    /// Replace the classifier (localized or test-specific sets).
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Access the underlying two-tier store.
    pub fn store(&self) -> &TieredStore {
        &self.store
    }

    /// Get or generate the illustration for a tapped word.
    ///
    /// The key is scoped to the surrounding paragraph, so the same word in
    /// a different sentence is a distinct entry. Returns a data URI.
    pub async fn word_image(&self, word: &str, context: &str) -> Result<String, CacheError> {
        let key = keys::word_image_key(word, context);
        if let Some(uri) = self
            .store
            .get(&key)
            .and_then(|a| a.as_image().map(str::to_string))
        {
            debug!(%key, "word image cache hit");
            return Ok(uri);
        }

        let class = self.classifier.classify(word);
        let prompt = prompts::word_image_prompt(word, class);
        let uri = self.client.generate_image(&prompt).await?;

        self.store.put(&key, Asset::Image(uri.clone()));
        Ok(uri)
    }

    /// Get or generate the spoken pronunciation of a word.
    pub async fn word_audio(&self, word: &str) -> Result<AudioClip, CacheError> {
        let key = keys::word_audio_key(word);
        if let Some(clip) = self.store.get(&key).and_then(|a| a.as_audio().cloned()) {
            debug!(%key, "word audio cache hit");
            return Ok(clip);
        }

        let clip = self
            .client
            .generate_speech(&prompts::word_audio_prompt(word))
            .await?;

        self.store.put(&key, Asset::Audio(clip.clone()));
        Ok(clip)
    }

    /// Get or generate a story's cover image.
    ///
    /// When the story carries no cover prompt, one is first derived by
    /// summarizing its title and body, then used for the image request.
    pub async fn story_cover(&self, story: &Story) -> Result<CoverArt, CacheError> {
        let key = keys::story_cover_key(story.id);
        if let Some(image) = self
            .store
            .get(&key)
            .and_then(|a| a.as_image().map(str::to_string))
        {
            debug!(%key, "story cover cache hit");
            return Ok(CoverArt {
                image,
                prompt: story.cover_prompt.clone(),
            });
        }

        let prompt = match &story.cover_prompt {
            Some(prompt) => prompt.clone(),
            None => {
                self.client
                    .generate_text(&prompts::cover_summary_prompt(
                        &story.title,
                        &story.full_text(),
                    ))
                    .await?
            }
        };

        let image = self
            .client
            .generate_image(&prompts::cover_image_prompt(&prompt))
            .await?;

        self.store.put(&key, Asset::Image(image.clone()));
        Ok(CoverArt {
            image,
            prompt: Some(prompt),
        })
    }

    /// Get or generate full-story narration.
    ///
    /// The whole body is narrated in one call, so latency scales with
    /// story length; the caller owns the loading state and stop control.
    pub async fn story_audio(
        &self,
        story_id: StoryId,
        full_text: &str,
    ) -> Result<AudioClip, CacheError> {
        let key = keys::story_audio_key(story_id);
        if let Some(clip) = self.store.get(&key).and_then(|a| a.as_audio().cloned()) {
            debug!(%key, "story narration cache hit");
            return Ok(clip);
        }

        let clip = self
            .client
            .generate_speech(&prompts::narration_prompt(full_text))
            .await?;

        self.store.put(&key, Asset::Audio(clip.clone()));
        Ok(clip)
    }

    /// Get or generate a story's comprehension questions.
    ///
    /// The remote response is schema-validated: an empty set, or any entry
    /// with an empty question or answer, counts as a generation failure
    /// even though the call itself succeeded.
    pub async fn comprehension_questions(
        &self,
        story_id: StoryId,
        full_text: &str,
    ) -> Result<Vec<ComprehensionQuestion>, CacheError> {
        let key = keys::story_questions_key(story_id);
        if let Some(questions) = self
            .store
            .get(&key)
            .and_then(|a| a.as_questions().map(<[_]>::to_vec))
        {
            debug!(%key, "comprehension questions cache hit");
            return Ok(questions);
        }

        let value = self
            .client
            .generate_structured(
                &prompts::questions_prompt(full_text),
                prompts::questions_schema(),
            )
            .await?;

        let questions: Vec<ComprehensionQuestion> = serde_json::from_value(value)
            .map_err(|e| CacheError::MalformedResponse(e.to_string()))?;

        if questions.is_empty() {
            return Err(CacheError::MalformedResponse(
                "empty question set".to_string(),
            ));
        }
        for entry in &questions {
            if entry.question.trim().is_empty() || entry.answer.trim().is_empty() {
                return Err(CacheError::MalformedResponse(
                    "question entry with empty field".to_string(),
                ));
            }
        }

        self.store.put(&key, Asset::Questions(questions.clone()));
        Ok(questions)
    }

    /// Replace a story's cover wholesale (user upload or regeneration).
    pub fn set_story_cover(&self, story_id: StoryId, data_uri: &str) {
        self.store.put(
            &keys::story_cover_key(story_id),
            Asset::Image(data_uri.to_string()),
        );
    }

    /// Generate covers for every given story, concurrently.
    ///
    /// Individual failures do not abort the batch; each story gets its own
    /// result.
    pub async fn generate_missing_covers(
        &self,
        stories: &[Story],
    ) -> Vec<(StoryId, Result<CoverArt, CacheError>)> {
        let tasks = stories
            .iter()
            .map(|story| async move { (story.id, self.story_cover(story).await) });
        join_all(tasks).await
    }

    /// Remove every cached asset belonging to a story from both tiers.
    ///
    /// Called when a story is deleted so its questions, narration and
    /// cover do not outlive it.
    pub fn invalidate_story(&self, story_id: StoryId) {
        self.store.remove(&keys::story_cover_key(story_id));
        self.store.remove(&keys::story_audio_key(story_id));
        self.store.remove(&keys::story_questions_key(story_id));
    }

    /// Empty the session tier. Persistent entries survive, so prior work
    /// is reused after the reader exits the current story.
    pub fn clear_session_caches(&self) {
        self.store.clear_session();
    }
}
