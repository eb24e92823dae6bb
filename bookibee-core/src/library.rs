//! The story catalog: built-in stories plus user-authored stories.
//!
//! Built-ins are a static, immutable table loaded at startup. User
//! stories are authored through the generation client, tagged with an
//! explicit origin, and persisted as an ordered catalog in the
//! persistent store. The origin tag, not the id, decides what may be
//! deleted or edited.

use crate::asset::ComprehensionQuestion;
use crate::builtins;
use crate::cache::AssetCache;
use crate::keys;
use crate::prompts;
use crate::provider::{GenerationClient, GenerationError};
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::warn;

/// Unique story identifier. New stories mint ids from the current time in
/// milliseconds, which cannot collide with the small built-in ids.
pub type StoryId = i64;

/// Errors from story catalog operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("story {0} not found")]
    NotFound(StoryId),

    #[error("built-in stories cannot be modified or deleted")]
    BuiltInImmutable,

    #[error("story generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("malformed story response: {0}")]
    MalformedResponse(String),
}

/// Reading difficulty shown on story cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingLevel {
    Easy,
    Medium,
    Hard,
    SuperHard,
}

impl ReadingLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ReadingLevel::Easy => "Easy",
            ReadingLevel::Medium => "Medium",
            ReadingLevel::Hard => "Hard",
            ReadingLevel::SuperHard => "Super Hard",
        }
    }

    fn sort_order(&self) -> u8 {
        match self {
            ReadingLevel::Easy => 0,
            ReadingLevel::Medium => 1,
            ReadingLevel::Hard => 2,
            ReadingLevel::SuperHard => 3,
        }
    }
}

/// CEFR language level chosen when authoring a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub fn label(&self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }

    /// Map a CEFR level onto the card difficulty.
    pub fn reading_level(&self) -> ReadingLevel {
        match self {
            CefrLevel::A1 => ReadingLevel::Easy,
            CefrLevel::A2 => ReadingLevel::Medium,
            CefrLevel::B1 | CefrLevel::B2 => ReadingLevel::Hard,
            CefrLevel::C1 | CefrLevel::C2 => ReadingLevel::SuperHard,
        }
    }
}

/// Where a story came from. Deletion and editing are allowed only for
/// user-created stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryOrigin {
    BuiltIn,
    UserCreated,
}

/// Presentation color tokens, carried opaquely for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTokens {
    pub base: String,
    pub hover: String,
}

impl ColorTokens {
    pub fn new(base: impl Into<String>, hover: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            hover: hover.into(),
        }
    }
}

/// A story in the catalog.
///
/// Paragraphs may embed `[[phrase]]` markers delimiting a tappable
/// multi-word phrase; the markers are opaque to this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub level: ReadingLevel,
    pub paragraphs: Vec<String>,
    pub colors: ColorTokens,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub cover_prompt: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<ComprehensionQuestion>>,
    pub origin: StoryOrigin,
}

impl Story {
    /// The full body, paragraphs joined by newlines, as narrated and as
    /// summarized for covers and questions.
    pub fn full_text(&self) -> String {
        self.paragraphs.join("\n")
    }

    pub fn is_deletable(&self) -> bool {
        self.origin == StoryOrigin::UserCreated
    }
}

/// Rotating card palettes for newly authored stories.
const PALETTE: [(&str, &str); 6] = [
    ("bg-lime-200", "hover:bg-lime-300"),
    ("bg-teal-200", "hover:bg-teal-300"),
    ("bg-indigo-200", "hover:bg-indigo-300"),
    ("bg-amber-200", "hover:bg-amber-300"),
    ("bg-rose-200", "hover:bg-rose-300"),
    ("bg-sky-200", "hover:bg-sky-300"),
];

/// The story catalog.
pub struct StoryLibrary {
    store: Arc<dyn KeyValueStore>,
    builtins: Vec<Story>,
    user: Vec<Story>,
}

impl StoryLibrary {
    /// Load the catalog: the static built-ins plus any persisted user
    /// stories. An unreadable or unparsable user catalog falls back to
    /// empty with a warning; it is never surfaced.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let user = match store.get(keys::USER_STORIES_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unparsable user story catalog");
                Vec::new()
            }),
            None => Vec::new(),
        };

        Self {
            store,
            builtins: builtins::builtin_stories().to_vec(),
            user,
        }
    }

    /// All stories: built-ins first, then user stories in creation order.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.builtins.iter().chain(self.user.iter())
    }

    /// All stories ordered by reading level (stable within a level).
    pub fn by_level(&self) -> Vec<&Story> {
        let mut all: Vec<&Story> = self.stories().collect();
        all.sort_by_key(|s| s.level.sort_order());
        all
    }

    pub fn get(&self, id: StoryId) -> Option<&Story> {
        self.stories().find(|s| s.id == id)
    }

    pub fn user_story_count(&self) -> usize {
        self.user.len()
    }

    /// Add a user story with a fresh id and the next palette entry.
    pub fn create_story(
        &mut self,
        title: impl Into<String>,
        paragraphs: Vec<String>,
        level: ReadingLevel,
    ) -> &Story {
        let (base, hover) = PALETTE[self.user.len() % PALETTE.len()];
        let story = Story {
            id: next_story_id(),
            title: title.into(),
            level,
            paragraphs,
            colors: ColorTokens::new(base, hover),
            cover_image: None,
            cover_prompt: None,
            questions: None,
            origin: StoryOrigin::UserCreated,
        };

        self.user.push(story);
        self.persist();
        self.user.last().expect("just pushed")
    }

    /// Author a new story remotely and add it to the catalog.
    pub async fn author_story(
        &mut self,
        client: &dyn GenerationClient,
        topic: &str,
        level: CefrLevel,
    ) -> Result<&Story, LibraryError> {
        #[derive(Deserialize)]
        struct Draft {
            title: String,
            paragraphs: Vec<String>,
        }

        let value = client
            .generate_structured(&prompts::story_prompt(topic, level), prompts::story_schema())
            .await?;

        let draft: Draft = serde_json::from_value(value)
            .map_err(|e| LibraryError::MalformedResponse(e.to_string()))?;

        if draft.title.trim().is_empty() || draft.paragraphs.is_empty() {
            return Err(LibraryError::MalformedResponse(
                "story with empty title or body".to_string(),
            ));
        }

        Ok(self.create_story(draft.title, draft.paragraphs, level.reading_level()))
    }

    /// Delete a user story, cascading its cached cover, narration and
    /// questions. Built-ins cannot be deleted.
    pub fn delete_story(
        &mut self,
        id: StoryId,
        cache: &AssetCache,
    ) -> Result<Story, LibraryError> {
        if self.builtins.iter().any(|s| s.id == id) {
            return Err(LibraryError::BuiltInImmutable);
        }

        let index = self
            .user
            .iter()
            .position(|s| s.id == id)
            .ok_or(LibraryError::NotFound(id))?;

        let removed = self.user.remove(index);
        self.persist();
        cache.invalidate_story(id);
        Ok(removed)
    }

    /// Replace a user story's cover image and, when given, the prompt
    /// that produced it.
    pub fn update_cover(
        &mut self,
        id: StoryId,
        data_uri: impl Into<String>,
        prompt: Option<String>,
    ) -> Result<(), LibraryError> {
        let story = self.user_story_mut(id)?;
        story.cover_image = Some(data_uri.into());
        if prompt.is_some() {
            story.cover_prompt = prompt;
        }
        self.persist();
        Ok(())
    }

    /// Attach a generated question set to a user story.
    pub fn set_questions(
        &mut self,
        id: StoryId,
        questions: Vec<ComprehensionQuestion>,
    ) -> Result<(), LibraryError> {
        let story = self.user_story_mut(id)?;
        story.questions = Some(questions);
        self.persist();
        Ok(())
    }

    fn user_story_mut(&mut self, id: StoryId) -> Result<&mut Story, LibraryError> {
        if self.builtins.iter().any(|s| s.id == id) {
            return Err(LibraryError::BuiltInImmutable);
        }
        self.user
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(LibraryError::NotFound(id))
    }

    /// Persist the user catalog, best-effort. A write failure is logged
    /// and the in-memory catalog stays authoritative for the session.
    fn persist(&self) {
        match serde_json::to_string(&self.user) {
            Ok(raw) => {
                if let Err(e) = self.store.set(keys::USER_STORIES_KEY, &raw) {
                    warn!(error = %e, "failed to persist user story catalog");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize user story catalog"),
        }
    }
}

/// Mint a fresh story id from the current time in milliseconds.
fn next_story_id() -> StoryId {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as StoryId
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKv;

    fn library() -> StoryLibrary {
        StoryLibrary::new(Arc::new(MemoryKv::new()))
    }

    #[test]
    fn test_builtins_load() {
        let lib = library();
        assert!(lib.stories().count() >= 3);
        assert!(lib.stories().all(|s| s.origin == StoryOrigin::BuiltIn));
    }

    #[test]
    fn test_by_level_ordering() {
        let mut lib = library();
        lib.create_story("Late Easy", vec!["One.".to_string()], ReadingLevel::Easy);

        let ordered = lib.by_level();
        let orders: Vec<u8> = ordered.iter().map(|s| s.level.sort_order()).collect();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn test_create_story_tags_origin_and_persists() {
        let store = Arc::new(MemoryKv::new());
        let mut lib = StoryLibrary::new(store.clone());

        let id = lib
            .create_story(
                "The Brave Bee",
                vec!["A bee flew far.".to_string()],
                ReadingLevel::Easy,
            )
            .id;

        assert_eq!(lib.get(id).unwrap().origin, StoryOrigin::UserCreated);
        assert!(lib.get(id).unwrap().is_deletable());

        // Survives a reload from the same store.
        let reloaded = StoryLibrary::new(store);
        assert!(reloaded.get(id).is_some());
    }

    #[test]
    fn test_cefr_mapping() {
        assert_eq!(CefrLevel::A1.reading_level(), ReadingLevel::Easy);
        assert_eq!(CefrLevel::A2.reading_level(), ReadingLevel::Medium);
        assert_eq!(CefrLevel::B1.reading_level(), ReadingLevel::Hard);
        assert_eq!(CefrLevel::B2.reading_level(), ReadingLevel::Hard);
        assert_eq!(CefrLevel::C1.reading_level(), ReadingLevel::SuperHard);
        assert_eq!(CefrLevel::C2.reading_level(), ReadingLevel::SuperHard);
    }

    #[test]
    fn test_corrupt_catalog_falls_back_empty() {
        let store = Arc::new(MemoryKv::new());
        store.set(keys::USER_STORIES_KEY, "{ nope").unwrap();

        let lib = StoryLibrary::new(store);
        assert_eq!(lib.user_story_count(), 0);
    }

    #[test]
    fn test_update_cover_rejects_builtins() {
        let mut lib = library();
        let builtin_id = lib.stories().next().unwrap().id;
        let err = lib
            .update_cover(builtin_id, "data:image/png;base64,AA==", None)
            .unwrap_err();
        assert!(matches!(err, LibraryError::BuiltInImmutable));
    }
}
