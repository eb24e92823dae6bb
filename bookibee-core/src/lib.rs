//! Engine for BookiBee, an interactive reading app for children.
//!
//! This crate provides:
//! - A two-tier cache for generated media: word illustrations, spoken
//!   pronunciations, story covers, full-story narration and comprehension
//!   questions
//! - Word classification for age-appropriate generation styles
//! - A story library of built-in and user-authored stories
//! - Word-tap statistics and a narration playback state machine
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use bookibee_core::{AssetCache, FileKv, GeminiGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileKv::open("bookibee.json"));
//!     let client = Arc::new(GeminiGenerator::from_env()?);
//!     let cache = AssetCache::new(store, client);
//!
//!     let image = cache
//!         .word_image("puppy", "Pip is a small, happy puppy.")
//!         .await?;
//!     println!("got {} bytes of image", image.len());
//!     Ok(())
//! }
//! ```

pub mod asset;
pub mod builtins;
pub mod cache;
pub mod classify;
pub mod keys;
pub mod library;
pub mod playback;
pub mod prompts;
pub mod provider;
pub mod stats;
pub mod store;
pub mod testing;

// Primary public API
pub use asset::{Asset, AudioClip, ComprehensionQuestion};
pub use cache::{AssetCache, CacheError, CoverArt};
pub use classify::{Classifier, ClassifierConfig, WordClass};
pub use library::{
    CefrLevel, ColorTokens, LibraryError, ReadingLevel, Story, StoryId, StoryLibrary, StoryOrigin,
};
pub use playback::{NarrationPlayer, PlaybackState, StopHandle};
pub use provider::{GeminiGenerator, GenerationClient, GenerationError};
pub use stats::{TapCounter, WordCounts};
pub use store::{FileKv, KeyValueStore, MemoryKv, StoreError, TieredStore};
pub use testing::{CacheHarness, MockClient};
