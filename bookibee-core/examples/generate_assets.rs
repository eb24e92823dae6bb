//! Generate a few assets for the first built-in story.
//!
//! Requires GEMINI_API_KEY. Assets are cached in `bookibee.json`, so a
//! second run makes no remote calls.

use bookibee_core::{builtins, AssetCache, FileKv, GeminiGenerator};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let store = Arc::new(FileKv::open("bookibee.json"));
    let client = Arc::new(GeminiGenerator::from_env()?);
    let cache = AssetCache::new(store, client);

    let story = &builtins::builtin_stories()[0];
    println!("Story: {}", story.title);

    let image = cache
        .word_image("puppy", "Pip is a small, happy puppy.")
        .await?;
    println!("word image: {} bytes", image.len());

    let clip = cache.word_audio("puppy").await?;
    println!("word audio: {:?}", clip.duration());

    let cover = cache.story_cover(story).await?;
    println!(
        "cover: {} bytes (prompt: {})",
        cover.image.len(),
        cover.prompt.as_deref().unwrap_or("<cached>")
    );

    let questions = cache
        .comprehension_questions(story.id, &story.full_text())
        .await?;
    for (i, q) in questions.iter().enumerate() {
        println!("{}. {} -> {}", i + 1, q.question, q.answer);
    }

    Ok(())
}
