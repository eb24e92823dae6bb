//! Cache-key derivation.
//!
//! Keys are pure, deterministic functions of the semantically relevant
//! inputs only. Identical key means identical request, which makes a
//! cached value safe to serve without another provider call.

use crate::library::StoryId;

const IMAGE_PREFIX: &str = "bookibee-img-";
const AUDIO_PREFIX: &str = "bookibee-audio-";
const COVER_PREFIX: &str = "bookibee-cover-";
const NARRATION_PREFIX: &str = "bookibee-narration-";
const QUESTIONS_PREFIX: &str = "bookibee-questions-";

/// Key under which the user-authored story catalog is persisted.
pub const USER_STORIES_KEY: &str = "bookibee-user-stories";

/// Key under which word-tap counters are persisted.
pub const WORD_COUNTS_KEY: &str = "bookibee-word-counts";

/// Key for a word illustration. Context-scoped: the same word tapped in
/// two different paragraphs is two distinct cache entries.
pub fn word_image_key(word: &str, context: &str) -> String {
    format!("{IMAGE_PREFIX}{}|{context}", word.to_lowercase())
}

/// Key for a word pronunciation. Context-independent.
pub fn word_audio_key(word: &str) -> String {
    format!("{AUDIO_PREFIX}{}", word.to_lowercase())
}

/// Key for a story's cover image.
pub fn story_cover_key(story_id: StoryId) -> String {
    format!("{COVER_PREFIX}{story_id}")
}

/// Key for a story's full narration audio.
pub fn story_audio_key(story_id: StoryId) -> String {
    format!("{NARRATION_PREFIX}{story_id}")
}

/// Key for a story's comprehension question set.
pub fn story_questions_key(story_id: StoryId) -> String {
    format!("{QUESTIONS_PREFIX}{story_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_key_is_deterministic() {
        let ctx = "Pip is a small, happy puppy.";
        assert_eq!(word_image_key("puppy", ctx), word_image_key("puppy", ctx));
    }

    #[test]
    fn test_image_key_is_case_insensitive() {
        let ctx = "Pip is a small, happy puppy.";
        assert_eq!(word_image_key("Puppy", ctx), word_image_key("puppy", ctx));
    }

    #[test]
    fn test_image_key_distinguishes_words_and_contexts() {
        let ctx = "Pip is a small, happy puppy.";
        assert_ne!(word_image_key("puppy", ctx), word_image_key("ball", ctx));
        assert_ne!(
            word_image_key("puppy", ctx),
            word_image_key("puppy", "The puppy slept all day.")
        );
    }

    #[test]
    fn test_audio_key_ignores_context() {
        assert_eq!(word_audio_key("Bee"), word_audio_key("bee"));
        assert_eq!(word_audio_key("bee"), "bookibee-audio-bee");
    }

    #[test]
    fn test_story_keys_are_distinct_per_kind() {
        let id = 1723486511000;
        let keys = [
            story_cover_key(id),
            story_audio_key(id),
            story_questions_key(id),
        ];
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_ne!(keys[0], keys[2]);
    }
}
