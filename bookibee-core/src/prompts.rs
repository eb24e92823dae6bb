//! Prompt construction for every generation call.

use crate::classify::WordClass;
use crate::library::CefrLevel;

/// Number of comprehension questions requested per story.
pub const QUESTION_COUNT: usize = 3;

/// Build the image prompt for a tapped word, by classification.
///
/// Unclassified words get a context-free cartoon prompt; the surrounding
/// sentence is deliberately not included.
pub fn word_image_prompt(word: &str, class: WordClass) -> String {
    match class {
        WordClass::RealWorld => format!(
            "A high-quality, vibrant, child-friendly, realistic photograph of \"{word}\". \
             The subject is the main focus, shown clearly against a simple, clean background. \
             IMPORTANT: This MUST be a real photo. Absolutely no cartoons, illustrations, \
             drawings, or text in the image."
        ),
        WordClass::AbstractConcept => format!(
            "A simple, cute, and colorful cartoon illustration representing the idea of \
             \"{word}\", for a child. No words or text in the image."
        ),
        WordClass::Fantasy => format!(
            "A beautiful, whimsical, and colorful illustration of \"{word}\", for a \
             children's storybook. The style should be magical and imaginative. \
             No words or text in the image."
        ),
        WordClass::Fallback => format!(
            "A simple, cute, and colorful cartoon illustration of \"{word}\", for a child. \
             The style should be simple and easy for a child to understand. \
             No words or text in the image."
        ),
    }
}

/// Build the pronunciation prompt for a tapped word.
pub fn word_audio_prompt(word: &str) -> String {
    format!("Say this word clearly for a child: {word}")
}

/// Build the narration prompt for a full story body.
pub fn narration_prompt(full_text: &str) -> String {
    format!(
        "Read this children's story aloud slowly, warmly, and clearly, \
         as if to a young child at bedtime:\n\n{full_text}"
    )
}

/// Build the prompt that summarizes a story into a cover-image prompt.
pub fn cover_summary_prompt(title: &str, content: &str) -> String {
    format!(
        r#"You are a creative assistant for a children's storybook app. Your task is to summarize a story into a concise, vivid, and child-friendly image prompt for generating a cover illustration. The prompt should capture the main character, the setting, and the key action or mood of the story.

Story Title: "{title}"
Story Content:
---
{content}
---

Based on the story, create a single, descriptive prompt for an image generator. The prompt should be in the style of "A beautiful, whimsical, and colorful illustration of...". Do not include any explanations, just the prompt itself. The generated image must not contain any embedded words or text."#
    )
}

/// Wrap a cover prompt in the house cover style.
pub fn cover_image_prompt(prompt: &str) -> String {
    format!(
        "{prompt}. The style should be beautiful, whimsical, colorful, and suitable for a \
         children's storybook cover. No words or text in the image."
    )
}

/// Build the prompt that authors a new story at a CEFR level.
pub fn story_prompt(topic: &str, level: CefrLevel) -> String {
    format!(
        r#"You are a children's story author. Write a short story about: {topic}

Rules:
- Use vocabulary and sentence structures appropriate for CEFR level {level}.
- Write a short, playful title and 2 to 4 paragraphs.
- Wrap 2 or 3 interesting words or short phrases per paragraph in double square brackets, like [[happy puppy]], so a child can tap them.
- The story must be gentle, positive, and suitable for young children.

Return the title and the paragraphs."#,
        level = level.label()
    )
}

/// Response schema for story authoring.
pub fn story_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "paragraphs": {
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": ["title", "paragraphs"]
    })
}

/// Build the prompt that generates comprehension questions for a story.
pub fn questions_prompt(full_text: &str) -> String {
    format!(
        r#"You are a friendly reading tutor for young children. Read the story below and write exactly {QUESTION_COUNT} simple comprehension questions about it, each with a short answer a child could give. Use easy words.

Story:
---
{full_text}
---"#
    )
}

/// Response schema for comprehension questions.
pub fn questions_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "question": { "type": "string" },
                "answer": { "type": "string" }
            },
            "required": ["question", "answer"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_prompts_by_class() {
        let real = word_image_prompt("puppy", WordClass::RealWorld);
        assert!(real.contains("realistic photograph"));
        assert!(real.contains("\"puppy\""));

        let abstract_ = word_image_prompt("happy", WordClass::AbstractConcept);
        assert!(abstract_.contains("representing the idea"));

        let fantasy = word_image_prompt("dragon", WordClass::Fantasy);
        assert!(fantasy.contains("magical"));

        let fallback = word_image_prompt("xyzzy", WordClass::Fallback);
        assert!(fallback.contains("cartoon illustration"));
        assert!(!fallback.contains("magical"));
    }

    #[test]
    fn test_every_image_prompt_forbids_text() {
        for class in [
            WordClass::RealWorld,
            WordClass::AbstractConcept,
            WordClass::Fantasy,
            WordClass::Fallback,
        ] {
            let prompt = word_image_prompt("bee", class);
            assert!(
                prompt.contains("text in the image"),
                "missing text constraint for {class:?}"
            );
        }
    }

    #[test]
    fn test_cover_summary_prompt_embeds_story() {
        let prompt = cover_summary_prompt("Pip", "Pip is a puppy.");
        assert!(prompt.contains("\"Pip\""));
        assert!(prompt.contains("Pip is a puppy."));
        assert!(prompt.contains("must not contain any embedded words or text"));
    }

    #[test]
    fn test_story_prompt_carries_level() {
        let prompt = story_prompt("a brave bee", CefrLevel::A2);
        assert!(prompt.contains("a brave bee"));
        assert!(prompt.contains("CEFR level A2"));
    }

    #[test]
    fn test_questions_prompt_fixed_count() {
        let prompt = questions_prompt("Once upon a time.");
        assert!(prompt.contains("exactly 3"));
    }
}
