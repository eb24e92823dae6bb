//! The built-in story catalog.
//!
//! Loaded once at startup; immutable. Cover images are tiny placeholder
//! data URIs until a real cover is generated and cached under the story's
//! cover key.

use crate::library::{ColorTokens, ReadingLevel, Story, StoryOrigin};

const PLACEHOLDER_COVER: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkWDP7z4ACABfCAQWf50lcAAAAAElFTkSuQmCC";

fn builtin(
    id: i64,
    title: &str,
    level: ReadingLevel,
    colors: (&str, &str),
    paragraphs: &[&str],
) -> Story {
    Story {
        id,
        title: title.to_string(),
        level,
        paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        colors: ColorTokens::new(colors.0, colors.1),
        cover_image: Some(PLACEHOLDER_COVER.to_string()),
        cover_prompt: None,
        questions: None,
        origin: StoryOrigin::BuiltIn,
    }
}

lazy_static::lazy_static! {
    /// The default stories shipped with the app.
    static ref BUILTIN_STORIES: Vec<Story> = vec![
        builtin(
            10,
            "Pip the Playful Puppy",
            ReadingLevel::Easy,
            ("bg-lime-200", "hover:bg-lime-300"),
            &[
                "Pip is a small, [[happy puppy]]. He has soft brown fur and a tail that is \
                 always wagging. Every morning, Pip wakes up and licks his owner's face. He \
                 loves to play with his favorite [[red ball]] in the big, green garden.",
                "After playing, Pip is very thirsty. He drinks a lot of water from his \
                 [[blue bowl]]. Then, he finds a sunny spot on the floor and takes a long \
                 nap. Pip dreams of chasing butterflies and playing with his friends at the \
                 park.",
            ],
        ),
        builtin(
            11,
            "Milo the Friendly Monster",
            ReadingLevel::Easy,
            ("bg-teal-200", "hover:bg-teal-300"),
            &[
                "Milo was a big, [[fluffy monster]]. He was not scary. He had soft blue fur \
                 and three silly eyes. Milo lived under the bed of a girl named Lily. He did \
                 not want to scare her. He just wanted to tell [[funny jokes]].",
                "One night, Lily heard a small giggle. She looked under her bed and saw \
                 Milo. He told her a joke about a bouncing carrot. Lily laughed and laughed. \
                 From that day on, Milo and Lily were the [[best friends]].",
            ],
        ),
        builtin(
            12,
            "A Holiday Surprise",
            ReadingLevel::Easy,
            ("bg-indigo-200", "hover:bg-indigo-300"),
            &[
                "It was a cold [[winter day]], and three friends were excited. Barnaby the \
                 bear found a small [[pine tree]] to decorate. Squeaky the squirrel found \
                 shiny, [[red ornaments]]. And Rosie the rabbit baked some warm, \
                 [[tasty cookies]] with sprinkles.",
                "They put the ornaments on the tree until it sparkled. They ate the cookies \
                 with hot cocoa. They sang [[happy songs]] together under the twinkling \
                 tree. It was the best holiday party ever.",
            ],
        ),
        builtin(
            1,
            "The Cat and the Rain",
            ReadingLevel::Medium,
            ("bg-amber-200", "hover:bg-amber-300"),
            &[
                "Once, there was a fluffy cat named Pat. Pat loved to play outside in the \
                 sunny garden. He would chase butterflies and roll in the soft \
                 [[green grass]]. His fur was as white as a cloud, and his eyes were bright \
                 green like [[fresh leaves]].",
                "One afternoon, the sky turned grey. Big, dark clouds gathered overhead. \
                 Pat looked up, wiggling his nose. A tiny drop of water landed right on his \
                 pink nose! Plip! Then another, and another. It was starting to rain.",
                "Pat did not like the rain. He ran to the door and meowed loudly. \"Meow! \
                 Let me in!\" he cried. The door opened, and he dashed inside. He shook his \
                 wet fur, sending little drops of water everywhere. He was safe and dry \
                 inside the warm house.",
                "From the window, Pat watched the rain fall. It made little rivers on the \
                 path and shiny puddles on the lawn. He saw a little bird hiding under a \
                 big leaf. Pat felt cozy and sleepy. He curled up on a soft rug and purred \
                 himself to sleep, dreaming of sunny days.",
            ],
        ),
    ];
}

/// The built-in stories, in catalog order.
pub fn builtin_stories() -> &'static [Story] {
    &BUILTIN_STORIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let stories = builtin_stories();
        assert!(stories.len() >= 3);
        for story in stories {
            assert_eq!(story.origin, StoryOrigin::BuiltIn);
            assert!(!story.paragraphs.is_empty());
            assert!(story.cover_image.is_some());
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let stories = builtin_stories();
        let mut ids: Vec<i64> = stories.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), stories.len());
    }

    #[test]
    fn test_phrase_markers_are_balanced() {
        for story in builtin_stories() {
            for paragraph in &story.paragraphs {
                assert_eq!(
                    paragraph.matches("[[").count(),
                    paragraph.matches("]]").count(),
                    "unbalanced markers in '{}'",
                    story.title
                );
            }
        }
    }
}
