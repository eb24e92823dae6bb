//! Word classification for choosing a generation style.
//!
//! Visuals stay age-appropriate and consistent by routing each tappable
//! word or phrase to one of four styles: real-world nouns become
//! realistic photographs, abstract concepts and feelings become simple
//! cartoons, fantasy nouns become whimsical illustrations, and anything
//! unknown falls back to a simple cartoon.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The generation style selected for a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordClass {
    /// Tangible things, animals, places and objects. Photograph style.
    RealWorld,

    /// Feelings, states and abstract ideas. Simple cartoon style.
    AbstractConcept,

    /// Magical things that do not exist. Whimsical illustration style.
    Fantasy,

    /// Anything not in a known set. Simple cartoon style.
    Fallback,
}

/// Serializable membership sets, for loading localized or test-specific
/// classifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub real_world: Vec<String>,
    pub abstract_concepts: Vec<String>,
    pub fantasy: Vec<String>,
}

/// Data-driven word classifier over three fixed membership sets.
///
/// Classification is a pure, case-insensitive lookup; unknown words
/// always fall through to [`WordClass::Fallback`].
pub struct Classifier {
    real_world: HashSet<String>,
    abstract_concepts: HashSet<String>,
    fantasy: HashSet<String>,
}

impl Classifier {
    /// Build a classifier from explicit membership sets.
    pub fn from_sets<I, J, K>(real_world: I, abstract_concepts: J, fantasy: K) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        fn lowered<T: IntoIterator>(items: T) -> HashSet<String>
        where
            T::Item: Into<String>,
        {
            items
                .into_iter()
                .map(|w| {
                    let w: String = w.into();
                    w.to_lowercase()
                })
                .collect()
        }

        Self {
            real_world: lowered(real_world),
            abstract_concepts: lowered(abstract_concepts),
            fantasy: lowered(fantasy),
        }
    }

    /// Build a classifier from a serialized configuration.
    pub fn from_config(config: ClassifierConfig) -> Self {
        Self::from_sets(config.real_world, config.abstract_concepts, config.fantasy)
    }

    /// Classify a word or phrase. Total: never errors.
    pub fn classify(&self, word: &str) -> WordClass {
        let word = word.to_lowercase();
        if self.real_world.contains(&word) {
            WordClass::RealWorld
        } else if self.abstract_concepts.contains(&word) {
            WordClass::AbstractConcept
        } else if self.fantasy.contains(&word) {
            WordClass::Fantasy
        } else {
            WordClass::Fallback
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_sets(
            REAL_WORLD_NOUNS.iter().copied(),
            ABSTRACT_CONCEPT_WORDS.iter().copied(),
            FANTASY_NOUNS.iter().copied(),
        )
    }
}

/// Words for feelings, states, or abstract ideas.
const ABSTRACT_CONCEPT_WORDS: &[&str] = &[
    "happy",
    "sad",
    "angry",
    "scared",
    "surprised",
    "brave",
    "friendly",
    "kind",
    "caring",
    "empathy",
    "busy",
    "sleepy",
    "hungry",
    "thirsty",
    "funny",
    "silly",
    "proud",
    "cozy",
    "sick",
    "better",
    "fun",
    "worried",
    "delicious",
    "tasty",
    "yummy",
    "beautiful",
    "great",
    "perfect",
    "bittersweet",
    "feeling better",
    "happy songs",
    "funny jokes",
    "sore throat",
    "sneeze",
    "best friends",
];

/// Words for tangible things, animals, places, and objects.
const REAL_WORLD_NOUNS: &[&str] = &[
    // Animals
    "puppy",
    "happy puppy",
    "cat",
    "bird",
    "bear",
    "squirrel",
    "rabbit",
    "butterflies",
    "bugs",
    "eagles",
    "animals",
    "monkeys",
    "fish",
    // Objects
    "red ball",
    "blue bowl",
    "building blocks",
    "bright paints",
    "thermometer",
    "story book",
    "teddy bear",
    "blanket",
    "bed",
    "door",
    "window",
    "house",
    "rug",
    "tower",
    "tall tower",
    "box",
    "paper",
    "map",
    "hat",
    "ladder",
    "swings",
    "rock",
    "painted rock",
    "treasure",
    "kite",
    "globe",
    "robot",
    "machine",
    "wing",
    "twig",
    "bottle cap",
    // Nature & places
    "pine tree",
    "red ornaments",
    "green grass",
    "fresh leaves",
    "oak tree",
    "flower forest",
    "flowers",
    "garden",
    "park",
    "jungle",
    "village",
    "backyard",
    "mountain",
    "forest",
    "wind",
    "sun",
    "moon",
    "full moon",
    "sky",
    "clouds",
    "water",
    "rain",
    "waterfall",
    "rivers",
    "path",
    "puddles",
    "lawn",
    "leaf",
    "trees",
    "bushes",
    "moonlight",
    "sand",
    "desert",
    "canopy",
    "stars",
    // Food
    "tasty cookies",
    "chicken soup",
    "croissant",
    "sushi",
    "shaved ice",
    "sweet corn",
    "red beans",
    "sprinkles",
    "hot cocoa",
    "carrot",
    "food",
    "chicken",
    "bread",
    "dough",
    "treat",
    "syrups",
    "jelly",
    "rice",
    // People & body parts
    "face",
    "tail",
    "fur",
    "eyes",
    "nose",
    "sister",
    "dad",
    "mom",
    "parents",
    "family",
    "family picture",
    "man",
    "people",
    "grandfather",
    "guide",
    "head",
    "throat",
    "voice",
    "forehead",
    "hand",
    "hair",
    "arms",
    "beak",
    "eyelashes",
    // Misc
    "winter day",
    "party",
    "playroom",
    "smile",
    "hug",
    "fever",
    "school",
    "nap",
    "adventure",
    "lights",
    "stick",
    "rainbow",
    "bowl",
    "spoon",
    "feast",
    "workshop",
    "patterns",
    "heart",
    "peaks",
    "team",
    "home",
    "light",
    "room",
];

/// Words for fantasy or magical things.
const FANTASY_NOUNS: &[&str] = &[
    "monster",
    "fluffy monster",
    "dragon",
    "moon-kite",
    "heart of the forest",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_routing() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("puppy"), WordClass::RealWorld);
        assert_eq!(classifier.classify("happy"), WordClass::AbstractConcept);
        assert_eq!(classifier.classify("dragon"), WordClass::Fantasy);
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("Puppy"), WordClass::RealWorld);
        assert_eq!(classifier.classify("DRAGON"), WordClass::Fantasy);
    }

    #[test]
    fn test_phrases_classify_whole() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("fluffy monster"), WordClass::Fantasy);
        assert_eq!(classifier.classify("red ball"), WordClass::RealWorld);
        assert_eq!(classifier.classify("best friends"), WordClass::AbstractConcept);
    }

    #[test]
    fn test_unknown_word_falls_back() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("xyzzy123"), WordClass::Fallback);
        assert_eq!(classifier.classify(""), WordClass::Fallback);
    }

    #[test]
    fn test_custom_sets() {
        let classifier = Classifier::from_sets(["Tre"], ["Glad"], ["Drake"]);
        assert_eq!(classifier.classify("tre"), WordClass::RealWorld);
        assert_eq!(classifier.classify("glad"), WordClass::AbstractConcept);
        assert_eq!(classifier.classify("drake"), WordClass::Fantasy);
        assert_eq!(classifier.classify("hus"), WordClass::Fallback);
    }

    #[test]
    fn test_config_round_trip() {
        let config = ClassifierConfig {
            real_world: vec!["tree".to_string()],
            abstract_concepts: vec![],
            fantasy: vec![],
        };
        let json = serde_json::to_string(&config).unwrap();
        let loaded: ClassifierConfig = serde_json::from_str(&json).unwrap();
        let classifier = Classifier::from_config(loaded);
        assert_eq!(classifier.classify("tree"), WordClass::RealWorld);
    }
}
