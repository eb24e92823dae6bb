//! Generated media assets and their persisted form.
//!
//! Assets are immutable once produced; a regeneration replaces the cached
//! value wholesale. The persisted representation is JSON with audio
//! payloads carried as base64 16-bit PCM (the provider's TTS wire format).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from encoding or decoding a persisted asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid audio payload: {0}")]
    InvalidAudio(String),
}

/// A single comprehension question with its expected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComprehensionQuestion {
    pub question: String,
    pub answer: String,
}

/// Decoded PCM audio, ready for a playback sink.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioClip {
    /// Decode base64 16-bit little-endian PCM into samples in [-1, 1].
    pub fn from_pcm16_base64(
        data: &str,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Self, AssetError> {
        let bytes = BASE64
            .decode(data)
            .map_err(|e| AssetError::InvalidAudio(e.to_string()))?;

        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
            .collect();

        Ok(Self {
            sample_rate,
            channels,
            samples,
        })
    }

    /// Encode samples back into base64 16-bit little-endian PCM.
    pub fn to_pcm16_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(self.samples.len() * 2);
        for sample in &self.samples {
            let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        BASE64.encode(bytes)
    }

    /// Playback length of the clip.
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as u64 / self.channels.max(1) as u64;
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }
}

/// A generated artifact cached by key.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    /// Encoded raster image as a data URI.
    Image(String),

    /// Decoded narration or pronunciation audio.
    Audio(AudioClip),

    /// Ordered sequence of strings (e.g. story paragraphs).
    TextList(Vec<String>),

    /// Comprehension question set.
    Questions(Vec<ComprehensionQuestion>),
}

impl Asset {
    /// Serialize into the persisted string form.
    pub fn encode(&self) -> Result<String, AssetError> {
        let stored = match self {
            Asset::Image(data_uri) => StoredAsset::Image {
                data_uri: data_uri.clone(),
            },
            Asset::Audio(clip) => StoredAsset::Audio {
                sample_rate: clip.sample_rate,
                channels: clip.channels,
                pcm: clip.to_pcm16_base64(),
            },
            Asset::TextList(items) => StoredAsset::TextList {
                items: items.clone(),
            },
            Asset::Questions(items) => StoredAsset::Questions {
                items: items.clone(),
            },
        };
        Ok(serde_json::to_string(&stored)?)
    }

    /// Deserialize from the persisted string form.
    pub fn decode(raw: &str) -> Result<Self, AssetError> {
        let stored: StoredAsset = serde_json::from_str(raw)?;
        Ok(match stored {
            StoredAsset::Image { data_uri } => Asset::Image(data_uri),
            StoredAsset::Audio {
                sample_rate,
                channels,
                pcm,
            } => Asset::Audio(AudioClip::from_pcm16_base64(&pcm, sample_rate, channels)?),
            StoredAsset::TextList { items } => Asset::TextList(items),
            StoredAsset::Questions { items } => Asset::Questions(items),
        })
    }

    pub fn as_image(&self) -> Option<&str> {
        match self {
            Asset::Image(data_uri) => Some(data_uri),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioClip> {
        match self {
            Asset::Audio(clip) => Some(clip),
            _ => None,
        }
    }

    pub fn as_questions(&self) -> Option<&[ComprehensionQuestion]> {
        match self {
            Asset::Questions(items) => Some(items),
            _ => None,
        }
    }
}

/// Persisted wire form. Audio samples travel as base64 PCM.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StoredAsset {
    Image {
        data_uri: String,
    },
    Audio {
        sample_rate: u32,
        channels: u16,
        pcm: String,
    },
    TextList {
        items: Vec<String>,
    },
    Questions {
        items: Vec<ComprehensionQuestion>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_round_trip() {
        let clip = AudioClip {
            sample_rate: 24_000,
            channels: 1,
            samples: vec![0.0, 0.5, -0.5, 1.0, -1.0],
        };

        let encoded = clip.to_pcm16_base64();
        let decoded = AudioClip::from_pcm16_base64(&encoded, 24_000, 1).unwrap();

        assert_eq!(decoded.samples.len(), clip.samples.len());
        for (a, b) in clip.samples.iter().zip(&decoded.samples) {
            assert!((a - b).abs() < 1.0 / 32_000.0, "{a} vs {b}");
        }
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let err = AudioClip::from_pcm16_base64("not base64!!!", 24_000, 1);
        assert!(matches!(err, Err(AssetError::InvalidAudio(_))));
    }

    #[test]
    fn test_clip_duration() {
        let clip = AudioClip {
            sample_rate: 24_000,
            channels: 1,
            samples: vec![0.0; 24_000],
        };
        assert_eq!(clip.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_image_asset_round_trip() {
        let asset = Asset::Image("data:image/png;base64,aGk=".to_string());
        let decoded = Asset::decode(&asset.encode().unwrap()).unwrap();
        assert_eq!(decoded, asset);
    }

    #[test]
    fn test_audio_asset_round_trip() {
        let asset = Asset::Audio(AudioClip {
            sample_rate: 24_000,
            channels: 1,
            samples: vec![0.25; 480],
        });
        let decoded = Asset::decode(&asset.encode().unwrap()).unwrap();
        let clip = decoded.as_audio().unwrap();
        assert_eq!(clip.sample_rate, 24_000);
        assert_eq!(clip.samples.len(), 480);
    }

    #[test]
    fn test_questions_asset_round_trip() {
        let asset = Asset::Questions(vec![ComprehensionQuestion {
            question: "Who is Pip?".to_string(),
            answer: "A small, happy puppy.".to_string(),
        }]);
        let decoded = Asset::decode(&asset.encode().unwrap()).unwrap();
        assert_eq!(decoded.as_questions().unwrap().len(), 1);
    }

    #[test]
    fn test_garbage_decode_is_an_error() {
        assert!(Asset::decode("not json").is_err());
    }
}
