//! Static emotion presets.
//!
//! Each preset is a fixed triple of Chatterbox controls. The table order is
//! also the order batch mode renders in.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RenderError;

/// Generation controls handed to the model for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionPreset {
    /// Expressiveness; 0.5 is the model's neutral delivery.
    pub exaggeration: f32,
    /// Classifier-free guidance weight. Lower values drift further from the
    /// reference voice's pacing.
    pub cfg_weight: f32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Neutral,
    Calm,
    Happy,
    Sad,
    Angry,
    Fearful,
    Excited,
    Dramatic,
}

/// Preset names accepted on the command line, in table order.
pub const EMOTION_NAMES: [&str; 8] = [
    "neutral", "calm", "happy", "sad", "angry", "fearful", "excited", "dramatic",
];

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Neutral,
        Emotion::Calm,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Excited,
        Emotion::Dramatic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Calm => "calm",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Excited => "excited",
            Emotion::Dramatic => "dramatic",
        }
    }

    pub fn preset(self) -> EmotionPreset {
        let (exaggeration, cfg_weight, temperature) = match self {
            Emotion::Neutral => (0.5, 0.5, 0.8),
            Emotion::Calm => (0.3, 0.6, 0.6),
            Emotion::Happy => (0.9, 0.4, 0.9),
            Emotion::Sad => (0.6, 0.7, 0.7),
            Emotion::Angry => (1.5, 0.3, 1.0),
            Emotion::Fearful => (1.0, 0.4, 0.85),
            Emotion::Excited => (1.2, 0.3, 1.0),
            Emotion::Dramatic => (2.0, 0.5, 0.9),
        };
        EmotionPreset {
            exaggeration,
            cfg_weight,
            temperature,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Emotion {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| RenderError::InvalidEmotion {
                name: s.to_string(),
                expected: EMOTION_NAMES.join(", "),
            })
    }
}

impl fmt::Display for EmotionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exaggeration={:.2} cfg_weight={:.2} temperature={:.2}",
            self.exaggeration, self.cfg_weight, self.temperature
        )
    }
}
