use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid voice '{name}': {reason}")]
    InvalidVoice { name: String, reason: String },

    #[error("invalid emotion '{name}' (expected one of: {expected})")]
    InvalidEmotion { name: String, expected: String },

    #[error("invalid speed factor {0}: must be a finite number of at least 0.05")]
    InvalidSpeed(f32),

    #[error("narration text is empty")]
    EmptyText,

    #[error("synthesis failed: {0}")]
    SynthesisFailure(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WAV error on {}: {source}", .path.display())]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("failed to encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl RenderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn wav(path: impl Into<PathBuf>, source: hound::Error) -> Self {
        RenderError::Wav {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
