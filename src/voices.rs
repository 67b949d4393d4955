use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{RenderError, Result};

/// A reference sample the model clones the speaker identity from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub file_name: String,
    pub path: PathBuf,
}

impl Voice {
    /// File name without the `.wav` suffix.
    pub fn stem(&self) -> &str {
        self.file_name
            .strip_suffix(".wav")
            .unwrap_or(&self.file_name)
    }
}

#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    dir: PathBuf,
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    /// Lists the `.wav` files directly inside `dir`, sorted by file name.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| RenderError::io(dir, e))?;

        let mut voices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RenderError::io(dir, e))?;
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                debug!("Skipping non UTF-8 file name in {}", dir.display());
                continue;
            };
            if !file_name.ends_with(".wav") {
                continue;
            }
            voices.push(Voice {
                path: entry.path(),
                file_name,
            });
        }
        voices.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!("Found {} voices in {}", voices.len(), dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            voices,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Resolves `name` as either a file name (`alice.wav`) or a stem (`alice`).
    pub fn find(&self, name: &str) -> Result<&Voice> {
        self.voices
            .iter()
            .find(|v| v.file_name == name || v.stem() == name)
            .ok_or_else(|| RenderError::InvalidVoice {
                name: name.to_string(),
                reason: format!("no such voice in {}", self.dir.display()),
            })
    }

    pub fn choose_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Voice> {
        self.voices
            .choose(rng)
            .ok_or_else(|| RenderError::InvalidVoice {
                name: "random".to_string(),
                reason: format!("no voices available in {}", self.dir.display()),
            })
    }
}
