use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::info;

use crate::emotion::{Emotion, EmotionPreset};
use crate::error::{RenderError, Result};
use crate::stretch::validate_speed;
use crate::utils::normalize_text;
use crate::voices::{Voice, VoiceCatalog};

/// Voice name that asks for a uniformly random pick from the catalog.
pub const RANDOM_VOICE: &str = "random";

/// One output file's worth of work.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: Voice,
    pub emotion: Emotion,
    pub speed: f32,
    pub output: PathBuf,
}

impl SynthesisRequest {
    pub fn preset(&self) -> EmotionPreset {
        self.emotion.preset()
    }
}

#[derive(Debug, Clone)]
pub struct SingleOptions<'a> {
    pub emotion: &'a str,
    pub voice: &'a str,
    pub text: &'a str,
    pub output: &'a Path,
    pub speed: f32,
}

pub fn resolve_single<R: Rng + ?Sized>(
    catalog: &VoiceCatalog,
    options: &SingleOptions<'_>,
    rng: &mut R,
) -> Result<SynthesisRequest> {
    let emotion: Emotion = options.emotion.parse()?;
    validate_speed(options.speed)?;

    let text = normalize_text(options.text);
    if text.is_empty() {
        return Err(RenderError::EmptyText);
    }

    let voice = if options.voice == RANDOM_VOICE {
        let voice = catalog.choose_random(rng)?;
        info!("Randomly selected voice {}", voice.file_name);
        voice
    } else {
        catalog.find(options.voice)?
    };

    Ok(SynthesisRequest {
        text,
        voice: voice.clone(),
        emotion,
        speed: options.speed,
        output: options.output.to_path_buf(),
    })
}

/// One request per emotion preset, written to `<out_dir>/<voice>/<emotion>.wav`.
pub fn resolve_batch(
    catalog: &VoiceCatalog,
    voice_name: &str,
    out_dir: &Path,
    speed: f32,
) -> Result<Vec<SynthesisRequest>> {
    validate_speed(speed)?;
    let voice = catalog.find(voice_name)?;
    let voice_dir = batch_dir(out_dir, voice);

    Ok(Emotion::ALL
        .into_iter()
        .map(|emotion| SynthesisRequest {
            text: batch_narration(voice.stem(), emotion),
            voice: voice.clone(),
            emotion,
            speed,
            output: voice_dir.join(format!("{}.wav", emotion.name())),
        })
        .collect())
}

pub fn batch_dir(out_dir: &Path, voice: &Voice) -> PathBuf {
    out_dir.join(voice.stem())
}

pub fn batch_narration(voice: &str, emotion: Emotion) -> String {
    format!(
        "Hi, my name is {voice}. This is how I sound when I am feeling {emotion}. \
         Every word you hear right now was generated with the {emotion} preset."
    )
}
