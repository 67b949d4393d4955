use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;
use tracing::{error, info};

use crate::audio::{AudioResult, write_wav};
use crate::emotion::EmotionPreset;
use crate::error::{RenderError, Result};
use crate::request::{SingleOptions, SynthesisRequest, resolve_single};
use crate::stretch::time_stretch;
use crate::tts::Synthesizer;
use crate::voices::VoiceCatalog;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    pub voice: String,
    pub emotion: String,
    #[serde(flatten)]
    pub preset: EmotionPreset,
    pub speed: f32,
    pub file: PathBuf,
    pub sample_rate: u32,
    pub samples: usize,
    pub duration_seconds: f64,
}

impl RenderOutcome {
    /// Human-readable report printed after each render.
    pub fn summary(&self) -> String {
        format!(
            "Using voice: {}\nEmotion: {} ({})\nSpeed: {}x\nSaved {:.2}s of audio to {}",
            self.voice,
            self.emotion,
            self.preset,
            self.speed,
            self.duration_seconds,
            self.file.display()
        )
    }
}

pub struct Renderer<'a, S> {
    synth: &'a S,
}

impl<'a, S: Synthesizer> Renderer<'a, S> {
    pub fn new(synth: &'a S) -> Self {
        Self { synth }
    }

    pub async fn render(&self, request: &SynthesisRequest) -> Result<RenderOutcome> {
        let preset = request.preset();
        info!(
            "Rendering '{}' with voice {} ({})",
            request.emotion, request.voice.file_name, preset
        );

        let audio = self
            .synth
            .synthesize(&request.text, &request.voice.path, &preset)
            .await?;
        info!(
            "Synthesized {:.2}s at {} Hz",
            audio.duration_seconds(),
            audio.sample_rate
        );

        let audio = if request.speed == 1.0 {
            audio
        } else {
            info!("Adjusting speed by {}x", request.speed);
            AudioResult {
                samples: time_stretch(&audio.samples, audio.sample_rate, request.speed)?,
                sample_rate: audio.sample_rate,
            }
        };

        write_wav(&request.output, &audio)?;
        info!("Wrote {}", request.output.display());

        Ok(RenderOutcome {
            voice: request.voice.file_name.clone(),
            emotion: request.emotion.name().to_string(),
            preset,
            speed: request.speed,
            file: request.output.clone(),
            sample_rate: audio.sample_rate,
            samples: audio.samples.len(),
            duration_seconds: audio.duration_seconds(),
        })
    }

    /// Resolves single-mode options and renders the result; nothing reaches
    /// the model if resolution fails.
    pub async fn render_single<R: Rng + ?Sized>(
        &self,
        catalog: &VoiceCatalog,
        options: &SingleOptions<'_>,
        rng: &mut R,
    ) -> Result<RenderOutcome> {
        let request = resolve_single(catalog, options, rng)?;
        self.render(&request).await
    }

    /// Renders requests one after another, stopping at the first failure.
    pub async fn render_batch(&self, requests: &[SynthesisRequest]) -> Result<Vec<RenderOutcome>> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for (i, request) in requests.iter().enumerate() {
            info!("Batch item {}/{}: {}", i + 1, requests.len(), request.emotion);
            match self.render(request).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("Batch aborted at '{}': {}", request.emotion, e);
                    return Err(e);
                }
            }
        }
        Ok(outcomes)
    }
}

/// Writes `manifest.json` describing each rendered clip into `dir`.
pub fn write_manifest(dir: &Path, outcomes: &[RenderOutcome]) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| RenderError::io(dir, e))?;
    let path = dir.join(MANIFEST_FILE);
    let data = serde_json::to_string_pretty(outcomes)?;
    fs::write(&path, data).map_err(|e| RenderError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::read_wav_mono;
    use crate::emotion::Emotion;
    use crate::request::resolve_batch;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::RefCell;

    /// Records every call and returns a fixed tone.
    #[derive(Default)]
    struct FakeSynth {
        calls: RefCell<Vec<(String, PathBuf, EmotionPreset)>>,
        fail_on: Option<Emotion>,
    }

    impl Synthesizer for FakeSynth {
        async fn synthesize(
            &self,
            text: &str,
            voice: &Path,
            preset: &EmotionPreset,
        ) -> Result<AudioResult> {
            self.calls
                .borrow_mut()
                .push((text.to_string(), voice.to_path_buf(), *preset));
            if self.fail_on.map(|e| e.preset()) == Some(*preset) {
                return Err(RenderError::SynthesisFailure("model crashed".to_string()));
            }
            Ok(AudioResult {
                samples: (0..24_000).map(|i| (i as f32 * 0.05).sin() * 0.3).collect(),
                sample_rate: 24_000,
            })
        }
    }

    fn voices(dir: &Path, files: &[&str]) -> VoiceCatalog {
        let voices_dir = dir.join("voices");
        fs::create_dir_all(&voices_dir).unwrap();
        for f in files {
            fs::write(voices_dir.join(f), b"").unwrap();
        }
        VoiceCatalog::scan(&voices_dir).unwrap()
    }

    #[tokio::test]
    async fn single_render_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = voices(dir.path(), &["adam.wav"]);
        let output = dir.path().join("test-2.wav");
        let request = resolve_single(
            &catalog,
            &SingleOptions {
                emotion: "dramatic",
                voice: "adam",
                text: "Today is the day.",
                output: &output,
                speed: 1.0,
            },
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();

        let synth = FakeSynth::default();
        let outcome = Renderer::new(&synth).render(&request).await.unwrap();

        let calls = synth.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Today is the day.");
        assert_eq!(calls[0].1, catalog.voices()[0].path);
        assert_eq!(calls[0].2, Emotion::Dramatic.preset());

        assert_eq!(outcome.samples, 24_000);
        assert_eq!(read_wav_mono(&output).unwrap().samples.len(), 24_000);
        assert!(outcome.summary().contains("adam.wav"));
        assert!(outcome.summary().contains("dramatic"));
    }

    #[tokio::test]
    async fn speed_adjustment_changes_length() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = voices(dir.path(), &["adam.wav"]);
        let output = dir.path().join("fast.wav");
        let request = resolve_single(
            &catalog,
            &SingleOptions {
                emotion: "happy",
                voice: "adam",
                text: "Quick now.",
                output: &output,
                speed: 2.0,
            },
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();

        let synth = FakeSynth::default();
        let outcome = Renderer::new(&synth).render(&request).await.unwrap();
        assert_eq!(outcome.samples, 12_000);
        assert_eq!(read_wav_mono(&output).unwrap().samples.len(), 12_000);
    }

    #[tokio::test]
    async fn invalid_options_never_reach_model() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = voices(dir.path(), &["adam.wav"]);
        let output = dir.path().join("x.wav");
        let synth = FakeSynth::default();
        let renderer = Renderer::new(&synth);

        let cases = [
            ("furious", "adam", 1.0),
            ("happy", "eve", 1.0),
            ("happy", "adam", 0.0),
        ];
        for (emotion, voice, speed) in cases {
            let options = SingleOptions {
                emotion,
                voice,
                text: "Hello.",
                output: &output,
                speed,
            };
            let err = renderer
                .render_single(&catalog, &options, &mut StdRng::seed_from_u64(1))
                .await
                .unwrap_err();
            match (emotion, voice) {
                ("furious", _) => assert!(matches!(err, RenderError::InvalidEmotion { .. })),
                (_, "eve") => assert!(matches!(err, RenderError::InvalidVoice { .. })),
                _ => assert!(matches!(err, RenderError::InvalidSpeed(_))),
            }
        }
        assert!(synth.calls.borrow().is_empty());
        assert!(!output.exists());

        let options = SingleOptions {
            emotion: "calm",
            voice: "adam",
            text: "Hello.",
            output: &output,
            speed: 1.0,
        };
        renderer
            .render_single(&catalog, &options, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();
        assert_eq!(synth.calls.borrow().len(), 1);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn batch_writes_one_file_per_emotion() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = voices(dir.path(), &["adam.wav", "zoe.wav"]);
        let out_dir = dir.path().join("renders");
        let requests = resolve_batch(&catalog, "zoe.wav", &out_dir, 1.0).unwrap();

        let synth = FakeSynth::default();
        let outcomes = Renderer::new(&synth).render_batch(&requests).await.unwrap();
        let manifest = write_manifest(&out_dir.join("zoe"), &outcomes).unwrap();

        assert_eq!(synth.calls.borrow().len(), Emotion::ALL.len());
        let mut written: Vec<String> = fs::read_dir(out_dir.join("zoe"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".wav"))
            .collect();
        written.sort();
        let mut expected: Vec<String> = Emotion::ALL
            .iter()
            .map(|e| format!("{}.wav", e.name()))
            .collect();
        expected.sort();
        assert_eq!(written, expected);

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(manifest).unwrap()).unwrap();
        assert_eq!(entries.len(), Emotion::ALL.len());
        assert_eq!(entries[0]["emotion"], "neutral");
        assert_eq!(entries[0]["voice"], "zoe.wav");
        assert_eq!(entries[7]["exaggeration"], 2.0);
    }

    #[tokio::test]
    async fn batch_aborts_on_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = voices(dir.path(), &["adam.wav"]);
        let out_dir = dir.path().join("renders");
        let requests = resolve_batch(&catalog, "adam", &out_dir, 1.0).unwrap();

        let synth = FakeSynth {
            fail_on: Some(Emotion::Sad),
            ..Default::default()
        };
        let err = Renderer::new(&synth)
            .render_batch(&requests)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::SynthesisFailure(_)));

        // neutral, calm, happy rendered; sad failed; nothing after it ran.
        assert_eq!(synth.calls.borrow().len(), 4);
        assert!(out_dir.join("adam").join("happy.wav").exists());
        assert!(!out_dir.join("adam").join("sad.wav").exists());
        assert!(!out_dir.join("adam").join("angry.wav").exists());
    }
}
