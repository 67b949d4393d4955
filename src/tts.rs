use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use clap::ValueEnum;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::audio::{AudioResult, read_wav_mono};
use crate::emotion::EmotionPreset;
use crate::error::{RenderError, Result};
use crate::utils::chunk_text;

/// Anything that turns text plus a voice prompt into audio.
#[allow(async_fn_in_trait)]
pub trait Synthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice: &Path,
        preset: &EmotionPreset,
    ) -> Result<AudioResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Mps,
    Cuda,
    Cpu,
}

impl Device {
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Mps => "mps",
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceChoice {
    /// Apple GPU on Apple Silicon, CPU everywhere else
    Auto,
    Mps,
    Cuda,
    Cpu,
}

impl DeviceChoice {
    pub fn resolve(self) -> Device {
        match self {
            DeviceChoice::Auto => {
                if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
                    Device::Mps
                } else {
                    Device::Cpu
                }
            }
            DeviceChoice::Mps => Device::Mps,
            DeviceChoice::Cuda => Device::Cuda,
            DeviceChoice::Cpu => Device::Cpu,
        }
    }
}

/// How to reach the Chatterbox helper and where its weights should live.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub program: String,
    /// Arguments placed before the generated ones, e.g. a script path.
    pub leading_args: Vec<String>,
    /// Passed to the helper so weights are mapped onto this device.
    pub device: Device,
    pub timeout: Duration,
    pub chunk_chars: usize,
}

/// Helper bundled with the crate; run from the repository root.
pub const DEFAULT_HELPER: &str = "./scripts/chatterbox_cli.py";

/// Flags every helper must accept, in the order they are passed.
pub const HELPER_FLAGS: [&str; 6] = [
    "--device",
    "--audio-prompt",
    "--exaggeration",
    "--cfg-weight",
    "--temperature",
    "--output-file",
];

/// Chatterbox TTS driven through an external helper process.
///
/// The helper receives the narration on stdin and the generation controls as
/// [`HELPER_FLAGS`], loads the pretrained model onto `--device` and writes a
/// WAV file to `--output-file`. [`DEFAULT_HELPER`] implements this with the
/// `chatterbox-tts` Python package:
///
/// ```text
/// pip install chatterbox-tts
/// chatterbox-narrator --voice random --emotion happy
/// ```
///
/// Another helper can be plugged in with `--tts-command` and `--tts-arg`,
/// e.g. `--tts-command python3 --tts-arg /opt/tts/helper.py`.
pub struct ChatterboxTts {
    config: ModelConfig,
}

impl ChatterboxTts {
    pub fn from_pretrained(config: ModelConfig) -> Self {
        info!(
            "Using Chatterbox helper '{}' on device {}",
            config.program, config.device
        );
        Self { config }
    }

    pub fn device(&self) -> Device {
        self.config.device
    }

    async fn synthesize_chunk(
        &self,
        text: &str,
        voice: &Path,
        preset: &EmotionPreset,
    ) -> Result<AudioResult> {
        let out = tempfile::Builder::new()
            .prefix("chatterbox-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| RenderError::io(std::env::temp_dir(), e))?;
        let out_path = out.path().to_path_buf();

        let values: [OsString; 6] = [
            self.config.device.as_str().into(),
            voice.into(),
            preset.exaggeration.to_string().into(),
            preset.cfg_weight.to_string().into(),
            preset.temperature.to_string().into(),
            out_path.clone().into(),
        ];

        let mut child = Command::new(&self.config.program)
            .args(&self.config.leading_args)
            .args(HELPER_FLAGS.iter().zip(&values).flat_map(|(flag, value)| {
                [OsStr::new(flag), value.as_os_str()]
            }))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RenderError::SynthesisFailure(format!(
                    "failed to spawn '{}': {}",
                    self.config.program, e
                ))
            })?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                RenderError::SynthesisFailure("helper stdin unavailable".to_string())
            })?;
            stdin.write_all(text.as_bytes()).await.map_err(|e| {
                RenderError::SynthesisFailure(format!("failed to send text to helper: {e}"))
            })?;
        }

        let status = tokio::time::timeout(self.config.timeout, child.wait())
            .await
            .map_err(|_| {
                RenderError::SynthesisFailure(format!(
                    "helper timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            })?
            .map_err(|e| RenderError::SynthesisFailure(format!("helper wait failed: {e}")))?;

        if !status.success() {
            error!("Chatterbox helper failed for {}", voice.display());
            return Err(RenderError::SynthesisFailure(format!(
                "helper exited with {status}"
            )));
        }

        read_wav_mono(&out_path)
            .map_err(|e| RenderError::SynthesisFailure(format!("unreadable helper output: {e}")))
    }
}

impl Synthesizer for ChatterboxTts {
    async fn synthesize(
        &self,
        text: &str,
        voice: &Path,
        preset: &EmotionPreset,
    ) -> Result<AudioResult> {
        let chunks = chunk_text(text, self.config.chunk_chars);
        let mut combined: Option<AudioResult> = None;

        for (i, chunk) in chunks.iter().enumerate() {
            info!(
                "Generating chunk {}/{} ({} chars)",
                i + 1,
                chunks.len(),
                chunk.chars().count()
            );
            debug!("Chunk text: {}", chunk);
            let audio = self.synthesize_chunk(chunk, voice, preset).await?;
            combined = Some(append(combined, audio)?);
        }

        combined.ok_or_else(|| RenderError::SynthesisFailure("nothing to synthesize".to_string()))
    }
}

/// Concatenates chunk audio; every chunk must share one sample rate.
pub fn append(acc: Option<AudioResult>, next: AudioResult) -> Result<AudioResult> {
    match acc {
        None => Ok(next),
        Some(mut acc) => {
            if acc.sample_rate != next.sample_rate {
                return Err(RenderError::SynthesisFailure(format!(
                    "chunk sample rate changed from {} to {} Hz",
                    acc.sample_rate, next.sample_rate
                )));
            }
            acc.samples.extend(next.samples);
            Ok(acc)
        }
    }
}
