use std::path::PathBuf;

use clap::Parser;
use clap::builder::PossibleValuesParser;

use crate::emotion::EMOTION_NAMES;
use crate::tts::{DEFAULT_HELPER, DeviceChoice};

pub const DEFAULT_TEXT: &str = "Today is the day. I want to move like a titan at dawn, sweat like a god forging lightning. No more excuses. From now on, my mornings will be temples of discipline. I am going to work out like the gods… every damn day.";

#[derive(Parser, Debug)]
#[clap(
    name = "chatterbox-narrator",
    version,
    about = "Render narrated clips with Chatterbox TTS using emotion presets"
)]
pub struct Args {
    /// Emotion preset to render with
    #[clap(
        long,
        default_value = "neutral",
        value_parser = PossibleValuesParser::new(EMOTION_NAMES),
        conflicts_with = "batch_voice"
    )]
    pub emotion: String,

    /// Voice file name or stem from --voices-dir, or "random"
    #[clap(long, default_value = "random", conflicts_with = "batch_voice")]
    pub voice: String,

    #[clap(long, default_value = DEFAULT_TEXT, conflicts_with = "batch_voice")]
    pub text: String,

    #[clap(long, default_value = "output.wav", conflicts_with = "batch_voice")]
    pub output: PathBuf,

    /// Render every emotion preset for this voice into <out-dir>/<voice>/
    #[clap(long)]
    pub batch_voice: Option<String>,

    #[clap(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Playback speed multiplier, at least 0.05; pitch is preserved
    #[clap(long, default_value_t = 1.0)]
    pub speed: f32,

    #[clap(long, default_value = "./voices")]
    pub voices_dir: PathBuf,

    #[clap(long, value_enum, default_value_t = DeviceChoice::Auto)]
    pub device: DeviceChoice,

    /// Chatterbox helper program; the bundled one needs `pip install chatterbox-tts`
    #[clap(long, env = "CHATTERBOX_TTS_COMMAND", default_value = DEFAULT_HELPER)]
    pub tts_command: String,

    /// Extra argument placed before the generated helper flags (repeatable)
    #[clap(long = "tts-arg", allow_hyphen_values = true)]
    pub tts_args: Vec<String>,

    #[clap(long, default_value_t = 600)]
    pub timeout_secs: u64,

    #[clap(long, default_value_t = 300)]
    pub chunk_chars: usize,

    /// Seed for "random" voice selection
    #[clap(long, conflicts_with = "batch_voice")]
    pub seed: Option<u64>,

    /// List voices and emotion presets, then exit
    #[clap(long)]
    pub list: bool,
}
