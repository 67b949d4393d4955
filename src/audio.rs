use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{RenderError, Result};

/// Mono samples in `[-1, 1]` plus their sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioResult {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioResult {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Writes 32-bit float mono WAV, creating parent directories and replacing
/// any existing file.
pub fn write_wav(path: &Path, audio: &AudioResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RenderError::io(parent, e))?;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|e| RenderError::wav(path, e))?;
    for &sample in &audio.samples {
        writer
            .write_sample(sample)
            .map_err(|e| RenderError::wav(path, e))?;
    }
    writer.finalize().map_err(|e| RenderError::wav(path, e))?;
    Ok(())
}

/// Reads any PCM or float WAV and averages its channels down to mono.
pub fn read_wav_mono(path: &Path) -> Result<AudioResult> {
    let reader = WavReader::open(path).map_err(|e| RenderError::wav(path, e))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| RenderError::wav(path, e))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| RenderError::wav(path, e))?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(AudioResult {
        samples,
        sample_rate: spec.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_dirs_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adam").join("happy.wav");
        let audio = AudioResult {
            samples: vec![0.0, 0.25, -0.5, 1.0],
            sample_rate: 24_000,
        };
        write_wav(&path, &audio).unwrap();

        assert_eq!(read_wav_mono(&path).unwrap(), audio);
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let long = AudioResult {
            samples: vec![0.1; 100],
            sample_rate: 16_000,
        };
        let short = AudioResult {
            samples: vec![0.2; 10],
            sample_rate: 16_000,
        };
        write_wav(&path, &long).unwrap();
        write_wav(&path, &short).unwrap();
        assert_eq!(read_wav_mono(&path).unwrap().samples.len(), 10);
    }

    #[test]
    fn stereo_int_is_downmixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for s in [16384i16, 0, -16384, -16384] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let audio = read_wav_mono(&path).unwrap();
        assert_eq!(audio.sample_rate, 8_000);
        assert_eq!(audio.samples, vec![0.25, -0.5]);
    }

    #[test]
    fn missing_file_is_wav_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_wav_mono(&dir.path().join("nope.wav")).unwrap_err();
        assert!(matches!(err, RenderError::Wav { .. }));
    }
}
