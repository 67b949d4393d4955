//! Pitch-preserving time stretch.
//!
//! A classic phase vocoder: the signal is cut into Hann-windowed STFT frames,
//! the frames are resampled in time at fractional steps of `speed` with
//! magnitudes interpolated and phases accumulated from the measured
//! instantaneous frequency, and the result is overlap-added back together.

use std::f32::consts::PI;

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use tracing::debug;

use crate::error::{RenderError, Result};

const N_FFT: usize = 2048;
const HOP: usize = N_FFT / 4;

/// Slowest accepted factor; a 20x stretch already outgrows any narration.
pub const MIN_SPEED: f32 = 0.05;

pub fn validate_speed(speed: f32) -> Result<()> {
    if speed.is_finite() && speed >= MIN_SPEED {
        Ok(())
    } else {
        Err(RenderError::InvalidSpeed(speed))
    }
}

/// Stretches `samples` so playback takes `1 / speed` of the original time.
///
/// `speed > 1` shortens the clip, `speed < 1` lengthens it and `1.0` returns
/// the input untouched. The output always has `round(len / speed)` samples.
pub fn time_stretch(samples: &[f32], sample_rate: u32, speed: f32) -> Result<Vec<f32>> {
    validate_speed(speed)?;
    if speed == 1.0 {
        return Ok(samples.to_vec());
    }

    let target_len = (samples.len() as f64 / speed as f64).round() as usize;
    if samples.is_empty() || target_len == 0 {
        return Ok(Vec::new());
    }

    debug!(
        "Time-stretching {} samples at {} Hz by {:.3} -> {} samples",
        samples.len(),
        sample_rate,
        speed,
        target_len
    );

    let window = hann_window(N_FFT);
    let spectrogram = stft(samples, &window);
    let stretched = phase_vocoder(&spectrogram, speed as f64);
    let mut out = istft(&stretched, &window);
    out.resize(target_len, 0.0);
    Ok(out)
}

/// Periodic Hann window.
fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / len as f32).cos())
        .collect()
}

/// Centered STFT; each frame keeps the `N_FFT / 2 + 1` non-negative bins.
fn stft(samples: &[f32], window: &[f32]) -> Vec<Vec<Complex<f32>>> {
    let pad = N_FFT / 2;
    let mut padded = vec![0.0f32; pad];
    padded.extend_from_slice(samples);
    padded.resize(padded.len() + pad, 0.0);

    let n_frames = 1 + padded.len().saturating_sub(N_FFT).div_ceil(HOP);
    padded.resize((n_frames - 1) * HOP + N_FFT, 0.0);

    let fft = FftPlanner::<f32>::new().plan_fft_forward(N_FFT);
    let bins = N_FFT / 2 + 1;
    let mut buffer = vec![Complex::new(0.0, 0.0); N_FFT];

    (0..n_frames)
        .map(|t| {
            let start = t * HOP;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + i] * window[i], 0.0);
            }
            fft.process(&mut buffer);
            buffer[..bins].to_vec()
        })
        .collect()
}

fn phase_vocoder(frames: &[Vec<Complex<f32>>], rate: f64) -> Vec<Vec<Complex<f32>>> {
    let bins = frames[0].len();
    let expected_advance: Vec<f32> = (0..bins)
        .map(|k| 2.0 * PI * HOP as f32 * k as f32 / N_FFT as f32)
        .collect();
    let silent = vec![Complex::new(0.0, 0.0); bins];

    let mut phase: Vec<f32> = frames[0].iter().map(|c| c.arg()).collect();
    let mut out = Vec::new();
    let mut step = 0.0f64;

    while step < frames.len() as f64 {
        let t = step.floor() as usize;
        let alpha = (step - t as f64) as f32;
        let left = &frames[t];
        let right = frames.get(t + 1).unwrap_or(&silent);

        let frame = (0..bins)
            .map(|k| {
                let mag = (1.0 - alpha) * left[k].norm() + alpha * right[k].norm();
                Complex::from_polar(mag, phase[k])
            })
            .collect();
        out.push(frame);

        for k in 0..bins {
            let delta = right[k].arg() - left[k].arg() - expected_advance[k];
            let wrapped = delta - 2.0 * PI * (delta / (2.0 * PI)).round();
            phase[k] += expected_advance[k] + wrapped;
        }
        step += rate;
    }
    out
}

/// Inverse of [`stft`]: overlap-add normalized by the summed squared window,
/// with the centering pad removed.
fn istft(frames: &[Vec<Complex<f32>>], window: &[f32]) -> Vec<f32> {
    let ifft = FftPlanner::<f32>::new().plan_fft_inverse(N_FFT);
    let total = (frames.len().saturating_sub(1)) * HOP + N_FFT;
    let mut signal = vec![0.0f32; total];
    let mut norm = vec![0.0f32; total];
    let mut buffer = vec![Complex::new(0.0, 0.0); N_FFT];

    for (t, frame) in frames.iter().enumerate() {
        let bins = frame.len();
        buffer[..bins].copy_from_slice(frame);
        for k in bins..N_FFT {
            buffer[k] = frame[N_FFT - k].conj();
        }
        ifft.process(&mut buffer);

        let start = t * HOP;
        for i in 0..N_FFT {
            let w = window[i];
            signal[start + i] += buffer[i].re / N_FFT as f32 * w;
            norm[start + i] += w * w;
        }
    }

    for (s, n) in signal.iter_mut().zip(&norm) {
        if *n > 1e-6 {
            *s /= *n;
        }
    }

    let pad = N_FFT / 2;
    if signal.len() > pad {
        signal.drain(..pad);
    } else {
        signal.clear();
    }
    signal
}
