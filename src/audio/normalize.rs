// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use super::decoded::DecodedAudio;
use super::error::AudioError;
use super::format::{BitDepth, TargetFormat};
use super::resample;

/// Non-fatal observations made while normalizing a sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizeReport {
    /// Number of samples that exceeded full scale and were clamped.
    pub clipped_samples: usize,
}

impl NormalizeReport {
    /// Whether any sample clipped during conversion.
    pub fn clipped(&self) -> bool {
        self.clipped_samples > 0
    }
}

/// Converts decoded audio to the target sample rate, bit depth, and channel
/// count. Pure transformation: the input is never mutated and a new
/// DecodedAudio is returned. Channel layout is converted first so the
/// resampler always runs at the target channel count.
pub fn normalize(
    audio: &DecodedAudio,
    target: &TargetFormat,
) -> Result<(DecodedAudio, NormalizeReport), AudioError> {
    // The target itself is validated at configuration time; re-check here so
    // a hand-constructed format cannot sneak past the supported set.
    let target = TargetFormat::new(target.sample_rate, target.bits_per_sample, target.channels)?;

    let frames = convert_channels(&audio.frames, audio.channels, target.channels)?;
    let frames = resample::resample(&frames, target.channels, audio.sample_rate, target.sample_rate)?;
    let (frames, report) = clamp_to_full_scale(frames);

    Ok((
        DecodedAudio::new(
            target.sample_rate,
            BitDepth::from_bits(target.bits_per_sample)?,
            target.channels,
            frames,
        ),
        report,
    ))
}

/// Converts interleaved samples between channel layouts. Mono to stereo
/// duplicates the single channel; stereo to mono averages with equal weight.
fn convert_channels(frames: &[f32], source: u16, target: u16) -> Result<Vec<f32>, AudioError> {
    if source != 1 && source != 2 {
        return Err(AudioError::UnsupportedChannelLayout(source));
    }

    match (source, target) {
        (s, t) if s == t => Ok(frames.to_vec()),
        (1, 2) => {
            let mut out = Vec::with_capacity(frames.len() * 2);
            for sample in frames {
                out.push(*sample);
                out.push(*sample);
            }
            Ok(out)
        }
        (2, 1) => {
            let mut out = Vec::with_capacity(frames.len() / 2);
            for frame in frames.chunks_exact(2) {
                out.push((frame[0] + frame[1]) * 0.5);
            }
            Ok(out)
        }
        (_, t) => Err(AudioError::UnsupportedChannelLayout(t)),
    }
}

/// Clamps samples to [-1.0, 1.0], counting how many exceeded full scale.
/// Sources that clip are still usable; the count surfaces as a warning.
fn clamp_to_full_scale(mut frames: Vec<f32>) -> (Vec<f32>, NormalizeReport) {
    let mut clipped = 0;
    for sample in frames.iter_mut() {
        if *sample > 1.0 || *sample < -1.0 {
            clipped += 1;
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
    (
        frames,
        NormalizeReport {
            clipped_samples: clipped,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(frames: Vec<f32>, sample_rate: u32) -> DecodedAudio {
        DecodedAudio::new(sample_rate, BitDepth::Pcm16, 1, frames)
    }

    fn stereo(frames: Vec<f32>, sample_rate: u32) -> DecodedAudio {
        DecodedAudio::new(sample_rate, BitDepth::Pcm16, 2, frames)
    }

    #[test]
    fn test_mono_to_stereo_duplicates() {
        let audio = mono(vec![0.1, -0.2, 0.3], 48000);
        let (result, report) = normalize(&audio, &TargetFormat::default()).unwrap();

        assert_eq!(result.channels, 2);
        assert_eq!(result.frames, vec![0.1, 0.1, -0.2, -0.2, 0.3, 0.3]);
        assert!(!report.clipped());
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        let audio = stereo(vec![1.0, 0.0, -0.5, 0.5, 0.25, 0.75], 48000);
        let target = TargetFormat::new(48000, 16, 1).unwrap();
        let (result, _) = normalize(&audio, &target).unwrap();

        assert_eq!(result.channels, 1);
        assert_eq!(result.frames, vec![0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_unchanged_format_is_identity() {
        let audio = stereo(vec![0.1, 0.2, 0.3, 0.4], 48000);
        let (result, report) = normalize(&audio, &TargetFormat::default()).unwrap();

        assert_eq!(result.frames, audio.frames);
        assert_eq!(result.sample_rate, 48000);
        assert!(!report.clipped());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let audio = mono(vec![2.0, -3.0], 48000);
        let original = audio.clone();
        let (_, report) = normalize(&audio, &TargetFormat::default()).unwrap();

        assert_eq!(audio, original);
        assert_eq!(report.clipped_samples, 4); // two frames duplicated to stereo
    }

    #[test]
    fn test_clipping_is_clamped_and_counted() {
        let audio = mono(vec![1.5, -1.5, 0.5], 48000);
        let target = TargetFormat::new(48000, 16, 1).unwrap();
        let (result, report) = normalize(&audio, &target).unwrap();

        assert_eq!(result.frames, vec![1.0, -1.0, 0.5]);
        assert_eq!(report.clipped_samples, 2);
    }

    #[test]
    fn test_resampled_frame_count() {
        let audio = mono(vec![0.0; 44100], 44100);
        let target = TargetFormat::new(48000, 16, 1).unwrap();
        let (result, _) = normalize(&audio, &target).unwrap();

        assert_eq!(result.frame_count(), 48000);
        assert_eq!(result.sample_rate, 48000);
    }

    #[test]
    fn test_too_many_source_channels_rejected() {
        let audio = DecodedAudio::new(48000, BitDepth::Pcm16, 4, vec![0.0; 8]);
        let result = normalize(&audio, &TargetFormat::default());
        assert!(matches!(
            result,
            Err(AudioError::UnsupportedChannelLayout(4))
        ));
    }

    #[test]
    fn test_unsupported_target_rejected() {
        let audio = mono(vec![0.0; 4], 48000);
        let bad = TargetFormat {
            sample_rate: 12345,
            bits_per_sample: 16,
            channels: 2,
        };
        assert!(matches!(
            normalize(&audio, &bad),
            Err(AudioError::UnsupportedSampleRate(12345))
        ));
    }

    #[test]
    fn test_target_bit_depth_recorded() {
        let audio = mono(vec![0.0; 4], 48000);
        let target = TargetFormat::new(48000, 24, 1).unwrap();
        let (result, _) = normalize(&audio, &target).unwrap();
        assert_eq!(result.bit_depth, BitDepth::Pcm24);
    }
}
