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

use std::time::Duration;

use super::format::BitDepth;

/// Raw decoded audio plus its format descriptor. Samples are interleaved f32
/// values scaled to [-1.0, 1.0]; `frames.len()` is always a multiple of
/// `channels`. Transformations return a new DecodedAudio and never mutate
/// the original.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Sample rate in Hz, always > 0.
    pub sample_rate: u32,
    /// Bit depth reported at decode time.
    pub bit_depth: BitDepth,
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Interleaved sample values.
    pub frames: Vec<f32>,
}

impl DecodedAudio {
    /// Creates a new DecodedAudio.
    pub fn new(sample_rate: u32, bit_depth: BitDepth, channels: u16, frames: Vec<f32>) -> Self {
        debug_assert!(sample_rate > 0, "sample rate must be greater than 0");
        debug_assert!(channels > 0, "channel count must be greater than 0");
        debug_assert!(
            frames.len() % channels as usize == 0,
            "interleaved length must be a multiple of the channel count"
        );
        Self {
            sample_rate,
            bit_depth,
            channels,
            frames,
        }
    }

    /// The number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.frames.len() / self.channels as usize
    }

    /// The duration of the audio.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count() {
        let audio = DecodedAudio::new(48000, BitDepth::Pcm16, 2, vec![0.0; 96000]);
        assert_eq!(audio.frame_count(), 48000);

        let mono = DecodedAudio::new(44100, BitDepth::Pcm16, 1, vec![0.0; 4410]);
        assert_eq!(mono.frame_count(), 4410);
    }

    #[test]
    fn test_duration() {
        let audio = DecodedAudio::new(48000, BitDepth::Pcm16, 2, vec![0.0; 48000]);
        assert_eq!(audio.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_empty_audio_is_valid() {
        let audio = DecodedAudio::new(48000, BitDepth::Pcm16, 2, Vec::new());
        assert_eq!(audio.frame_count(), 0);
        assert_eq!(audio.duration(), Duration::ZERO);
    }
}
