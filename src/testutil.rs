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

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::audio::{AudioError, BitDepth, DecodedAudio, Decoder};

/// Writes a 16-bit PCM WAV file from per-channel sample vectors. All
/// channels must have the same length; samples are interleaved frame by
/// frame.
pub fn write_wav_i16(path: &Path, channels: &[Vec<i16>], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create test wav");
    let frames = channels.first().map(|c| c.len()).unwrap_or(0);
    for frame_idx in 0..frames {
        for channel in channels {
            writer
                .write_sample(channel[frame_idx])
                .expect("write test sample");
        }
    }
    writer.finalize().expect("finalize test wav");
}

/// A decoder backed by a map of registered samples. Paths that were never
/// registered fail to decode, which makes failure paths easy to exercise.
#[derive(Debug, Default)]
pub struct MemoryDecoder {
    samples: Mutex<HashMap<PathBuf, DecodedAudio>>,
}

impl MemoryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers decoded audio for a path.
    pub fn insert(&self, path: impl Into<PathBuf>, audio: DecodedAudio) {
        self.samples
            .lock()
            .expect("memory decoder lock")
            .insert(path.into(), audio);
    }

    /// Registers a mono sample where every frame has the given value.
    pub fn insert_mono_constant(&self, path: &str, value: f32, frames: usize, sample_rate: u32) {
        self.insert(
            path,
            DecodedAudio::new(sample_rate, BitDepth::Pcm16, 1, vec![value; frames]),
        );
    }

    /// Registers a stereo sample where every frame has the given value on
    /// both channels.
    pub fn insert_stereo_constant(&self, path: &str, value: f32, frames: usize, sample_rate: u32) {
        self.insert(
            path,
            DecodedAudio::new(sample_rate, BitDepth::Pcm16, 2, vec![value; frames * 2]),
        );
    }
}

impl Decoder for MemoryDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, AudioError> {
        self.samples
            .lock()
            .expect("memory decoder lock")
            .get(path)
            .cloned()
            .ok_or_else(|| {
                AudioError::Decode(
                    path.display().to_string(),
                    "no sample registered".to_string(),
                )
            })
    }
}
