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

//! Chain export.
//!
//! Encodes assembled chains as PCM WAV files and optionally writes a JSON
//! metadata file next to each one. Everything in the metadata is derived
//! from the ChainPlan.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::audio::TargetFormat;
use crate::chain::{BuiltChain, ChainPlan};

/// Error types for chain export. Fatal for one chain, never for the batch.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("WAV encode error: {0}")]
    WavError(#[from] hound::Error),

    #[error("Metadata encode error: {0}")]
    MetadataError(#[from] serde_json::Error),
}

/// Writes assembled chains and their metadata to the output directory.
pub struct ChainWriter {
    output_dir: PathBuf,
    write_metadata: bool,
}

impl ChainWriter {
    /// Creates a writer, creating the output directory if needed.
    pub fn new(output_dir: &Path, write_metadata: bool) -> Result<Self, ExportError> {
        fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            write_metadata,
        })
    }

    /// Writes one chain as a WAV file (plus metadata) and returns the WAV
    /// path. The file name encodes the chain key, slot count, and per-slot
    /// duration.
    pub fn write(&self, chain: &BuiltChain) -> Result<PathBuf, ExportError> {
        let stem = chain_file_stem(&chain.plan);
        let wav_path = self.output_dir.join(format!("{}.wav", stem));

        write_wav(&wav_path, &chain.frames, &chain.plan.target_format)?;

        if self.write_metadata {
            let metadata_path = self.output_dir.join(format!("{}.json", stem));
            let metadata = ChainMetadata::from_plan(&chain.plan);
            serde_json::to_writer_pretty(File::create(&metadata_path)?, &metadata)?;
        }

        info!(
            chain = chain.plan.chain_key,
            slots = chain.plan.slot_count(),
            path = ?wav_path,
            "Chain written"
        );
        Ok(wav_path)
    }
}

/// File stem for a chain: the key with path separators flattened, the slot
/// count, and the per-slot duration in seconds.
fn chain_file_stem(plan: &ChainPlan) -> String {
    let slot_seconds = plan.slot_length() as f64 / plan.target_format.sample_rate as f64;
    format!(
        "{}-{}-{:.3}s",
        plan.chain_key.replace('/', "-"),
        plan.slot_count(),
        slot_seconds
    )
}

/// Encodes interleaved f32 samples as integer PCM. Quantization is
/// deterministic: clamp to full scale, scale, round half away from zero.
fn write_wav(path: &Path, frames: &[f32], format: &TargetFormat) -> Result<(), ExportError> {
    let spec = hound::WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    match format.bits_per_sample {
        16 => {
            for sample in frames {
                writer.write_sample(quantize(*sample, 16) as i16)?;
            }
        }
        // Target formats are validated to 16 or 24 bits at configuration
        // time.
        _ => {
            for sample in frames {
                writer.write_sample(quantize(*sample, 24))?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Quantizes a [-1.0, 1.0] sample to a signed integer of the given width.
pub(crate) fn quantize(sample: f32, bits: u16) -> i32 {
    let max = ((1i64 << (bits - 1)) - 1) as f32;
    (sample.clamp(-1.0, 1.0) * max).round() as i32
}

/// JSON metadata describing one exported chain.
#[derive(Debug, Serialize)]
pub struct ChainMetadata {
    chain_key: String,
    sample_rate: u32,
    bit_depth: u16,
    channels: u16,
    slot_count: usize,
    slot_frames: usize,
    total_frames: usize,
    slots: Vec<SlotMetadata>,
}

/// JSON metadata for one slot of a chain.
#[derive(Debug, Serialize)]
pub struct SlotMetadata {
    /// Source file name; absent for inserted-silence slots.
    source_file: Option<String>,
    is_padding_repeat: bool,
    start_frame: usize,
    frame_count: usize,
    start_seconds: f64,
    duration_seconds: f64,
}

impl ChainMetadata {
    /// Derives the metadata from a chain plan.
    pub fn from_plan(plan: &ChainPlan) -> Self {
        let sample_rate = plan.target_format.sample_rate;
        let slots = plan
            .slots
            .iter()
            .map(|slot| SlotMetadata {
                source_file: slot.source_path.as_ref().map(|p| p.display().to_string()),
                is_padding_repeat: slot.is_padding_repeat,
                start_frame: slot.start_frame,
                frame_count: slot.frame_count,
                start_seconds: slot.start_frame as f64 / sample_rate as f64,
                duration_seconds: slot.frame_count as f64 / sample_rate as f64,
            })
            .collect();

        Self {
            chain_key: plan.chain_key.clone(),
            sample_rate,
            bit_depth: plan.target_format.bits_per_sample,
            channels: plan.target_format.channels,
            slot_count: plan.slot_count(),
            slot_frames: plan.slot_length(),
            total_frames: plan.total_frame_count,
            slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::SlotDescriptor;

    fn test_plan() -> ChainPlan {
        ChainPlan {
            chain_key: "kit/kick".to_string(),
            slots: vec![
                SlotDescriptor {
                    source_path: Some(PathBuf::from("kit/kick/kick1.wav")),
                    is_padding_repeat: false,
                    start_frame: 0,
                    frame_count: 24000,
                },
                SlotDescriptor {
                    source_path: Some(PathBuf::from("kit/kick/kick1.wav")),
                    is_padding_repeat: true,
                    start_frame: 24000,
                    frame_count: 24000,
                },
            ],
            target_format: TargetFormat::default(),
            total_frame_count: 48000,
        }
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0.0, 16), 0);
        assert_eq!(quantize(1.0, 16), 32767);
        assert_eq!(quantize(-1.0, 16), -32767);
        assert_eq!(quantize(2.0, 16), 32767);
        assert_eq!(quantize(0.5, 16), 16384);
        assert_eq!(quantize(1.0, 24), 8388607);
    }

    #[test]
    fn test_chain_file_stem() {
        assert_eq!(chain_file_stem(&test_plan()), "kit-kick-2-0.500s");
    }

    #[test]
    fn test_written_wav_matches_target_format() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ChainWriter::new(dir.path(), false).unwrap();

        let chain = BuiltChain {
            plan: test_plan(),
            frames: vec![0.25; 48000 * 2],
        };
        let path = writer.write(&chain).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.len(), 48000 * 2);
    }

    #[test]
    fn test_written_samples_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ChainWriter::new(dir.path(), false).unwrap();

        let mut plan = test_plan();
        plan.slots.truncate(1);
        plan.slots[0].frame_count = 2;
        plan.total_frame_count = 2;
        let chain = BuiltChain {
            plan,
            frames: vec![0.5, -0.5, 1.0, -1.0],
        };
        let path = writer.write(&chain).unwrap();

        let samples: Vec<i16> = hound::WavReader::open(&path)
            .unwrap()
            .samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples, vec![16384, -16384, 32767, -32767]);
    }

    #[test]
    fn test_metadata_is_derived_from_plan() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ChainWriter::new(dir.path(), true).unwrap();

        let chain = BuiltChain {
            plan: test_plan(),
            frames: vec![0.0; 48000 * 2],
        };
        writer.write(&chain).unwrap();

        let metadata_path = dir.path().join("kit-kick-2-0.500s.json");
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(metadata_path).unwrap()).unwrap();

        assert_eq!(value["chain_key"], "kit/kick");
        assert_eq!(value["sample_rate"], 48000);
        assert_eq!(value["bit_depth"], 16);
        assert_eq!(value["channels"], 2);
        assert_eq!(value["slot_count"], 2);
        assert_eq!(value["slot_frames"], 24000);
        assert_eq!(value["total_frames"], 48000);

        let slots = value["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0]["is_padding_repeat"], false);
        assert_eq!(slots[1]["is_padding_repeat"], true);
        assert_eq!(slots[1]["start_frame"], 24000);
        assert_eq!(slots[1]["start_seconds"], 0.5);
    }

    #[test]
    fn test_no_metadata_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ChainWriter::new(dir.path(), false).unwrap();

        let chain = BuiltChain {
            plan: test_plan(),
            frames: vec![0.0; 48000 * 2],
        };
        writer.write(&chain).unwrap();

        assert!(!dir.path().join("kit-kick-2-0.500s.json").exists());
    }

    #[test]
    fn test_24_bit_export() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ChainWriter::new(dir.path(), false).unwrap();

        let mut plan = test_plan();
        plan.target_format = TargetFormat::new(48000, 24, 2).unwrap();
        let chain = BuiltChain {
            plan,
            frames: vec![1.0; 8],
        };
        let path = writer.write(&chain).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 24);
        let samples: Vec<i32> = reader.into_samples::<i32>().map(|s| s.unwrap()).collect();
        assert!(samples.iter().all(|s| *s == 8388607));
    }
}
