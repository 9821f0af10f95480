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
use tracing::{info, warn};

use crate::audio::{normalize, Decoder, TargetFormat};
use crate::config::PaddingStrategy;

use super::error::ChainError;
use super::group::SampleGroup;
use super::plan::{ChainPlan, SlotDescriptor};
use super::record::AudioSampleRecord;

/// Minimum slot count of a padded chain. A single-sample group still yields
/// a sliceable two-slot chain.
const MIN_PADDED_SLOTS: usize = 2;

/// One assembled chain: the plan plus the interleaved frame buffer that an
/// exporter encodes to disk.
#[derive(Debug)]
pub struct BuiltChain {
    pub plan: ChainPlan,
    /// Interleaved samples, total_frame_count * channels values.
    pub frames: Vec<f32>,
}

/// A member that survived decode and normalization.
struct NormalizedMember<'g> {
    record: &'g AudioSampleRecord,
    /// Interleaved samples in the target format.
    frames: Vec<f32>,
    frame_count: usize,
}

/// Builds chains from sample groups: decode, normalize, pad to equal slot
/// lengths, enforce a power-of-two slot count, and concatenate.
pub struct ChainBuilder<'a> {
    decoder: &'a dyn Decoder,
    target: TargetFormat,
    max_samples_per_chain: usize,
    padding_strategy: PaddingStrategy,
}

impl<'a> ChainBuilder<'a> {
    /// Creates a new builder. The chain limit must be a power of two so the
    /// slot-count invariant holds for split chains; anything else is
    /// rejected before any group is processed.
    pub fn new(
        decoder: &'a dyn Decoder,
        target: TargetFormat,
        max_samples_per_chain: usize,
        padding_strategy: PaddingStrategy,
    ) -> Result<Self, ChainError> {
        if max_samples_per_chain == 0 || !max_samples_per_chain.is_power_of_two() {
            return Err(ChainError::InvalidConfiguration(format!(
                "max_samples_per_chain must be a power of two, got {}",
                max_samples_per_chain
            )));
        }

        Ok(Self {
            decoder,
            target,
            max_samples_per_chain,
            padding_strategy,
        })
    }

    /// Builds all chains for one group. Most groups produce exactly one
    /// chain; a group larger than the chain limit is split into consecutive
    /// chains rather than truncated.
    pub fn build(&self, group: &SampleGroup) -> Result<Vec<BuiltChain>, ChainError> {
        let members = self.normalize_members(group);
        if members.is_empty() {
            return Err(ChainError::EmptyGroup(group.group_key().to_string()));
        }

        let chunks: Vec<&[NormalizedMember]> =
            members.chunks(self.max_samples_per_chain).collect();
        if chunks.len() > 1 {
            info!(
                group = group.group_key(),
                members = members.len(),
                chains = chunks.len(),
                "Group exceeds the chain limit, splitting"
            );
        }

        let built = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                let chain_key = if index == 0 {
                    group.group_key().to_string()
                } else {
                    format!("{}_{}", group.group_key(), index + 1)
                };
                self.assemble(chain_key, chunk)
            })
            .collect();

        Ok(built)
    }

    /// Decodes and normalizes every member, dropping the ones that fail or
    /// are empty. Per-sample failures are warnings, never batch failures.
    fn normalize_members<'g>(&self, group: &'g SampleGroup) -> Vec<NormalizedMember<'g>> {
        let mut members = Vec::with_capacity(group.len());
        for record in group.members() {
            let decoded = match record.decoded(self.decoder) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(path = ?record.path(), error = %e, "Skipping sample that failed to decode");
                    continue;
                }
            };
            let (normalized, report) = match normalize(decoded, &self.target) {
                Ok(result) => result,
                Err(e) => {
                    warn!(path = ?record.path(), error = %e, "Skipping sample that failed to convert");
                    continue;
                }
            };
            if report.clipped() {
                warn!(
                    path = ?record.path(),
                    clipped_samples = report.clipped_samples,
                    "Sample exceeds full scale, output was clamped"
                );
            }
            let frame_count = normalized.frame_count();
            if frame_count == 0 {
                warn!(path = ?record.path(), "Skipping empty sample");
                continue;
            }
            members.push(NormalizedMember {
                record,
                frames: normalized.frames,
                frame_count,
            });
        }
        members
    }

    /// Assembles one chain from at most max_samples_per_chain normalized
    /// members.
    fn assemble(&self, chain_key: String, members: &[NormalizedMember]) -> BuiltChain {
        let channels = self.target.channels as usize;
        let n = members.len();

        // Slot length is the longest member; everything else is silence-padded
        // at the end so onsets stay at the slot start.
        let slot_length = members
            .iter()
            .map(|m| m.frame_count)
            .max()
            .expect("assemble requires at least one member");
        let slot_samples = slot_length * channels;

        let target_count = match self.padding_strategy {
            PaddingStrategy::None => n,
            _ => n
                .next_power_of_two()
                .max(MIN_PADDED_SLOTS)
                .min(self.max_samples_per_chain),
        };

        let mut frames = Vec::with_capacity(target_count * slot_samples);
        let mut slots = Vec::with_capacity(target_count);
        for (index, member) in members.iter().enumerate() {
            frames.extend_from_slice(&member.frames);
            frames.resize((index + 1) * slot_samples, 0.0);
            slots.push(SlotDescriptor {
                source_path: Some(member.record.path().to_path_buf()),
                is_padding_repeat: false,
                start_frame: index * slot_length,
                frame_count: slot_length,
            });
        }

        // Fill the remaining slots up to the power-of-two count. Repeat-last
        // copies the already-padded buffer of the final member; no re-decode.
        match self.padding_strategy {
            PaddingStrategy::RepeatLast => {
                let last_slot = frames[(n - 1) * slot_samples..n * slot_samples].to_vec();
                let last_path = members[n - 1].record.path().to_path_buf();
                for index in n..target_count {
                    frames.extend_from_slice(&last_slot);
                    slots.push(SlotDescriptor {
                        source_path: Some(last_path.clone()),
                        is_padding_repeat: true,
                        start_frame: index * slot_length,
                        frame_count: slot_length,
                    });
                }
            }
            PaddingStrategy::Silence => {
                for index in n..target_count {
                    frames.resize((index + 1) * slot_samples, 0.0);
                    slots.push(SlotDescriptor {
                        source_path: None,
                        is_padding_repeat: true,
                        start_frame: index * slot_length,
                        frame_count: slot_length,
                    });
                }
            }
            PaddingStrategy::None => {}
        }

        BuiltChain {
            plan: ChainPlan {
                chain_key,
                slots,
                target_format: self.target,
                total_frame_count: target_count * slot_length,
            },
            frames,
        }
    }
}
