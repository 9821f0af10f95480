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

//! Batch orchestration.
//!
//! Runs the full pipeline: scan the library, plan the groups, then build and
//! export every chain. Grouping is a single global pass; after that each
//! group is independent, so chains are built in parallel. A failed group is
//! logged and skipped, never aborting the batch.

use std::error::Error;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{error, info};

use crate::audio::{Decoder, SymphoniaDecoder};
use crate::chain::{group_records, ChainBuilder, SampleGroup};
use crate::config::{Config, PaddingStrategy};
use crate::export::ChainWriter;
use crate::scan;

/// One successfully exported chain.
#[derive(Debug)]
pub struct ChainReport {
    pub chain_key: String,
    pub slot_count: usize,
    pub output_path: PathBuf,
}

/// The outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Exported chains, in group order.
    pub chains: Vec<ChainReport>,
    /// Number of groups discovered.
    pub groups: usize,
    /// Number of groups that produced no chain.
    pub failed_groups: usize,
}

/// A chain that a group would produce, estimated without decoding.
#[derive(Debug, PartialEq, Eq)]
pub struct PlannedChain {
    pub chain_key: String,
    pub slot_count: usize,
}

/// One planned group with its estimated chains.
#[derive(Debug)]
pub struct PlannedGroup {
    pub group_key: String,
    pub member_count: usize,
    pub chains: Vec<PlannedChain>,
}

/// Runs the full batch with the symphonia decoder.
pub fn run(config: &Config) -> Result<BatchSummary, Box<dyn Error>> {
    let decoder = SymphoniaDecoder::new();
    run_with_decoder(config, &decoder)
}

/// Runs the full batch with an injected decoder.
pub fn run_with_decoder(
    config: &Config,
    decoder: &dyn Decoder,
) -> Result<BatchSummary, Box<dyn Error>> {
    let target = config.target_format()?;
    let builder = ChainBuilder::new(
        decoder,
        target,
        config.max_samples_per_chain(),
        config.padding_strategy(),
    )?;
    let writer = ChainWriter::new(config.output(), config.metadata())?;

    let records = scan::scan(config.source(), config.exclude_dirs())?;
    info!(records = records.len(), source = ?config.source(), "Discovered audio files");

    let groups = group_records(records, config.max_samples_per_chain());
    info!(groups = groups.len(), "Planned sample groups");

    // Groups share no state, so they are built concurrently. Results are
    // re-ordered by group index afterwards so the summary lists chains in
    // the grouping engine's deterministic order, not completion order.
    let mut results: Vec<(usize, Result<Vec<ChainReport>, Box<dyn Error + Send + Sync>>)> =
        groups
            .par_iter()
            .enumerate()
            .map(|(index, group)| (index, build_and_export(&builder, &writer, group)))
            .collect();
    results.sort_by_key(|(index, _)| *index);

    let mut summary = BatchSummary {
        groups: groups.len(),
        ..Default::default()
    };
    for (index, result) in results {
        match result {
            Ok(reports) => summary.chains.extend(reports),
            Err(e) => {
                error!(group = groups[index].group_key(), error = %e, "Skipping group");
                summary.failed_groups += 1;
            }
        }
    }

    info!(
        chains = summary.chains.len(),
        failed_groups = summary.failed_groups,
        "Batch complete"
    );
    Ok(summary)
}

fn build_and_export(
    builder: &ChainBuilder,
    writer: &ChainWriter,
    group: &SampleGroup,
) -> Result<Vec<ChainReport>, Box<dyn Error + Send + Sync>> {
    let mut reports = Vec::new();
    for chain in builder.build(group)? {
        let output_path = writer.write(&chain)?;
        reports.push(ChainReport {
            chain_key: chain.plan.chain_key.clone(),
            slot_count: chain.plan.slot_count(),
            output_path,
        });
    }
    Ok(reports)
}

/// Scans and groups without decoding or writing anything, reporting the
/// chains each group would produce if every member decodes.
pub fn plan(config: &Config) -> Result<Vec<PlannedGroup>, Box<dyn Error>> {
    let records = scan::scan(config.source(), config.exclude_dirs())?;
    let groups = group_records(records, config.max_samples_per_chain());

    Ok(groups
        .iter()
        .map(|group| PlannedGroup {
            group_key: group.group_key().to_string(),
            member_count: group.len(),
            chains: planned_chains(
                group.group_key(),
                group.len(),
                config.max_samples_per_chain(),
                config.padding_strategy(),
            ),
        })
        .collect())
}

/// Mirrors the builder's slot-count arithmetic for a group of n members.
fn planned_chains(
    group_key: &str,
    member_count: usize,
    max_samples_per_chain: usize,
    padding_strategy: PaddingStrategy,
) -> Vec<PlannedChain> {
    let mut chains = Vec::new();
    let mut remaining = member_count;
    let mut index = 0usize;
    while remaining > 0 {
        let members = remaining.min(max_samples_per_chain);
        let chain_key = if index == 0 {
            group_key.to_string()
        } else {
            format!("{}_{}", group_key, index + 1)
        };
        let slot_count = match padding_strategy {
            PaddingStrategy::None => members,
            _ => members
                .next_power_of_two()
                .max(2)
                .min(max_samples_per_chain),
        };
        chains.push(PlannedChain {
            chain_key,
            slot_count,
        });
        remaining -= members;
        index += 1;
    }
    chains
}
