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

use tracing::debug;

use super::record::{AudioSampleRecord, HiHatRole};

/// Group key for records sitting directly in the scan root.
const ROOT_GROUP_KEY: &str = "root";

/// A named, ordered collection of records destined for one chain. Immutable
/// after grouping; consumed exactly once by the chain builder.
#[derive(Debug)]
pub struct SampleGroup {
    /// Derived from the group path, or synthetic ("hats_N") for hi-hats.
    group_key: String,
    /// Members in slot order.
    members: Vec<AudioSampleRecord>,
}

impl SampleGroup {
    /// The key identifying this group.
    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    /// The member records in slot order.
    pub fn members(&self) -> &[AudioSampleRecord] {
        &self.members
    }

    /// The number of member records.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One hi-hat identity: all closed and open variants sharing a base key.
#[derive(Debug, Default)]
struct HiHatCluster {
    closed: Vec<AudioSampleRecord>,
    open: Vec<AudioSampleRecord>,
}

impl HiHatCluster {
    fn len(&self) -> usize {
        self.closed.len() + self.open.len()
    }

    /// Closed variants first, then open, each in discovery order.
    fn into_interleaved(self) -> Vec<AudioSampleRecord> {
        let mut records = self.closed;
        records.extend(self.open);
        records
    }
}

/// Partitions discovered records into candidate groups.
///
/// Phase 1 extracts hi-hat records, clusters them by base key, orders each
/// cluster closed-then-open, and concatenates clusters (first-seen order)
/// into "hats_N" groups of at most max_samples_per_chain records. Phase 2
/// partitions the remaining records by their exact group path, preserving
/// discovery order throughout.
pub fn group_records(
    records: Vec<AudioSampleRecord>,
    max_samples_per_chain: usize,
) -> Vec<SampleGroup> {
    let mut hihat_records = Vec::new();
    let mut regular_records = Vec::new();
    for record in records {
        match HiHatRole::of(&record) {
            HiHatRole::None => regular_records.push(record),
            role => hihat_records.push((record, role)),
        }
    }

    let mut groups = group_hihats(hihat_records, max_samples_per_chain);
    groups.extend(group_by_directory(regular_records));
    groups
}

/// Phase 1: hi-hat clustering and interleaving.
fn group_hihats(
    records: Vec<(AudioSampleRecord, HiHatRole)>,
    max_samples_per_chain: usize,
) -> Vec<SampleGroup> {
    // Cluster by base key, remembering first-seen order.
    let mut cluster_index: HashMap<String, usize> = HashMap::new();
    let mut clusters: Vec<HiHatCluster> = Vec::new();
    for (record, role) in records {
        let key = record.hihat_base_key();
        let idx = match cluster_index.get(&key) {
            Some(idx) => *idx,
            None => {
                cluster_index.insert(key, clusters.len());
                clusters.push(HiHatCluster::default());
                clusters.len() - 1
            }
        };
        match role {
            HiHatRole::Closed => clusters[idx].closed.push(record),
            HiHatRole::Open => clusters[idx].open.push(record),
            HiHatRole::None => unreachable!("phase 1 only receives hi-hat records"),
        }
    }

    // Concatenate clusters into hats_N groups. A cluster that would push the
    // current group past the chain limit starts the next group; clusters
    // themselves are never split here (oversized groups are split by the
    // builder).
    let mut groups: Vec<SampleGroup> = Vec::new();
    let mut hats_counter = 1usize;
    let mut current: Vec<AudioSampleRecord> = Vec::new();
    for cluster in clusters {
        if !current.is_empty() && current.len() + cluster.len() > max_samples_per_chain {
            groups.push(SampleGroup {
                group_key: format!("hats_{}", hats_counter),
                members: std::mem::take(&mut current),
            });
            hats_counter += 1;
        }
        current.extend(cluster.into_interleaved());
    }
    if !current.is_empty() {
        groups.push(SampleGroup {
            group_key: format!("hats_{}", hats_counter),
            members: current,
        });
    }

    debug!(groups = groups.len(), "Hi-hat grouping complete");
    groups
}

/// Phase 2: partition by exact group path, in first-seen order.
fn group_by_directory(records: Vec<AudioSampleRecord>) -> Vec<SampleGroup> {
    let mut path_index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<SampleGroup> = Vec::new();
    for record in records {
        let path = record.relative_group_path().to_vec();
        let idx = match path_index.get(&path) {
            Some(idx) => *idx,
            None => {
                let group_key = if path.is_empty() {
                    ROOT_GROUP_KEY.to_string()
                } else {
                    path.join("/")
                };
                path_index.insert(path, groups.len());
                groups.push(SampleGroup {
                    group_key,
                    members: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[idx].members.push(record);
    }
    groups
}
