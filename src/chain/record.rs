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
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::audio::{AudioError, DecodedAudio, Decoder};

/// Directory/file-name tokens marking a closed hi-hat sample.
const CLOSED_PATTERNS: [&str; 2] = ["closedhh", "closed"];

/// Directory/file-name tokens marking an open hi-hat sample.
const OPEN_PATTERNS: [&str; 2] = ["openhh", "open"];

/// Hi-hat classification of a sample, derived from its immediate parent
/// directory name and/or file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiHatRole {
    Closed,
    Open,
    None,
}

impl HiHatRole {
    /// Classifies a record. The parent directory is checked before the file
    /// name, and closed markers before open ones, so "closedhh/open_feel.wav"
    /// classifies as closed.
    pub fn of(record: &AudioSampleRecord) -> HiHatRole {
        let parent = record
            .relative_group_path()
            .last()
            .map(|s| s.to_lowercase());
        let stem = record
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        for candidate in [parent, stem].into_iter().flatten() {
            if CLOSED_PATTERNS.iter().any(|p| candidate.contains(p)) {
                return HiHatRole::Closed;
            }
            if OPEN_PATTERNS.iter().any(|p| candidate.contains(p)) {
                return HiHatRole::Open;
            }
        }

        HiHatRole::None
    }
}

/// One discovered input file. The source file is a read-only input: nothing
/// in the engine ever writes to `path`. Decoding is deferred until the
/// sample is actually needed for a chain and cached after the first use.
#[derive(Debug)]
pub struct AudioSampleRecord {
    /// The source audio file.
    path: PathBuf,
    /// Directory segments from the scan root to the file, used for grouping.
    relative_group_path: Vec<String>,
    /// File name with extension, hi-hat markers, and trailing numeric
    /// suffixes stripped; used for hi-hat pairing.
    base_name: String,
    /// Lazily decoded audio, populated on first access.
    decoded: OnceLock<DecodedAudio>,
}

impl AudioSampleRecord {
    /// Creates a new record in the undecoded state.
    pub fn new(path: PathBuf, relative_group_path: Vec<String>, base_name: String) -> Self {
        Self {
            path,
            relative_group_path,
            base_name,
            decoded: OnceLock::new(),
        }
    }

    /// The source audio file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory segments from the scan root to the file.
    pub fn relative_group_path(&self) -> &[String] {
        &self.relative_group_path
    }

    /// The base name used for hi-hat pairing.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Returns the decoded audio, decoding and caching it on first use.
    pub fn decoded(&self, decoder: &dyn Decoder) -> Result<&DecodedAudio, AudioError> {
        if let Some(decoded) = self.decoded.get() {
            return Ok(decoded);
        }
        let audio = decoder.decode(&self.path)?;
        Ok(self.decoded.get_or_init(|| audio))
    }

    /// The base key that pairs closed and open variants of one hi-hat
    /// identity: the group path minus the role-bearing leaf directory,
    /// joined with the base name.
    pub fn hihat_base_key(&self) -> String {
        let parents = match self.relative_group_path.split_last() {
            Some((_leaf, parents)) => parents,
            None => &[],
        };
        let mut key = parents.join("/");
        if !key.is_empty() {
            key.push('/');
        }
        key.push_str(&self.base_name);
        key
    }
}
