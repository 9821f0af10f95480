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
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio::TargetFormat;
use crate::chain::ChainError;

mod error;

pub use error::ConfigError;

/// Default maximum number of sample slots per chain.
pub const DEFAULT_MAX_SAMPLES_PER_CHAIN: usize = 32;

/// How unused slots are filled when a chain is padded up to a power of two.
#[derive(Deserialize, Clone, Copy, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingStrategy {
    /// Duplicate the final real sample into the remaining slots.
    #[default]
    RepeatLast,
    /// Fill the remaining slots with silence.
    Silence,
    /// Don't pad; chains may have a non-power-of-two slot count.
    None,
}

/// A YAML representation of the output format for assembled chains.
#[derive(Deserialize, Clone, Copy, Serialize, Debug)]
pub struct TargetConfig {
    /// Output sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    sample_rate: u32,

    /// Output bit depth.
    #[serde(default = "default_bit_depth")]
    bit_depth: u16,

    /// Output channel count.
    #[serde(default = "default_channels")]
    channels: u16,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_bit_depth() -> u16 {
    16
}

fn default_channels() -> u16 {
    2
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            bit_depth: default_bit_depth(),
            channels: default_channels(),
        }
    }
}

impl TargetConfig {
    /// Validates the configured values against the supported set.
    pub fn to_target_format(self) -> Result<TargetFormat, ConfigError> {
        Ok(TargetFormat::new(
            self.sample_rate,
            self.bit_depth,
            self.channels,
        )?)
    }
}

/// The batch configuration, loaded from a YAML file.
#[derive(Deserialize, Clone, Serialize, Debug)]
pub struct Config {
    /// The root directory to scan for audio samples.
    source: PathBuf,

    /// The directory chains and metadata are written to.
    output: PathBuf,

    /// Maximum number of slots per chain. Must be a power of two.
    #[serde(default = "default_max_samples_per_chain")]
    max_samples_per_chain: usize,

    /// The output format for assembled chains.
    #[serde(default)]
    target: TargetConfig,

    /// How unused slots are filled.
    #[serde(default)]
    padding_strategy: PaddingStrategy,

    /// Directory names excluded from the scan entirely.
    #[serde(default = "default_exclude_dirs")]
    exclude_dirs: Vec<String>,

    /// Whether to write a JSON metadata file next to each chain.
    #[serde(default = "default_metadata")]
    metadata: bool,
}

fn default_max_samples_per_chain() -> usize {
    DEFAULT_MAX_SAMPLES_PER_CHAIN
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["Loops".to_string()]
}

fn default_metadata() -> bool {
    true
}

impl Config {
    /// Parses a config from a YAML file and validates it. Validation happens
    /// here, before any scanning or group processing begins.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let config: Config = serde_yml::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_samples_per_chain == 0 || !self.max_samples_per_chain.is_power_of_two() {
            return Err(ChainError::InvalidConfiguration(format!(
                "max_samples_per_chain must be a power of two, got {}",
                self.max_samples_per_chain
            ))
            .into());
        }
        self.target.to_target_format()?;
        Ok(())
    }

    /// The root directory to scan for audio samples.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The directory chains and metadata are written to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Overrides the source directory (CLI flag).
    pub fn set_source(&mut self, source: PathBuf) {
        self.source = source;
    }

    /// Overrides the output directory (CLI flag).
    pub fn set_output(&mut self, output: PathBuf) {
        self.output = output;
    }

    /// The maximum number of slots per chain.
    pub fn max_samples_per_chain(&self) -> usize {
        self.max_samples_per_chain
    }

    /// The validated output format.
    pub fn target_format(&self) -> Result<TargetFormat, ConfigError> {
        self.target.to_target_format()
    }

    /// How unused slots are filled.
    pub fn padding_strategy(&self) -> PaddingStrategy {
        self.padding_strategy
    }

    /// Directory names excluded from the scan.
    pub fn exclude_dirs(&self) -> &[String] {
        &self.exclude_dirs
    }

    /// Whether to write JSON metadata next to each chain.
    pub fn metadata(&self) -> bool {
        self.metadata
    }
}

#[cfg(test)]
impl Config {
    /// Creates a config without going through YAML (test only).
    pub fn for_test(source: PathBuf, output: PathBuf) -> Self {
        Self {
            source,
            output,
            max_samples_per_chain: DEFAULT_MAX_SAMPLES_PER_CHAIN,
            target: TargetConfig::default(),
            padding_strategy: PaddingStrategy::default(),
            exclude_dirs: default_exclude_dirs(),
            metadata: true,
        }
    }

    /// Sets the chain limit (test only).
    pub fn set_max_samples_per_chain(&mut self, max: usize) {
        self.max_samples_per_chain = max;
    }
}
