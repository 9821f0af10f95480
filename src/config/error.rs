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
use crate::audio::AudioError;
use crate::chain::ChainError;

/// Typed error for config load/validate failures so callers can distinguish
/// e.g. file-not-found from an unsupported target format without string
/// matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config read error: {0}")]
    Read(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("Invalid target format: {0}")]
    Target(#[from] AudioError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}
