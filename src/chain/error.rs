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

/// Error types for chain planning and assembly. A failed group never aborts
/// the batch; InvalidConfiguration is the only condition checked before any
/// group is processed.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("No member of group '{0}' could be decoded")]
    EmptyGroup(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
