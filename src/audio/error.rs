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

/// Error types for decoding and format conversion. Per-sample failures are
/// absorbed at the chain builder boundary; only configuration-level failures
/// propagate further.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Decode failed for {0}: {1}")]
    Decode(String, String),

    #[error("Unsupported sample rate: {0}Hz")]
    UnsupportedSampleRate(u32),

    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("Unsupported channel layout: {0} channels")]
    UnsupportedChannelLayout(u16),

    #[error("Resampling failed: {0}Hz -> {1}Hz")]
    ResamplingFailed(u32, u32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
