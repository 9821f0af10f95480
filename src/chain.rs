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

pub mod builder;
pub mod error;
pub mod group;
pub mod plan;
pub mod record;

pub use builder::{BuiltChain, ChainBuilder};
pub use error::ChainError;
pub use group::{group_records, SampleGroup};
pub use plan::{ChainPlan, SlotDescriptor};
pub use record::{AudioSampleRecord, HiHatRole};
