// This file is part of Ferry.
//
// Ferry is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Ferry is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Ferry.
// If not, see https://www.gnu.org/licenses/.

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Ferry common types

mod amount;
pub use amount::{display_units, scale_units, ScaleOverflow};

mod config;
pub use config::RunConfig;

pub mod constants;

mod relay;
pub use relay::{Call, GasFeeValues, GasFees, MinedTransaction, UserOperationOutcome};

mod stage;
pub use stage::{Event, Path, Stage, TransitionError};

pub mod user_operation;
pub use user_operation::{PackedUserOperation, UserOperation};
