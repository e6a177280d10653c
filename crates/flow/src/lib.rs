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

//! Ferry flow
//!
//! Funds the admin account, then supplies to the lending pool through the relay, falling
//! back to the admin account when the relay is unavailable or fails.

mod direct_path;
pub use direct_path::{run_direct_path, DirectReport};

mod funding;
pub use funding::{fund_admin, FundingReport};

mod relay_path;
pub use relay_path::{log_stranded_balances, run_relay_path, RelayReport};

mod runner;
pub use runner::{PathReport, RunSummary, Runner, WithdrawReport};

mod settings;
pub use settings::{Amounts, FlowSettings};

#[cfg(test)]
mod test_utils;
