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

//! Ferry relay
//!
//! Probes an ERC-4337 bundler and submits calls through the admin's smart account.

mod account;
pub use account::{AccountSettings, SimpleSmartAccount};

mod bundler;
#[cfg(feature = "test-utils")]
pub use bundler::MockBundler;
pub use bundler::{Bundler, RpcBundler};

mod connector;
#[cfg(feature = "test-utils")]
pub use connector::MockRelayConnector;
pub use connector::{BundlerConnector, RelayConnector, RelaySettings};

mod error;
pub use error::{RelayError, RelayResult};

mod probe;
pub use probe::{probe_relay, ProbeError, RelayStatus};

mod sender;
#[cfg(feature = "test-utils")]
pub use sender::MockRelaySender;
pub use sender::{RelaySender, SmartAccountSender};

mod types;
pub use types::GasEstimate;
