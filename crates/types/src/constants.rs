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

//! Compiled-in defaults for a mainnet fork running under anvil

use std::time::Duration;

use alloy_primitives::{address, Address};

/// Local anvil JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
/// Local relay (bundler) endpoint.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000/v3";
/// Path probed on the relay by default.
///
/// Empty because `DEFAULT_RELAY_URL` already ends in `/v3`. Appending `/v3` again would
/// probe `http://localhost:3000/v3/v3`.
pub const DEFAULT_PROBE_PATH: &str = "";
/// Chain ID anvil reports for a fork started with default settings.
pub const DEFAULT_CHAIN_ID: u64 = 31337;

/// Aave v3 pool on Ethereum mainnet.
pub const AAVE_V3_POOL: Address = address!("0x87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2");
/// USDC on Ethereum mainnet.
pub const USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
/// Aave v3 aUSDC on Ethereum mainnet.
pub const AUSDC: Address = address!("0x98C23E9d8f34FEFb1B7BD6a91B7FF122F4e16F5c");
/// Account holding a large USDC balance, impersonated for funding.
pub const USDC_WHALE: Address = address!("0x55FE002aefF02F77364de339a1292923A15844B8");

/// First anvil development private key. Never use outside a local test network.
pub const ANVIL_DEV_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Canonical ERC-4337 v0.7 entry point.
pub const ENTRY_POINT_V0_7: Address = address!("0x0000000071727De22E5E9d8BAf0edAc6f37da032");
/// Canonical SimpleAccountFactory for entry point v0.7.
pub const SIMPLE_ACCOUNT_FACTORY_V0_7: Address =
    address!("0x91E60e0613810449d098b0b5Ec8b51A0FE8c8985");

/// Whole tokens moved from the whale to the admin account.
pub const DEFAULT_FUND_UNITS: u64 = 1000;
/// Whole tokens supplied to the lending pool.
pub const DEFAULT_SUPPLY_UNITS: u64 = 100;

/// Timeout for the relay availability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Interval between confirmation polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Maximum confirmation polls before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u64 = 120;
