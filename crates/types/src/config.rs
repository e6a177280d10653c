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

use std::time::Duration;

use alloy_primitives::{Address, U256};
use secrecy::SecretString;

use crate::constants::*;

/// Everything a run needs, fixed for the lifetime of the process
#[derive(Debug)]
pub struct RunConfig {
    /// Local test network JSON-RPC URL
    pub rpc_url: String,
    /// Relay (bundler) URL
    pub relay_url: String,
    /// Paths appended to `relay_url` when probing, tried in order
    pub probe_paths: Vec<String>,
    /// Chain ID used for signing
    pub chain_id: u64,
    /// Lending pool
    pub pool_address: Address,
    /// Stablecoin supplied to the pool
    pub token_address: Address,
    /// Interest-bearing token minted by the pool for `token_address`
    pub receipt_token_address: Address,
    /// Holder impersonated to fund the admin account
    pub whale_address: Address,
    /// Admin private key, owner of the smart account
    pub admin_key: SecretString,
    /// ERC-4337 entry point the relay submits to
    pub entry_point: Address,
    /// Factory deploying the admin's smart account
    pub account_factory: Address,
    /// Salt passed to the account factory
    pub account_salt: U256,
    /// Whole tokens moved from the whale to the admin
    pub fund_units: u64,
    /// Whole tokens supplied to the pool
    pub supply_units: u64,
    /// Referral code passed to `supply`
    pub referral_code: u16,
    /// Relay probe timeout
    pub probe_timeout: Duration,
    /// Interval between confirmation polls
    pub poll_interval: Duration,
    /// Maximum confirmation polls per transaction
    pub max_poll_attempts: u64,
    /// Withdraw everything from the pool after a successful supply
    pub withdraw_after_supply: bool,
}

impl RunConfig {
    /// Check the values that cannot be enforced by their types.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fund_units == 0 {
            anyhow::bail!("fund_units must be greater than zero");
        }
        if self.supply_units == 0 {
            anyhow::bail!("supply_units must be greater than zero");
        }
        if self.max_poll_attempts == 0 {
            anyhow::bail!("max_poll_attempts must be greater than zero");
        }
        if self.probe_timeout.is_zero() {
            anyhow::bail!("probe_timeout must be greater than zero");
        }
        if self.token_address == self.receipt_token_address {
            anyhow::bail!(
                "token and receipt token must differ, both are {}",
                self.token_address
            );
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            probe_paths: vec![DEFAULT_PROBE_PATH.to_string()],
            chain_id: DEFAULT_CHAIN_ID,
            pool_address: AAVE_V3_POOL,
            token_address: USDC,
            receipt_token_address: AUSDC,
            whale_address: USDC_WHALE,
            admin_key: SecretString::from(ANVIL_DEV_KEY.to_string()),
            entry_point: ENTRY_POINT_V0_7,
            account_factory: SIMPLE_ACCOUNT_FACTORY_V0_7,
            account_salt: U256::ZERO,
            fund_units: DEFAULT_FUND_UNITS,
            supply_units: DEFAULT_SUPPLY_UNITS,
            referral_code: 0,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            withdraw_after_supply: false,
        }
    }
}
