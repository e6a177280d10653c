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
use alloy_signer_local::PrivateKeySigner;
use anyhow::Context;
use clap::{Args, Parser};
use ferry_flow::{FlowSettings, Runner};
use ferry_provider::{new_alloy_evm_provider, AlloyChainProvider, EvmProvider};
use ferry_relay::{BundlerConnector, RelaySettings};
use ferry_types::{constants, RunConfig};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

mod tracing;

/// Main entry point for the CLI
///
/// Parses the CLI arguments, then funds the admin account and runs the supply flow once.
pub async fn run() -> anyhow::Result<()> {
    let opt = Cli::parse();
    let _guard = tracing::configure_logging(&opt.logs)?;
    tracing::info!("Parsed CLI options: {:#?}", opt);

    let config = RunConfig::try_from(&opt.run)?;
    execute(config).await
}

async fn execute(config: RunConfig) -> anyhow::Result<()> {
    let signer: PrivateKeySigner = config
        .admin_key
        .expose_secret()
        .parse()
        .context("invalid admin key")?;
    tracing::info!("Admin EOA: {}", signer.address());

    let evm = new_alloy_evm_provider(&config.rpc_url)?;
    match evm.get_chain_id().await {
        Ok(chain_id) if chain_id != config.chain_id => tracing::warn!(
            "Node reports chain id {chain_id}, transactions are signed for {}",
            config.chain_id
        ),
        Ok(_) => {}
        Err(err) => tracing::warn!("Failed to read chain id from {}: {err}", config.rpc_url),
    }

    let chain = AlloyChainProvider::new(
        evm.clone(),
        signer.clone(),
        config.chain_id,
        config.poll_interval,
        config.max_poll_attempts,
    );
    let connector = BundlerConnector::new(evm, signer, RelaySettings::from(&config));
    let runner = Runner::new(chain, connector, FlowSettings::from(&config));

    // A failed run is reported here, only setup errors reach the exit status.
    match runner.run().await {
        Ok(summary) => tracing::info!(
            "Run completed through the {} path, stages: {:?}",
            summary.path(),
            summary.stages
        ),
        Err(err) => tracing::error!("Error: {err:#}"),
    }
    Ok(())
}

/// Connection, contract, and amount arguments
#[derive(Debug, Args)]
#[command(next_help_heading = "RUN")]
pub struct RunArgs {
    /// Local test network JSON-RPC URL
    #[arg(
        long = "rpc_url",
        name = "rpc_url",
        env = "RPC_URL",
        default_value = constants::DEFAULT_RPC_URL
    )]
    rpc_url: String,

    /// Relay (bundler) URL
    #[arg(
        long = "relay_url",
        name = "relay_url",
        env = "RELAY_URL",
        default_value = constants::DEFAULT_RELAY_URL
    )]
    relay_url: String,

    /// Paths appended to the relay URL when probing, tried in order
    #[arg(
        long = "probe_paths",
        name = "probe_paths",
        env = "PROBE_PATHS",
        value_delimiter = ',',
        default_value = constants::DEFAULT_PROBE_PATH
    )]
    probe_paths: Vec<String>,

    /// Chain ID used for signing
    #[arg(
        long = "chain_id",
        name = "chain_id",
        env = "CHAIN_ID",
        default_value = "31337"
    )]
    chain_id: u64,

    /// Lending pool address
    #[arg(
        long = "pool_address",
        name = "pool_address",
        env = "POOL_ADDRESS",
        default_value = "0x87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2"
    )]
    pool_address: Address,

    /// Stablecoin address
    #[arg(
        long = "token_address",
        name = "token_address",
        env = "TOKEN_ADDRESS",
        default_value = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
    )]
    token_address: Address,

    /// Receipt token address
    #[arg(
        long = "receipt_token_address",
        name = "receipt_token_address",
        env = "RECEIPT_TOKEN_ADDRESS",
        default_value = "0x98C23E9d8f34FEFb1B7BD6a91B7FF122F4e16F5c"
    )]
    receipt_token_address: Address,

    /// Token holder impersonated to fund the admin
    #[arg(
        long = "whale_address",
        name = "whale_address",
        env = "WHALE_ADDRESS",
        default_value = "0x55FE002aefF02F77364de339a1292923A15844B8"
    )]
    whale_address: Address,

    /// Admin private key
    #[arg(
        long = "admin_key",
        name = "admin_key",
        env = "ADMIN_KEY",
        value_parser = parse_secret,
        default_value = constants::ANVIL_DEV_KEY,
        hide_default_value = true
    )]
    admin_key: SecretString,

    /// ERC-4337 entry point
    #[arg(
        long = "entry_point",
        name = "entry_point",
        env = "ENTRY_POINT",
        default_value = "0x0000000071727De22E5E9d8BAf0edAc6f37da032"
    )]
    entry_point: Address,

    /// SimpleAccount factory
    #[arg(
        long = "account_factory",
        name = "account_factory",
        env = "ACCOUNT_FACTORY",
        default_value = "0x91E60e0613810449d098b0b5Ec8b51A0FE8c8985"
    )]
    account_factory: Address,

    /// Salt passed to the account factory
    #[arg(
        long = "account_salt",
        name = "account_salt",
        env = "ACCOUNT_SALT",
        default_value = "0"
    )]
    account_salt: U256,

    /// Whole tokens moved from the whale to the admin
    #[arg(
        long = "fund_units",
        name = "fund_units",
        env = "FUND_UNITS",
        default_value = "1000"
    )]
    fund_units: u64,

    /// Whole tokens supplied to the pool
    #[arg(
        long = "supply_units",
        name = "supply_units",
        env = "SUPPLY_UNITS",
        default_value = "100"
    )]
    supply_units: u64,

    /// Referral code passed to supply
    #[arg(
        long = "referral_code",
        name = "referral_code",
        env = "REFERRAL_CODE",
        default_value = "0"
    )]
    referral_code: u16,

    /// Relay probe timeout in milliseconds
    #[arg(
        long = "probe_timeout_millis",
        name = "probe_timeout_millis",
        env = "PROBE_TIMEOUT_MILLIS",
        default_value = "5000"
    )]
    probe_timeout_millis: u64,

    /// Interval between confirmation polls in milliseconds
    #[arg(
        long = "poll_interval_millis",
        name = "poll_interval_millis",
        env = "POLL_INTERVAL_MILLIS",
        default_value = "1000"
    )]
    poll_interval_millis: u64,

    /// Maximum confirmation polls per transaction
    #[arg(
        long = "max_poll_attempts",
        name = "max_poll_attempts",
        env = "MAX_POLL_ATTEMPTS",
        default_value = "120"
    )]
    max_poll_attempts: u64,

    /// Withdraw everything from the pool after a successful supply
    #[arg(
        long = "withdraw_after_supply",
        name = "withdraw_after_supply",
        env = "WITHDRAW_AFTER_SUPPLY",
        required = false,
        num_args = 0
    )]
    withdraw_after_supply: bool,
}

impl TryFrom<&RunArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: &RunArgs) -> Result<Self, Self::Error> {
        Url::parse(&args.rpc_url).context("invalid rpc url")?;
        Url::parse(&args.relay_url).context("invalid relay url")?;

        let mut probe_paths = args.probe_paths.clone();
        if probe_paths.is_empty() {
            probe_paths.push(constants::DEFAULT_PROBE_PATH.to_string());
        }

        let config = RunConfig {
            rpc_url: args.rpc_url.clone(),
            relay_url: args.relay_url.clone(),
            probe_paths,
            chain_id: args.chain_id,
            pool_address: args.pool_address,
            token_address: args.token_address,
            receipt_token_address: args.receipt_token_address,
            whale_address: args.whale_address,
            admin_key: args.admin_key.clone(),
            entry_point: args.entry_point,
            account_factory: args.account_factory,
            account_salt: args.account_salt,
            fund_units: args.fund_units,
            supply_units: args.supply_units,
            referral_code: args.referral_code,
            probe_timeout: Duration::from_millis(args.probe_timeout_millis),
            poll_interval: Duration::from_millis(args.poll_interval_millis),
            max_poll_attempts: args.max_poll_attempts,
            withdraw_after_supply: args.withdraw_after_supply,
        };
        config.validate()?;
        Ok(config)
    }
}

/// CLI options for logging
#[derive(Debug, Args)]
#[command(next_help_heading = "LOGS")]
pub struct LogsArgs {
    /// Log file
    ///
    /// If not provided, logs will be written to stdout
    #[arg(
        long = "log.file",
        name = "log.file",
        env = "LOG_FILE",
        default_value = None
    )]
    file: Option<String>,

    /// Log JSON
    ///
    /// If set, logs will be written in JSON format
    #[arg(
        long = "log.json",
        name = "log.json",
        env = "LOG_JSON",
        required = false,
        num_args = 0
    )]
    json: bool,
}

/// CLI options
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    run: RunArgs,

    #[clap(flatten)]
    logs: LogsArgs,
}

pub(crate) fn parse_secret(s: &str) -> Result<SecretString, String> {
    Ok(s.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> anyhow::Result<RunConfig> {
        let cli = Cli::try_parse_from(std::iter::once("ferry").chain(args.iter().copied()))?;
        RunConfig::try_from(&cli.run)
    }

    #[tokio::test]
    async fn test_failed_run_exits_cleanly() {
        // nothing listens on port 1, so funding fails and the run ends in `Failed`
        let config = RunConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        execute(config).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_admin_key_is_an_error() {
        let config = RunConfig {
            admin_key: SecretString::from("not a key".to_string()),
            ..Default::default()
        };
        let err = execute(config).await.unwrap_err();
        assert!(err.to_string().contains("invalid admin key"));
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = config(&[]).unwrap();
        let defaults = RunConfig::default();
        assert_eq!(config.rpc_url, defaults.rpc_url);
        assert_eq!(config.relay_url, defaults.relay_url);
        assert_eq!(config.probe_paths, defaults.probe_paths);
        assert_eq!(config.chain_id, defaults.chain_id);
        assert_eq!(config.pool_address, defaults.pool_address);
        assert_eq!(config.token_address, defaults.token_address);
        assert_eq!(config.receipt_token_address, defaults.receipt_token_address);
        assert_eq!(config.whale_address, defaults.whale_address);
        assert_eq!(config.entry_point, defaults.entry_point);
        assert_eq!(config.account_factory, defaults.account_factory);
        assert_eq!(config.probe_timeout, defaults.probe_timeout);
        assert_eq!(config.poll_interval, defaults.poll_interval);
        assert_eq!(config.max_poll_attempts, defaults.max_poll_attempts);
        assert_eq!(
            config.admin_key.expose_secret(),
            defaults.admin_key.expose_secret()
        );
    }

    #[test]
    fn test_probe_paths_list() {
        let config = config(&["--probe_paths", "/v3,/health"]).unwrap();
        assert_eq!(config.probe_paths, vec!["/v3", "/health"]);
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(config(&["--relay_url", "not a url"]).is_err());
    }

    #[test]
    fn test_rejects_zero_poll_attempts() {
        assert!(config(&["--max_poll_attempts", "0"]).is_err());
    }

    #[test]
    fn test_rejects_invalid_address() {
        assert!(config(&["--pool_address", "0x1234"]).is_err());
    }
}
