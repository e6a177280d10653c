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

//! Probing the relay and connecting a sender to it

use std::{sync::Arc, time::Duration};

use alloy_signer_local::PrivateKeySigner;
use ferry_provider::EvmProvider;
use ferry_types::{display_units, GasFees, RunConfig};
#[cfg(feature = "test-utils")]
use mockall::automock;

use crate::{
    probe_relay, AccountSettings, Bundler, RelayError, RelayResult, RelaySender, RelayStatus,
    RpcBundler, SimpleSmartAccount, SmartAccountSender,
};

/// Probes the relay and builds a [`RelaySender`] bound to it
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait RelayConnector: Send + Sync {
    /// Check whether the relay answers. Never errors.
    async fn probe(&self) -> RelayStatus;

    /// Connect a sender for the admin's smart account
    async fn connect(&self) -> RelayResult<Arc<dyn RelaySender>>;
}

/// Relay settings taken from the run configuration
#[derive(Clone, Debug)]
pub struct RelaySettings {
    /// Relay URL, used for both probing and JSON-RPC
    pub relay_url: String,
    /// Paths appended to `relay_url` when probing
    pub probe_paths: Vec<String>,
    /// Timeout of each probe request
    pub probe_timeout: Duration,
    /// Smart account settings
    pub account: AccountSettings,
    /// Interval between receipt polls
    pub poll_interval: Duration,
    /// Maximum receipt polls per operation
    pub max_poll_attempts: u64,
}

impl From<&RunConfig> for RelaySettings {
    fn from(config: &RunConfig) -> Self {
        Self {
            relay_url: config.relay_url.clone(),
            probe_paths: config.probe_paths.clone(),
            probe_timeout: config.probe_timeout,
            account: AccountSettings {
                entry_point: config.entry_point,
                factory: config.account_factory,
                salt: config.account_salt,
                chain_id: config.chain_id,
            },
            poll_interval: config.poll_interval,
            max_poll_attempts: config.max_poll_attempts,
        }
    }
}

/// [`RelayConnector`] for an ERC-4337 bundler and a SimpleAccount
pub struct BundlerConnector<E> {
    evm: E,
    owner: PrivateKeySigner,
    settings: RelaySettings,
}

impl<E> BundlerConnector<E> {
    /// Create a new connector
    pub fn new(evm: E, owner: PrivateKeySigner, settings: RelaySettings) -> Self {
        Self {
            evm,
            owner,
            settings,
        }
    }
}

#[async_trait::async_trait]
impl<E> RelayConnector for BundlerConnector<E>
where
    E: EvmProvider + Clone + 'static,
{
    async fn probe(&self) -> RelayStatus {
        probe_relay(
            &self.settings.relay_url,
            &self.settings.probe_paths,
            self.settings.probe_timeout,
        )
        .await
    }

    async fn connect(&self) -> RelayResult<Arc<dyn RelaySender>> {
        tracing::info!("Connecting to relay at {}", self.settings.relay_url);
        let bundler = RpcBundler::new(&self.settings.relay_url)?;
        connect_sender(
            self.evm.clone(),
            self.owner.clone(),
            bundler,
            &self.settings,
        )
        .await
    }
}

async fn connect_sender<E, B>(
    evm: E,
    owner: PrivateKeySigner,
    bundler: B,
    settings: &RelaySettings,
) -> RelayResult<Arc<dyn RelaySender>>
where
    E: EvmProvider + 'static,
    B: Bundler + 'static,
{
    let entry_point = settings.account.entry_point;
    let supported = bundler.supported_entry_points().await?;
    if !supported.contains(&entry_point) {
        return Err(RelayError::UnsupportedEntryPoint {
            entry_point,
            supported,
        });
    }

    let account = SimpleSmartAccount::new(evm, owner, settings.account).await?;
    let sender = SmartAccountSender::new(
        account,
        bundler,
        settings.poll_interval,
        settings.max_poll_attempts,
    );

    let fees = sender.gas_fee_values().await?;
    tracing::info!("Fast gas fees: {}", format_fees(&fees.fast));
    tracing::info!("Standard gas fees: {}", format_fees(&fees.standard));
    tracing::info!("Slow gas fees: {}", format_fees(&fees.slow));
    tracing::info!("Smart account address: {}", sender.account_address());

    Ok(Arc::new(sender))
}

fn format_fees(fees: &GasFees) -> String {
    format!(
        "max fee {} gwei, priority fee {} gwei",
        display_units(fees.max_fee_per_gas.to(), 9),
        display_units(fees.max_priority_fee_per_gas.to(), 9)
    )
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use ferry_types::{constants::ENTRY_POINT_V0_7, GasFeeValues};

    use super::*;
    use crate::{
        account::tests::{evm, owner, ACCOUNT},
        MockBundler,
    };

    fn settings() -> RelaySettings {
        RelaySettings::from(&RunConfig::default())
    }

    #[tokio::test]
    async fn test_connect_sender() {
        let mut bundler = MockBundler::default();
        bundler
            .expect_supported_entry_points()
            .returning(|| Ok(vec![ENTRY_POINT_V0_7]));
        bundler
            .expect_gas_fee_values()
            .times(1)
            .returning(|| Ok(GasFeeValues::default()));

        let sender = connect_sender(evm(false, 0), owner(), bundler, &settings())
            .await
            .unwrap();
        assert_eq!(sender.account_address(), ACCOUNT);
    }

    #[tokio::test]
    async fn test_connect_rejects_unsupported_entry_point() {
        let mut bundler = MockBundler::default();
        bundler
            .expect_supported_entry_points()
            .returning(|| Ok(vec![Address::repeat_byte(1)]));
        bundler.expect_gas_fee_values().never();

        let err = connect_sender(evm(false, 0), owner(), bundler, &settings())
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RelayError::UnsupportedEntryPoint { entry_point, .. } if entry_point == ENTRY_POINT_V0_7
        ));
    }

    #[test]
    fn test_format_fees() {
        let fees = GasFees {
            max_fee_per_gas: alloy_primitives::U128::from(1_500_000_000u64),
            max_priority_fee_per_gas: alloy_primitives::U128::from(1_000_000_000u64),
        };
        assert_eq!(
            format_fees(&fees),
            "max fee 1.500000000 gwei, priority fee 1.000000000 gwei"
        );
    }
}
