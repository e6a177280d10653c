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

//! Funding the admin account from an impersonated holder

use alloy_primitives::U256;
use anyhow::Context;
use ferry_provider::ChainProvider;
use ferry_types::{display_units, scale_units, MinedTransaction};

use crate::FlowSettings;

/// Result of the funding stage
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundingReport {
    /// Stablecoin decimals
    pub decimals: u8,
    /// Amount transferred, in the smallest unit
    pub amount: U256,
    /// The whale's transfer
    pub transfer: MinedTransaction,
    /// Admin stablecoin balance after the transfer
    pub admin_balance: U256,
}

/// Transfer `fund_units` of the stablecoin from the whale to the admin.
///
/// Impersonation is always revoked, also when the transfer fails.
pub async fn fund_admin<C: ChainProvider>(
    chain: &C,
    settings: &FlowSettings,
) -> anyhow::Result<FundingReport> {
    tracing::info!("Impersonating account {}", settings.whale);
    chain
        .impersonate_account(settings.whale)
        .await
        .context("failed to impersonate whale")?;

    let result = transfer_from_whale(chain, settings).await;

    tracing::info!("Stopping impersonation of {}", settings.whale);
    let stopped = chain
        .stop_impersonating_account(settings.whale)
        .await
        .context("failed to stop impersonating whale");
    match (result, stopped) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(stop_err)) => {
            tracing::warn!("{stop_err:#}");
            Err(err)
        }
    }
}

async fn transfer_from_whale<C: ChainProvider>(
    chain: &C,
    settings: &FlowSettings,
) -> anyhow::Result<FundingReport> {
    let admin = chain.admin_address();
    let decimals = chain
        .decimals(settings.token)
        .await
        .context("failed to read token decimals")?;
    tracing::info!("Token decimals: {decimals}");

    let amount = scale_units(settings.fund_units, decimals)?;
    tracing::info!(
        "Transferring {} tokens from {} to {admin}",
        display_units(amount, decimals),
        settings.whale
    );
    let tx_hash = chain
        .transfer_unlocked(settings.token, settings.whale, admin, amount)
        .await
        .context("whale transfer failed")?;
    tracing::info!("Transfer transaction hash: {tx_hash}");
    let transfer = chain
        .wait_for_transaction(tx_hash)
        .await
        .context("whale transfer was not confirmed")?;

    let admin_balance = chain.balance_of(settings.token, admin).await?;
    tracing::info!(
        "Admin token balance: {}",
        display_units(admin_balance, decimals)
    );

    Ok(FundingReport {
        decimals,
        amount,
        transfer,
        admin_balance,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use ferry_provider::{MockChainProvider, ProviderError};
    use mockall::Sequence;

    use super::*;
    use crate::test_utils::{mined, settings, ADMIN, HASH};

    // Chain whose admin balance grows with every whale transfer.
    fn funding_chain(decimals: u8) -> MockChainProvider {
        let balance = Arc::new(Mutex::new(U256::ZERO));
        let mut chain = MockChainProvider::default();
        chain.expect_admin_address().return_const(ADMIN);
        chain.expect_impersonate_account().returning(|_| Ok(()));
        chain
            .expect_stop_impersonating_account()
            .returning(|_| Ok(()));
        chain.expect_decimals().returning(move |_| Ok(decimals));
        let credited = balance.clone();
        chain
            .expect_transfer_unlocked()
            .returning(move |_, _, to, amount| {
                assert_eq!(to, ADMIN);
                *credited.lock().unwrap() += amount;
                Ok(HASH)
            });
        chain
            .expect_wait_for_transaction()
            .returning(|hash| Ok(mined(hash)));
        chain
            .expect_balance_of()
            .returning(move |_, _| Ok(*balance.lock().unwrap()));
        chain
    }

    #[tokio::test]
    async fn test_funding_credits_admin() {
        let chain = funding_chain(6);
        let report = fund_admin(&chain, &settings()).await.unwrap();
        assert_eq!(report.decimals, 6);
        assert_eq!(report.amount, U256::from(1_000_000_000u64));
        assert_eq!(report.admin_balance, U256::from(1_000_000_000u64));
        assert_eq!(report.transfer.tx_hash, HASH);
    }

    #[tokio::test]
    async fn test_funding_twice_credits_twice() {
        let chain = funding_chain(6);
        fund_admin(&chain, &settings()).await.unwrap();
        let report = fund_admin(&chain, &settings()).await.unwrap();
        assert_eq!(report.admin_balance, U256::from(2_000_000_000u64));
    }

    #[tokio::test]
    async fn test_funding_scales_by_decimals() {
        let chain = funding_chain(18);
        let report = fund_admin(&chain, &settings()).await.unwrap();
        assert_eq!(report.amount, scale_units(1000, 18).unwrap());
    }

    #[tokio::test]
    async fn test_impersonation_revoked_after_failure() {
        let mut seq = Sequence::new();
        let mut chain = MockChainProvider::default();
        chain.expect_admin_address().return_const(ADMIN);
        chain
            .expect_impersonate_account()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        chain.expect_decimals().returning(|_| Ok(6));
        chain
            .expect_transfer_unlocked()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Err(ProviderError::Reverted(HASH)));
        chain
            .expect_stop_impersonating_account()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let err = fund_admin(&chain, &settings()).await.unwrap_err();
        assert!(err.to_string().contains("whale transfer failed"));
    }

    #[tokio::test]
    async fn test_impersonation_failure_is_fatal() {
        let mut chain = MockChainProvider::default();
        chain
            .expect_impersonate_account()
            .returning(|_| Err(ProviderError::Other(anyhow::anyhow!("method not found"))));
        chain.expect_transfer_unlocked().never();
        chain.expect_stop_impersonating_account().never();

        assert!(fund_admin(&chain, &settings()).await.is_err());
    }
}
