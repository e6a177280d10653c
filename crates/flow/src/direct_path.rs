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

//! Supplying directly from the admin account

use alloy_primitives::U256;
use anyhow::Context;
use ferry_provider::ChainProvider;
use ferry_types::{display_units, MinedTransaction};

use crate::{Amounts, FlowSettings};

/// Result of the direct path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectReport {
    /// Admin approval of the pool
    pub approve: MinedTransaction,
    /// Admin supply to the pool
    pub supply: MinedTransaction,
    /// Remaining pool allowance after the supply, if it could be read
    pub allowance: Option<U256>,
    /// Admin receipt token balance after the supply, if it could be read
    pub receipt_balance: Option<U256>,
}

/// Approve the pool and supply from the admin account, each confirmed before the next.
pub async fn run_direct_path<C: ChainProvider>(
    chain: &C,
    settings: &FlowSettings,
    amounts: &Amounts,
) -> anyhow::Result<DirectReport> {
    let admin = chain.admin_address();

    tracing::info!("Approving pool {} to spend tokens", settings.pool);
    let tx_hash = chain
        .approve(settings.token, settings.pool, amounts.supply)
        .await
        .context("approve failed")?;
    tracing::info!("Approve transaction hash: {tx_hash}");
    let approve = chain
        .wait_for_transaction(tx_hash)
        .await
        .context("approve was not confirmed")?;

    tracing::info!(
        "Supplying {} tokens to pool",
        display_units(amounts.supply, amounts.decimals)
    );
    let tx_hash = chain
        .supply(
            settings.pool,
            settings.token,
            amounts.supply,
            admin,
            settings.referral_code,
        )
        .await
        .context("supply failed")?;
    tracing::info!("Supply transaction hash: {tx_hash}");
    let supply = chain
        .wait_for_transaction(tx_hash)
        .await
        .context("supply was not confirmed")?;

    // The supply is confirmed at this point, these reads only feed the logs.
    let allowance = match chain.allowance(settings.token, admin, settings.pool).await {
        Ok(allowance) => {
            tracing::info!(
                "Remaining pool allowance: {}",
                display_units(allowance, amounts.decimals)
            );
            Some(allowance)
        }
        Err(err) => {
            tracing::warn!("Failed to read remaining pool allowance: {err}");
            None
        }
    };
    let receipt_balance = match chain.balance_of(settings.receipt_token, admin).await {
        Ok(balance) => {
            tracing::info!(
                "Receipt token balance: {}",
                display_units(balance, amounts.receipt_decimals)
            );
            Some(balance)
        }
        Err(err) => {
            tracing::warn!("Failed to read receipt token balance: {err}");
            None
        }
    };

    Ok(DirectReport {
        approve,
        supply,
        allowance,
        receipt_balance,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use ferry_provider::{MockChainProvider, ProviderError};
    use ferry_types::scale_units;
    use mockall::{
        predicate::{always, eq},
        Sequence,
    };

    use super::*;
    use crate::test_utils::{expect_reads, mined, settings, ADMIN, HASH};

    fn amounts(decimals: u8) -> Amounts {
        Amounts {
            decimals,
            receipt_decimals: decimals,
            supply: scale_units(100, decimals).unwrap(),
        }
    }

    // Run the path and return the amount passed to `supply`.
    async fn supplied_amount(decimals: u8) -> U256 {
        let settings = settings();
        let supplied = Arc::new(Mutex::new(U256::ZERO));
        let mut chain = MockChainProvider::default();
        expect_reads(&mut chain, decimals, U256::ZERO);
        chain.expect_approve().returning(|_, _, _| Ok(HASH));
        chain
            .expect_wait_for_transaction()
            .returning(|hash| Ok(mined(hash)));
        let recorded = supplied.clone();
        chain
            .expect_supply()
            .with(
                eq(settings.pool),
                eq(settings.token),
                always(),
                eq(ADMIN),
                eq(0u16),
            )
            .returning(move |_, _, amount, _, _| {
                *recorded.lock().unwrap() = amount;
                Ok(HASH)
            });

        let report = run_direct_path(&chain, &settings, &amounts(decimals))
            .await
            .unwrap();
        assert!(report.supply.success);
        let amount = *supplied.lock().unwrap();
        amount
    }

    #[tokio::test]
    async fn test_supply_amount_six_decimals() {
        assert_eq!(supplied_amount(6).await, U256::from(100_000_000u64));
    }

    #[tokio::test]
    async fn test_supply_amount_eighteen_decimals() {
        assert_eq!(
            supplied_amount(18).await,
            U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64))
        );
    }

    #[tokio::test]
    async fn test_approve_confirmed_before_supply() {
        let settings = settings();
        let amounts = amounts(6);
        let mut seq = Sequence::new();
        let mut chain = MockChainProvider::default();
        expect_reads(&mut chain, 6, U256::from(100_000_000u64));
        chain
            .expect_approve()
            .with(eq(settings.token), eq(settings.pool), eq(amounts.supply))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(HASH));
        chain
            .expect_wait_for_transaction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|hash| Ok(mined(hash)));
        chain
            .expect_supply()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _, _| Ok(HASH));
        chain
            .expect_wait_for_transaction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|hash| Ok(mined(hash)));

        let report = run_direct_path(&chain, &settings, &amounts).await.unwrap();
        assert_eq!(report.receipt_balance, Some(U256::from(100_000_000u64)));
    }

    #[tokio::test]
    async fn test_failed_reads_after_supply_keep_report() {
        let mut chain = MockChainProvider::default();
        chain.expect_admin_address().return_const(ADMIN);
        chain.expect_approve().returning(|_, _, _| Ok(HASH));
        chain.expect_supply().returning(|_, _, _, _, _| Ok(HASH));
        chain
            .expect_wait_for_transaction()
            .times(2)
            .returning(|hash| Ok(mined(hash)));
        chain
            .expect_allowance()
            .times(1)
            .returning(|_, _, _| Err(ProviderError::ContractError("bad data".to_string())));
        chain
            .expect_balance_of()
            .times(1)
            .returning(|_, _| Err(ProviderError::ContractError("bad data".to_string())));

        let report = run_direct_path(&chain, &settings(), &amounts(6))
            .await
            .unwrap();
        assert!(report.supply.success);
        assert_eq!(report.allowance, None);
        assert_eq!(report.receipt_balance, None);
    }

    #[tokio::test]
    async fn test_supply_revert_errors() {
        let mut chain = MockChainProvider::default();
        expect_reads(&mut chain, 6, U256::ZERO);
        chain.expect_approve().returning(|_, _, _| Ok(HASH));
        chain.expect_supply().returning(|_, _, _, _, _| Ok(HASH));
        let mut seq = Sequence::new();
        chain
            .expect_wait_for_transaction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|hash| Ok(mined(hash)));
        chain
            .expect_wait_for_transaction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|hash| Err(ProviderError::Reverted(hash)));

        let err = run_direct_path(&chain, &settings(), &amounts(6))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("supply was not confirmed"));
    }
}
