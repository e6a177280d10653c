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

use alloy_primitives::{Address, U256};
use anyhow::Context;
use ferry_provider::ChainProvider;
use ferry_types::{scale_units, RunConfig};

/// Addresses and amounts the stages work with
#[derive(Clone, Debug)]
pub struct FlowSettings {
    /// Lending pool
    pub pool: Address,
    /// Stablecoin supplied to the pool
    pub token: Address,
    /// Receipt token minted by the pool
    pub receipt_token: Address,
    /// Impersonated holder funding the admin
    pub whale: Address,
    /// Whole tokens moved from the whale to the admin
    pub fund_units: u64,
    /// Whole tokens supplied to the pool
    pub supply_units: u64,
    /// Referral code passed to `supply`
    pub referral_code: u16,
    /// Withdraw everything after a successful supply
    pub withdraw_after_supply: bool,
}

impl From<&RunConfig> for FlowSettings {
    fn from(config: &RunConfig) -> Self {
        Self {
            pool: config.pool_address,
            token: config.token_address,
            receipt_token: config.receipt_token_address,
            whale: config.whale_address,
            fund_units: config.fund_units,
            supply_units: config.supply_units,
            referral_code: config.referral_code,
            withdraw_after_supply: config.withdraw_after_supply,
        }
    }
}

/// Token decimals and the scaled supply amount
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Amounts {
    /// Stablecoin decimals
    pub decimals: u8,
    /// Receipt token decimals, used only for display
    pub receipt_decimals: u8,
    /// `supply_units` in the stablecoin's smallest unit
    pub supply: U256,
}

impl Amounts {
    /// Read the receipt token's decimals and scale the supply amount.
    pub async fn resolve<C: ChainProvider>(
        chain: &C,
        settings: &FlowSettings,
        decimals: u8,
    ) -> anyhow::Result<Self> {
        let receipt_decimals = chain
            .decimals(settings.receipt_token)
            .await
            .context("failed to read receipt token decimals")?;
        if receipt_decimals != decimals {
            tracing::warn!(
                "Receipt token has {receipt_decimals} decimals, stablecoin has {decimals}. Receipt balances are shown with {receipt_decimals}"
            );
        }

        let supply = scale_units(settings.supply_units, decimals)?;
        Ok(Self {
            decimals,
            receipt_decimals,
            supply,
        })
    }
}

#[cfg(test)]
mod tests {
    use ferry_provider::MockChainProvider;
    use ferry_types::constants::{AUSDC, USDC};
    use mockall::predicate::eq;

    use super::*;

    #[test]
    fn test_from_config() {
        let settings = FlowSettings::from(&RunConfig::default());
        assert_eq!(settings.token, USDC);
        assert_eq!(settings.receipt_token, AUSDC);
        assert_eq!(settings.supply_units, 100);
        assert!(!settings.withdraw_after_supply);
    }

    #[tokio::test]
    async fn test_receipt_decimals_read_on_chain() {
        let settings = FlowSettings::from(&RunConfig::default());
        let mut chain = MockChainProvider::default();
        chain
            .expect_decimals()
            .with(eq(AUSDC))
            .times(1)
            .returning(|_| Ok(18));

        let amounts = Amounts::resolve(&chain, &settings, 6).await.unwrap();
        assert_eq!(
            amounts,
            Amounts {
                decimals: 6,
                receipt_decimals: 18,
                supply: U256::from(100_000_000u64),
            }
        );
    }

    #[tokio::test]
    async fn test_supply_overflow_errors() {
        let settings = FlowSettings {
            supply_units: u64::MAX,
            ..FlowSettings::from(&RunConfig::default())
        };
        let mut chain = MockChainProvider::default();
        chain.expect_decimals().returning(|_| Ok(77));

        assert!(Amounts::resolve(&chain, &settings, 77).await.is_err());
    }
}
