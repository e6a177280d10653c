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

//! Token, pool, and test network operations used by a run

use alloy_primitives::{Address, TxHash, U256};
use ferry_types::MinedTransaction;
#[cfg(feature = "test-utils")]
use mockall::automock;

use super::error::ProviderResult;

/// Operations against the local test network.
///
/// Methods that change state return as soon as the node accepts the transaction.
/// Callers confirm with [`ChainProvider::wait_for_transaction`].
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait ChainProvider: Send + Sync {
    /// Address of the admin account that signs transactions
    fn admin_address(&self) -> Address;

    /// Allow the node to send transactions from `address` without its key
    async fn impersonate_account(&self, address: Address) -> ProviderResult<()>;

    /// Revoke a previous [`ChainProvider::impersonate_account`]
    async fn stop_impersonating_account(&self, address: Address) -> ProviderResult<()>;

    /// ERC-20 decimals of a token
    async fn decimals(&self, token: Address) -> ProviderResult<u8>;

    /// ERC-20 balance of `owner`
    async fn balance_of(&self, token: Address, owner: Address) -> ProviderResult<U256>;

    /// ERC-20 allowance granted by `owner` to `spender`
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ProviderResult<U256>;

    /// Transfer tokens out of an impersonated account
    async fn transfer_unlocked(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> ProviderResult<TxHash>;

    /// Transfer tokens from the admin account
    async fn transfer(&self, token: Address, to: Address, amount: U256)
        -> ProviderResult<TxHash>;

    /// Approve `spender` to pull tokens from the admin account
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> ProviderResult<TxHash>;

    /// Supply `asset` to a lending pool from the admin account
    async fn supply(
        &self,
        pool: Address,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> ProviderResult<TxHash>;

    /// Withdraw `asset` from a lending pool to `to`
    async fn withdraw(
        &self,
        pool: Address,
        asset: Address,
        amount: U256,
        to: Address,
    ) -> ProviderResult<TxHash>;

    /// Poll until a transaction is mined.
    ///
    /// Errors if it reverted or was not mined within the configured number of polls.
    async fn wait_for_transaction(&self, tx_hash: TxHash) -> ProviderResult<MinedTransaction>;
}
