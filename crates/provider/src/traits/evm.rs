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

//! Trait for interacting with chain data and contracts.

use alloy_json_rpc::{RpcParam, RpcReturn};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types_eth::{BlockId, TransactionReceipt, TransactionRequest};
#[cfg(feature = "test-utils")]
use mockall::automock;

use super::error::ProviderResult;

/// Trait for interacting with chain data and contracts.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait EvmProvider: Send + Sync {
    /// Make an arbitrary JSON RPC request to the provider
    async fn request<P, R>(&self, method: &'static str, params: P) -> ProviderResult<R>
    where
        P: RpcParam + 'static,
        R: RpcReturn;

    /// Get the chain ID reported by the node
    async fn get_chain_id(&self) -> ProviderResult<u64>;

    /// Simulate a transaction via an eth_call
    async fn call(&self, tx: &TransactionRequest, block: Option<BlockId>)
        -> ProviderResult<Bytes>;

    /// Get the code deployed at an address
    async fn get_code(&self, address: Address, block: Option<BlockId>) -> ProviderResult<Bytes>;

    /// Get the pending nonce of an address
    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64>;

    /// Get transaction receipt by hash
    async fn get_transaction_receipt(
        &self,
        tx: TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>>;

    /// Estimate the gas a transaction uses
    async fn estimate_gas(&self, tx: &TransactionRequest) -> ProviderResult<u64>;

    /// Get the legacy gas price suggested by the node
    async fn get_gas_price(&self) -> ProviderResult<u128>;

    /// Get the priority fee suggested by the node
    async fn get_max_priority_fee(&self) -> ProviderResult<u128>;

    /// Submit a signed, EIP-2718 encoded transaction
    async fn send_raw_transaction(&self, tx: Bytes) -> ProviderResult<TxHash>;
}
