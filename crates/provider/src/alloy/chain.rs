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

use alloy_eips::eip2718::Encodable2718;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, TxHash, U256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use ferry_contracts::{
    erc20::IERC20::{allowanceCall, approveCall, balanceOfCall, decimalsCall, transferCall},
    pool::IPool::{supplyCall, withdrawCall},
};
use ferry_types::MinedTransaction;
use tracing::instrument;

use crate::{ChainProvider, EvmProvider, ProviderError, ProviderResult};

/// [`ChainProvider`] that signs with a local admin key and talks to the node through an
/// [`EvmProvider`]
pub struct AlloyChainProvider<E> {
    evm: E,
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    chain_id: u64,
    poll_interval: Duration,
    max_poll_attempts: u64,
}

impl<E> AlloyChainProvider<E> {
    /// Create a new `AlloyChainProvider`
    pub fn new(
        evm: E,
        signer: PrivateKeySigner,
        chain_id: u64,
        poll_interval: Duration,
        max_poll_attempts: u64,
    ) -> Self {
        let wallet = EthereumWallet::from(signer.clone());
        Self {
            evm,
            signer,
            wallet,
            chain_id,
            poll_interval,
            max_poll_attempts,
        }
    }

    /// The underlying evm provider
    pub fn evm(&self) -> &E {
        &self.evm
    }
}

impl<E: EvmProvider> AlloyChainProvider<E> {
    async fn read<C: SolCall + Send + Sync>(
        &self,
        to: Address,
        call: C,
    ) -> ProviderResult<C::Return> {
        let tx = TransactionRequest::default().with_to(to).with_call(&call);
        let data = self.evm.call(&tx, None).await?;
        Ok(C::abi_decode_returns(&data, true)?)
    }

    async fn send_signed<C: SolCall + Send + Sync>(
        &self,
        to: Address,
        call: C,
    ) -> ProviderResult<TxHash> {
        let from = self.signer.address();
        let nonce = self.evm.get_transaction_count(from).await?;
        let priority_fee = self.evm.get_max_priority_fee().await?;
        let gas_price = self.evm.get_gas_price().await?;
        // headroom for base fee growth while the transaction is pending
        let max_fee_per_gas = gas_price.saturating_mul(2).saturating_add(priority_fee);

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_call(&call);
        let gas_limit = self.evm.estimate_gas(&tx).await?;

        let tx = tx
            .with_chain_id(self.chain_id)
            .with_nonce(nonce)
            .with_max_fee_per_gas(max_fee_per_gas)
            .with_max_priority_fee_per_gas(priority_fee)
            .with_gas_limit(gas_limit)
            .build(&self.wallet)
            .await
            .map_err(|e| ProviderError::SigningError(e.to_string()))?;

        let mut raw_tx = vec![];
        tx.encode_2718(&mut raw_tx);
        self.evm.send_raw_transaction(raw_tx.into()).await
    }
}

#[async_trait::async_trait]
impl<E: EvmProvider> ChainProvider for AlloyChainProvider<E> {
    fn admin_address(&self) -> Address {
        self.signer.address()
    }

    #[instrument(skip(self))]
    async fn impersonate_account(&self, address: Address) -> ProviderResult<()> {
        self.evm
            .request::<_, ()>("anvil_impersonateAccount", (address,))
            .await
    }

    #[instrument(skip(self))]
    async fn stop_impersonating_account(&self, address: Address) -> ProviderResult<()> {
        self.evm
            .request::<_, ()>("anvil_stopImpersonatingAccount", (address,))
            .await
    }

    async fn decimals(&self, token: Address) -> ProviderResult<u8> {
        Ok(self.read(token, decimalsCall {}).await?.decimals)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> ProviderResult<U256> {
        Ok(self
            .read(token, balanceOfCall { owner })
            .await?
            .balance)
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ProviderResult<U256> {
        Ok(self
            .read(token, allowanceCall { owner, spender })
            .await?
            .remaining)
    }

    #[instrument(skip(self))]
    async fn transfer_unlocked(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> ProviderResult<TxHash> {
        // the node signs for impersonated accounts
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(token)
            .with_call(&transferCall { to, amount });
        self.evm.request("eth_sendTransaction", (tx,)).await
    }

    #[instrument(skip(self))]
    async fn transfer(&self, token: Address, to: Address, amount: U256) -> ProviderResult<TxHash> {
        self.send_signed(token, transferCall { to, amount }).await
    }

    #[instrument(skip(self))]
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> ProviderResult<TxHash> {
        self.send_signed(token, approveCall { spender, amount }).await
    }

    #[instrument(skip(self))]
    async fn supply(
        &self,
        pool: Address,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> ProviderResult<TxHash> {
        self.send_signed(
            pool,
            supplyCall {
                asset,
                amount,
                onBehalfOf: on_behalf_of,
                referralCode: referral_code,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn withdraw(
        &self,
        pool: Address,
        asset: Address,
        amount: U256,
        to: Address,
    ) -> ProviderResult<TxHash> {
        self.send_signed(pool, withdrawCall { asset, amount, to })
            .await
    }

    #[instrument(skip(self))]
    async fn wait_for_transaction(&self, tx_hash: TxHash) -> ProviderResult<MinedTransaction> {
        for _ in 0..self.max_poll_attempts {
            if let Some(receipt) = self.evm.get_transaction_receipt(tx_hash).await? {
                let mined = MinedTransaction {
                    tx_hash,
                    block_number: receipt.block_number,
                    success: receipt.status(),
                };
                if !mined.success {
                    return Err(ProviderError::Reverted(tx_hash));
                }
                tracing::debug!("transaction {tx_hash} mined in block {:?}", mined.block_number);
                return Ok(mined);
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(ProviderError::ConfirmationTimeout(
            tx_hash,
            self.max_poll_attempts,
        ))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, Bytes};
    use alloy_rpc_types_eth::TransactionReceipt;
    use alloy_sol_types::SolValue;
    use ferry_types::constants::ANVIL_DEV_KEY;

    use super::*;
    use crate::MockEvmProvider;

    const TOKEN: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    const WHALE: Address = address!("0x55FE002aefF02F77364de339a1292923A15844B8");
    const HASH: TxHash =
        b256!("0x2a4b1e5f6a2d0f4fb0e3b1d1f5f4a0d2c8f9b7d6e5c4b3a2918070605040302a");

    fn provider(evm: MockEvmProvider) -> AlloyChainProvider<MockEvmProvider> {
        let signer: PrivateKeySigner = ANVIL_DEV_KEY.parse().unwrap();
        AlloyChainProvider::new(evm, signer, 31337, Duration::ZERO, 3)
    }

    #[tokio::test]
    async fn test_decimals() {
        let mut evm = MockEvmProvider::default();
        evm.expect_call()
            .withf(|tx, block| tx.to == Some(TOKEN.into()) && block.is_none())
            .returning(|_, _| Ok(Bytes::from(U256::from(6).abi_encode())));

        assert_eq!(provider(evm).decimals(TOKEN).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_balance_of_bad_return_data() {
        let mut evm = MockEvmProvider::default();
        evm.expect_call().returning(|_, _| Ok(Bytes::new()));

        let err = provider(evm)
            .balance_of(TOKEN, WHALE)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ContractError(_)));
    }

    #[tokio::test]
    async fn test_impersonate_account() {
        let mut evm = MockEvmProvider::default();
        evm.expect_request::<(Address,), ()>()
            .withf(|method, params| method == "anvil_impersonateAccount" && params.0 == WHALE)
            .times(1)
            .returning(|_, _| Ok(()));

        provider(evm).impersonate_account(WHALE).await.unwrap();
    }

    #[tokio::test]
    async fn test_transfer_unlocked_sends_from_holder() {
        let admin: PrivateKeySigner = ANVIL_DEV_KEY.parse().unwrap();
        let admin = admin.address();
        let mut evm = MockEvmProvider::default();
        evm.expect_request::<(TransactionRequest,), TxHash>()
            .withf(|method, params| {
                method == "eth_sendTransaction"
                    && params.0.from == Some(WHALE)
                    && params.0.to == Some(TOKEN.into())
            })
            .times(1)
            .returning(|_, _| Ok(HASH));

        let hash = provider(evm)
            .transfer_unlocked(TOKEN, WHALE, admin, U256::from(1_000_000_000u64))
            .await
            .unwrap();
        assert_eq!(hash, HASH);
    }

    #[tokio::test]
    async fn test_approve_sends_signed_eip1559() {
        let mut evm = MockEvmProvider::default();
        evm.expect_get_transaction_count().returning(|_| Ok(4));
        evm.expect_get_max_priority_fee()
            .returning(|| Ok(1_000_000_000));
        evm.expect_get_gas_price().returning(|| Ok(2_000_000_000));
        evm.expect_estimate_gas().returning(|_| Ok(60_000));
        evm.expect_send_raw_transaction()
            .withf(|raw| raw.first() == Some(&0x02))
            .times(1)
            .returning(|_| Ok(HASH));

        let hash = provider(evm)
            .approve(TOKEN, WHALE, U256::from(100))
            .await
            .unwrap();
        assert_eq!(hash, HASH);
    }

    fn receipt(status: &str) -> TransactionReceipt {
        serde_json::from_value(serde_json::json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0xea60",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": HASH,
            "transactionIndex": "0x0",
            "blockHash": HASH,
            "blockNumber": "0x10",
            "gasUsed": "0xea60",
            "effectiveGasPrice": "0x3b9aca00",
            "from": WHALE,
            "to": TOKEN,
            "contractAddress": null
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_wait_reads_receipt_status() {
        let mut evm = MockEvmProvider::default();
        let mut seq = mockall::Sequence::new();
        evm.expect_get_transaction_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        evm.expect_get_transaction_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(receipt("0x1"))));

        let mined = provider(evm).wait_for_transaction(HASH).await.unwrap();
        assert!(mined.success);
        assert_eq!(mined.block_number, Some(16));
    }

    #[tokio::test]
    async fn test_wait_reverted() {
        let mut evm = MockEvmProvider::default();
        evm.expect_get_transaction_receipt()
            .times(1)
            .returning(|_| Ok(Some(receipt("0x0"))));

        let err = provider(evm).wait_for_transaction(HASH).await.unwrap_err();
        assert!(matches!(err, ProviderError::Reverted(hash) if hash == HASH));
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let mut evm = MockEvmProvider::default();
        evm.expect_get_transaction_receipt()
            .times(3)
            .returning(|_| Ok(None));

        let err = provider(evm).wait_for_transaction(HASH).await.unwrap_err();
        assert!(matches!(err, ProviderError::ConfirmationTimeout(hash, 3) if hash == HASH));
    }
}
