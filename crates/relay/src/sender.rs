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

//! Relay-bound transaction sender

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256};
use ferry_provider::EvmProvider;
use ferry_types::{
    user_operation::DUMMY_SIGNATURE, Call, GasFeeValues, UserOperation, UserOperationOutcome,
};
#[cfg(feature = "test-utils")]
use mockall::automock;

use crate::{Bundler, RelayError, RelayResult, SimpleSmartAccount};

/// Sends calls from the smart account through the relay
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait RelaySender: Send + Sync {
    /// Smart account the calls are executed from
    fn account_address(&self) -> Address;

    /// Fee tiers quoted by the relay
    async fn gas_fee_values(&self) -> RelayResult<GasFeeValues>;

    /// Submit `calls` as one user operation, returns the operation hash
    async fn send_calls(&self, calls: Vec<Call>) -> RelayResult<B256>;

    /// Poll until the operation is included.
    ///
    /// An included operation whose execution failed is an error.
    async fn wait_for_receipt(&self, hash: B256) -> RelayResult<UserOperationOutcome>;
}

/// [`RelaySender`] for a [`SimpleSmartAccount`] and a [`Bundler`]
pub struct SmartAccountSender<E, B> {
    account: SimpleSmartAccount<E>,
    bundler: B,
    poll_interval: Duration,
    max_poll_attempts: u64,
}

impl<E, B> SmartAccountSender<E, B> {
    /// Create a new sender
    pub fn new(
        account: SimpleSmartAccount<E>,
        bundler: B,
        poll_interval: Duration,
        max_poll_attempts: u64,
    ) -> Self {
        Self {
            account,
            bundler,
            poll_interval,
            max_poll_attempts,
        }
    }
}

#[async_trait::async_trait]
impl<E: EvmProvider, B: Bundler> RelaySender for SmartAccountSender<E, B> {
    fn account_address(&self) -> Address {
        self.account.address()
    }

    async fn gas_fee_values(&self) -> RelayResult<GasFeeValues> {
        self.bundler.gas_fee_values().await
    }

    async fn send_calls(&self, calls: Vec<Call>) -> RelayResult<B256> {
        let entry_point = self.account.entry_point();
        let fees = self.bundler.gas_fee_values().await?.standard;
        let (factory, factory_data) = self.account.factory_fields().await?;

        let mut op = UserOperation {
            sender: self.account.address(),
            nonce: self.account.nonce().await?,
            factory,
            factory_data,
            call_data: self.account.encode_calls(&calls),
            max_fee_per_gas: fees.max_fee_per_gas.to(),
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas.to(),
            signature: Bytes::from(DUMMY_SIGNATURE.to_vec()),
            ..Default::default()
        };

        let estimate = self
            .bundler
            .estimate_user_operation_gas(&op, entry_point)
            .await?;
        op.pre_verification_gas = estimate.pre_verification_gas;
        op.verification_gas_limit = estimate.verification_gas_limit;
        op.call_gas_limit = estimate.call_gas_limit;
        op.signature = self.account.sign(&op)?;

        let hash = self.bundler.send_user_operation(&op, entry_point).await?;
        tracing::debug!(
            "sent user operation {hash} with {} call(s), nonce {}",
            calls.len(),
            op.nonce
        );
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: B256) -> RelayResult<UserOperationOutcome> {
        for _ in 0..self.max_poll_attempts {
            if let Some(outcome) = self.bundler.get_user_operation_receipt(hash).await? {
                if !outcome.success {
                    return Err(RelayError::UserOperationReverted {
                        hash,
                        reason: outcome.reason,
                    });
                }
                return Ok(outcome);
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(RelayError::ReceiptTimeout(hash, self.max_poll_attempts))
    }
}
