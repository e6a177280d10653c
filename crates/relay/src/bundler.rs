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

//! Bundler JSON-RPC client

use alloy_primitives::{Address, B256};
use alloy_rpc_client::{ClientBuilder, RpcClient};
use alloy_transport_http::Http;
use anyhow::Context;
use ferry_types::{GasFeeValues, UserOperation, UserOperationOutcome};
#[cfg(feature = "test-utils")]
use mockall::automock;
use reqwest::Client;
use tracing::instrument;
use url::Url;

use crate::{
    types::{RpcGasEstimate, RpcUserOperation, RpcUserOperationReceipt},
    GasEstimate, RelayResult,
};

/// ERC-4337 bundler API used by the relay sender
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait Bundler: Send + Sync {
    /// Entry points the bundler accepts operations for
    async fn supported_entry_points(&self) -> RelayResult<Vec<Address>>;

    /// Fee tiers the bundler currently accepts
    async fn gas_fee_values(&self) -> RelayResult<GasFeeValues>;

    /// Estimate gas limits for an operation signed with a dummy signature
    async fn estimate_user_operation_gas(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> RelayResult<GasEstimate>;

    /// Submit a signed operation, returns its hash
    async fn send_user_operation(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> RelayResult<B256>;

    /// Receipt of an operation, `None` until it is included
    async fn get_user_operation_receipt(
        &self,
        hash: B256,
    ) -> RelayResult<Option<UserOperationOutcome>>;
}

/// [`Bundler`] over HTTP JSON-RPC
#[derive(Debug, Clone)]
pub struct RpcBundler {
    client: RpcClient<Http<Client>>,
}

impl RpcBundler {
    /// Create a bundler client for `url`
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(url).context("invalid relay url")?;
        Ok(Self {
            client: ClientBuilder::default().http(url),
        })
    }
}

#[async_trait::async_trait]
impl Bundler for RpcBundler {
    async fn supported_entry_points(&self) -> RelayResult<Vec<Address>> {
        Ok(self
            .client
            .request_noparams("eth_supportedEntryPoints")
            .await?)
    }

    async fn gas_fee_values(&self) -> RelayResult<GasFeeValues> {
        Ok(self
            .client
            .request_noparams("biconomy_getGasFeeValues")
            .await?)
    }

    #[instrument(skip_all)]
    async fn estimate_user_operation_gas(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> RelayResult<GasEstimate> {
        let estimate: RpcGasEstimate = self
            .client
            .request(
                "eth_estimateUserOperationGas",
                (RpcUserOperation::from(op), entry_point),
            )
            .await?;
        Ok(estimate.into())
    }

    #[instrument(skip_all)]
    async fn send_user_operation(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> RelayResult<B256> {
        Ok(self
            .client
            .request(
                "eth_sendUserOperation",
                (RpcUserOperation::from(op), entry_point),
            )
            .await?)
    }

    async fn get_user_operation_receipt(
        &self,
        hash: B256,
    ) -> RelayResult<Option<UserOperationOutcome>> {
        let receipt: Option<RpcUserOperationReceipt> = self
            .client
            .request("eth_getUserOperationReceipt", (hash,))
            .await?;
        Ok(receipt.map(Into::into))
    }
}
