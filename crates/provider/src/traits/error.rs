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

use alloy_primitives::TxHash;
use alloy_transport::TransportError;

/// Error enumeration for the Provider traits
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// JSON-RPC transport or node error
    #[error(transparent)]
    RPC(#[from] TransportError),
    /// Contract returned data that could not be decoded
    #[error("Contract Error: {0}")]
    ContractError(String),
    /// Transaction could not be built or signed
    #[error("Signing Error: {0}")]
    SigningError(String),
    /// Transaction was mined with a failed status
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    /// Transaction was not mined within the configured number of polls
    #[error("transaction {0} was not mined after {1} polls")]
    ConfirmationTimeout(TxHash, u64),
    /// Internal errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result of a provider method call
pub type ProviderResult<T> = Result<T, ProviderError>;

impl From<alloy_sol_types::Error> for ProviderError {
    fn from(value: alloy_sol_types::Error) -> Self {
        ProviderError::ContractError(value.to_string())
    }
}
