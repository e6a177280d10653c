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

use alloy_primitives::{Address, B256};
use alloy_transport::TransportError;
use ferry_provider::ProviderError;

/// Error enumeration for relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Bundler JSON-RPC error
    #[error("bundler rpc error: {0}")]
    Rpc(#[from] TransportError),
    /// Chain provider error while building a user operation
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// User operation could not be signed
    #[error("signing error: {0}")]
    Signing(#[from] alloy_signer::Error),
    /// The bundler does not accept operations for the configured entry point
    #[error("entry point {entry_point} is not supported, bundler supports {supported:?}")]
    UnsupportedEntryPoint {
        /// Configured entry point
        entry_point: Address,
        /// Entry points reported by the bundler
        supported: Vec<Address>,
    },
    /// The user operation was included but its execution reverted
    #[error("user operation {hash} reverted: {}", reason.as_deref().unwrap_or("no reason"))]
    UserOperationReverted {
        /// User operation hash
        hash: B256,
        /// Revert reason reported by the bundler
        reason: Option<String>,
    },
    /// No receipt was found within the configured number of polls
    #[error("no receipt for user operation {0} after {1} polls")]
    ReceiptTimeout(B256, u64),
    /// Internal errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result of a relay operation
pub type RelayResult<T> = Result<T, RelayError>;
