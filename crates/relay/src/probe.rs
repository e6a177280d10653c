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

//! Relay availability probe

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

/// Why a probe attempt did not reach a healthy relay
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// No response within the probe timeout
    #[error("timed out")]
    Timeout,
    /// Nothing is listening at the relay address
    #[error("connection refused")]
    ConnectionRefused,
    /// The relay answered with a non-2xx status
    #[error("returned status {0}")]
    HttpStatus(u16),
    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_connect() {
            ProbeError::ConnectionRefused
        } else if let Some(status) = err.status() {
            ProbeError::HttpStatus(status.as_u16())
        } else {
            ProbeError::Other(err.to_string())
        }
    }
}

/// Result of probing the relay
#[derive(Clone, Debug, PartialEq)]
pub enum RelayStatus {
    /// A probe path answered with a 2xx status
    Available {
        /// Path that answered
        endpoint: String,
        /// Full URL that answered
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, parsed as JSON when possible
        response: Value,
    },
    /// Every probe path failed, holds the last failure
    Unavailable(ProbeError),
}

impl RelayStatus {
    /// True if the relay answered
    pub fn is_available(&self) -> bool {
        matches!(self, RelayStatus::Available { .. })
    }
}

/// Probe `base_url` joined with each of `paths` in order.
///
/// The first 2xx response wins. Failures are logged and never returned as errors.
pub async fn probe_relay(base_url: &str, paths: &[String], timeout: Duration) -> RelayStatus {
    let client = match Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(err) => return RelayStatus::Unavailable(ProbeError::Other(err.to_string())),
    };

    tracing::info!("Checking relay status at {base_url}");
    let mut last_error = ProbeError::Other("no probe paths configured".to_string());
    for path in paths {
        let url = format!("{base_url}{path}");
        match probe_once(&client, &url).await {
            Ok((status, response)) => {
                tracing::info!("Relay endpoint {url} is available, status {status}");
                return RelayStatus::Available {
                    endpoint: path.clone(),
                    url,
                    status,
                    response,
                };
            }
            Err(err) => {
                tracing::warn!("Relay endpoint {url} {err}");
                last_error = err;
            }
        }
    }

    tracing::warn!("No relay endpoints are available");
    RelayStatus::Unavailable(last_error)
}

async fn probe_once(client: &Client, url: &str) -> Result<(u16, Value), ProbeError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    let response = serde_json::from_str(&body).unwrap_or(Value::String(body));
    Ok((status, response))
}
