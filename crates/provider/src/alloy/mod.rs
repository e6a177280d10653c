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

use alloy_provider::{Provider as AlloyProvider, ProviderBuilder};
use alloy_rpc_client::ClientBuilder;
use alloy_transport::layers::{RetryBackoffLayer, RetryBackoffService};
use alloy_transport_http::Http;
use anyhow::Context;
use evm::AlloyEvmProvider;
use reqwest::Client;
use url::Url;

use crate::EvmProvider;

pub(crate) mod chain;
pub(crate) mod evm;

/// Create a new alloy evm provider from a given RPC URL
pub fn new_alloy_evm_provider(rpc_url: &str) -> anyhow::Result<impl EvmProvider + Clone> {
    let provider = new_alloy_provider(rpc_url)?;
    Ok(AlloyEvmProvider::new(provider))
}

/// Create a new alloy provider from a given RPC URL
pub fn new_alloy_provider(
    rpc_url: &str,
) -> anyhow::Result<impl AlloyProvider<RetryBackoffService<Http<Client>>> + Clone> {
    let url = Url::parse(rpc_url).context("invalid rpc url")?;
    // only rate limited requests are retried
    let retry_layer = RetryBackoffLayer::new(10, 500, 1_000_000);
    let client = ClientBuilder::default().layer(retry_layer).http(url);
    let provider = ProviderBuilder::new().on_client(client);
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use std::{io::Read, thread};

    use tiny_http::{Response, Server};

    use super::*;

    // Answers every JSON-RPC request with `result`, echoing the request ID.
    fn serve(result: &'static str) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body).unwrap();
                let body: serde_json::Value = serde_json::from_str(&body).unwrap();
                let response = serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": body["id"],
                    "result": result,
                });
                let _ = request.respond(Response::from_string(response.to_string()));
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(new_alloy_evm_provider("not a url").is_err());
    }

    #[tokio::test]
    async fn test_chain_id() {
        let url = serve("0x7a69");
        let provider = new_alloy_evm_provider(&url).unwrap();
        assert_eq!(provider.get_chain_id().await.unwrap(), 31337);
    }

    #[tokio::test]
    async fn test_raw_request() {
        let url = serve("0x3e8");
        let provider = new_alloy_evm_provider(&url).unwrap();
        let count: alloy_primitives::U64 = provider
            .request("eth_blockNumber", ())
            .await
            .unwrap();
        assert_eq!(count.to::<u64>(), 1000);
    }
}
