//! JSON-RPC plumbing and the direct wallet client.
//!
//! [`WalletClient`] talks to a node that holds an unlocked account
//! (`eth_sendTransaction`), which is the dev-node equivalent of the browser
//! wallet connection in the original flow. Receipt waiting is a bounded
//! poll against `eth_getTransactionReceipt`.

use std::time::Duration;

use alloy_core::primitives::{Address, B256};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::calls::UserOpCall;
use crate::deployer::ChainClient;
use crate::error::{DeployError, Result};
use crate::receipt::TransactionReceipt;

/// Default timeout for a single RPC request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between receipt polling attempts.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default overall timeout when waiting for a transaction to be mined.
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Make a JSON-RPC call and deserialize the result.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await?;

    let result: Value = response.json().await?;

    if let Some(error) = result.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown");
        return Err(DeployError::Rpc(format!("{method}: {message}")));
    }

    let result_value = result
        .get("result")
        .ok_or_else(|| DeployError::Rpc(format!("{method}: no result in response")))?
        .clone();

    Ok(serde_json::from_value(result_value)?)
}

/// Fetch the chain ID reported by the node.
pub async fn chain_id(client: &reqwest::Client, url: &str) -> Result<u64> {
    let hex: String = json_rpc_call(client, url, "eth_chainId", vec![]).await?;
    parse_quantity(&hex)
}

/// Poll for a transaction receipt until the transaction is mined or the
/// timeout elapses. A pending transaction returns `null` from the node,
/// which is just another reason to keep polling.
pub async fn wait_for_receipt(
    client: &reqwest::Client,
    url: &str,
    tx_hash: B256,
    timeout_secs: u64,
) -> Result<TransactionReceipt> {
    let start = std::time::Instant::now();
    let max_duration = Duration::from_secs(timeout_secs);

    loop {
        let receipt: Option<TransactionReceipt> = json_rpc_call(
            client,
            url,
            "eth_getTransactionReceipt",
            vec![serde_json::json!(tx_hash)],
        )
        .await?;

        if let Some(receipt) = receipt {
            return Ok(receipt);
        }

        if start.elapsed() > max_duration {
            return Err(DeployError::Rpc(format!(
                "timed out after {timeout_secs}s waiting for receipt of {tx_hash}"
            )));
        }

        tracing::trace!(tx_hash = %tx_hash, "Transaction pending, polling again...");
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Parse a 0x-prefixed hex quantity.
fn parse_quantity(hex: &str) -> Result<u64> {
    u64::from_str_radix(hex.trim_start_matches("0x"), 16)
        .map_err(|_| DeployError::Rpc(format!("invalid hex quantity '{hex}'")))
}

/// A [`ChainClient`] over plain JSON-RPC with an unlocked node account.
#[derive(Debug, Clone)]
pub struct WalletClient {
    client: reqwest::Client,
    rpc_url: String,
    sender: Address,
    receipt_timeout_secs: u64,
}

impl WalletClient {
    /// Connect to a node and bind to its first unlocked account.
    ///
    /// Fails with [`DeployError::NotConnected`] when the node exposes no
    /// accounts, mirroring the missing-wallet case in the browser flow.
    pub async fn connect(rpc_url: &str, receipt_timeout_secs: u64) -> Result<Self> {
        let client = create_client()?;
        let accounts: Vec<Address> = json_rpc_call(&client, rpc_url, "eth_accounts", vec![]).await?;

        let sender = accounts.first().copied().ok_or(DeployError::NotConnected)?;
        tracing::info!(rpc_url = %rpc_url, sender = %sender, "Connected to wallet account");

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            sender,
            receipt_timeout_secs,
        })
    }

    /// Connect with an explicitly chosen sender account.
    pub fn connect_as(rpc_url: &str, sender: Address, receipt_timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            rpc_url: rpc_url.to_string(),
            sender,
            receipt_timeout_secs,
        })
    }
}

impl ChainClient for WalletClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> Result<u64> {
        chain_id(&self.client, &self.rpc_url).await
    }

    async fn submit(&self, call: &UserOpCall) -> Result<B256> {
        let mut tx = serde_json::json!({
            "from": self.sender,
            "value": format!("0x{:x}", call.value),
            "data": &call.data,
        });

        // Contract creations omit `to`; the zero-address target is only a
        // call-payload convention.
        if !call.is_creation() {
            tx["to"] = serde_json::json!(call.to);
        }

        json_rpc_call(&self.client, &self.rpc_url, "eth_sendTransaction", vec![tx]).await
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        wait_for_receipt(&self.client, &self.rpc_url, tx_hash, self.receipt_timeout_secs).await
    }
}
