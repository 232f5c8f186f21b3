//! Smart-account relay client.
//!
//! Routes each deployment step's call through the backend's
//! `send-user-operation` endpoint instead of a direct wallet transaction,
//! then waits for the bundled transaction on the regular JSON-RPC endpoint.
//! The orchestrator runs unchanged over this client.

use alloy_core::primitives::{Address, B256};

use crate::api::ApiClient;
use crate::calls::UserOpCall;
use crate::deployer::ChainClient;
use crate::error::{DeployError, Result};
use crate::receipt::TransactionReceipt;
use crate::rpc;

/// A [`ChainClient`] that relays calls through a smart account.
#[derive(Debug, Clone)]
pub struct RelayClient {
    api: ApiClient,
    rpc_client: reqwest::Client,
    rpc_url: String,
    /// The smart account the user operations execute from.
    smart_account: Address,
    /// The EOA owning the smart account; used as campaign creator/owner.
    owner: Address,
    /// Network name the backend relays for (e.g. "base-sepolia").
    network: String,
    receipt_timeout_secs: u64,
}

impl RelayClient {
    pub fn new(
        api: ApiClient,
        rpc_url: &str,
        smart_account: Address,
        owner: Address,
        network: &str,
        receipt_timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api,
            rpc_client: rpc::create_client()?,
            rpc_url: rpc_url.to_string(),
            smart_account,
            owner,
            network: network.to_string(),
            receipt_timeout_secs,
        })
    }

    /// Resolve the owner's first smart account from the backend.
    ///
    /// Fails with [`DeployError::NotConnected`] when the owner has none;
    /// one has to be created first via the `create-smart-account` endpoint.
    pub async fn for_owner(
        api: ApiClient,
        rpc_url: &str,
        owner: Address,
        network: &str,
        receipt_timeout_secs: u64,
    ) -> Result<Self> {
        let accounts = api.smart_accounts(owner).await?;
        let smart_account = accounts
            .first()
            .map(|a| a.smart_account_address)
            .ok_or(DeployError::NotConnected)?;

        tracing::info!(
            owner = %owner,
            smart_account = %smart_account,
            "Resolved smart account for relayed deployment"
        );

        Self::new(api, rpc_url, smart_account, owner, network, receipt_timeout_secs)
    }

    pub fn smart_account(&self) -> Address {
        self.smart_account
    }
}

impl ChainClient for RelayClient {
    fn sender(&self) -> Address {
        self.owner
    }

    async fn chain_id(&self) -> Result<u64> {
        rpc::chain_id(&self.rpc_client, &self.rpc_url).await
    }

    async fn submit(&self, call: &UserOpCall) -> Result<B256> {
        let response = self
            .api
            .send_user_operation(self.smart_account, &self.network, std::slice::from_ref(call))
            .await?;

        tracing::debug!(user_op_hash = %response.user_op_hash, "User operation accepted");

        response.transaction_hash.ok_or_else(|| {
            DeployError::ApiRequest(format!(
                "user operation {} has no transaction hash",
                response.user_op_hash
            ))
        })
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        rpc::wait_for_receipt(
            &self.rpc_client,
            &self.rpc_url,
            tx_hash,
            self.receipt_timeout_secs,
        )
        .await
    }
}
