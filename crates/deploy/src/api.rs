//! Client for the SafeCap backend HTTP API.
//!
//! All endpoints are plain JSON over POST/GET. Failures carry an `{error}`
//! body whose message is surfaced as [`DeployError::ApiRequest`]; when the
//! body is unusable the HTTP status line is used instead.

use std::time::Duration;

use alloy_core::primitives::{Address, B256};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use crate::calls::UserOpCall;
use crate::config::api_endpoint;
use crate::error::{DeployError, Result};

/// Timeout for a single backend request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A developer-controlled wallet record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<Address>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl WalletRecord {
    /// The wallet's address, whichever field the backend populated.
    pub fn any_address(&self) -> Option<Address> {
        self.wallet_address.or(self.address)
    }
}

/// A smart account owned by an EOA.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAccount {
    pub smart_account_address: Address,
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SmartAccountList {
    #[serde(default)]
    smart_accounts: Vec<SmartAccount>,
}

/// Response to a submitted user operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOpResponse {
    pub user_op_hash: String,
    /// Hash of the bundled transaction; may lag behind the user op.
    #[serde(default)]
    pub transaction_hash: Option<B256>,
}

/// Request body for one-click managed campaign creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCampaignRequest {
    pub user_id: String,
    pub name: String,
    pub description: String,
    /// Goal in ETH as a decimal string.
    pub goal: String,
}

/// A campaign managed by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCampaign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub deployment_tx_hash: Option<B256>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManagedCampaignEnvelope {
    campaign: ManagedCampaign,
}

/// Result of a managed donation transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedTxResult {
    pub transaction_hash: B256,
    pub status: String,
}

/// Deployment status of a managed campaign.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatus {
    pub status: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

/// HTTP client for the backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /api/wallet/create` - create a developer-controlled wallet.
    pub async fn create_wallet(&self, user_id: &str) -> Result<WalletRecord> {
        self.post_json(
            "api/wallet/create",
            &serde_json::json!({ "userId": user_id }),
        )
        .await
    }

    /// `GET /api/wallet/{userId}` - look up a wallet by user.
    pub async fn wallet(&self, user_id: &str) -> Result<WalletRecord> {
        self.get_json(&format!("api/wallet/{user_id}")).await
    }

    /// `POST /api/create-smart-account` - create a smart account for an owner.
    pub async fn create_smart_account(
        &self,
        owner: Address,
        network: &str,
    ) -> Result<SmartAccount> {
        self.post_json(
            "api/create-smart-account",
            &serde_json::json!({ "ownerAddress": owner, "network": network }),
        )
        .await
    }

    /// `GET /api/smart-accounts?ownerAddress=…` - list an owner's accounts.
    pub async fn smart_accounts(&self, owner: Address) -> Result<Vec<SmartAccount>> {
        let list: SmartAccountList = self
            .get_json(&format!("api/smart-accounts?ownerAddress={owner}"))
            .await?;
        Ok(list.smart_accounts)
    }

    /// `POST /api/send-user-operation` - relay calls through a smart account.
    pub async fn send_user_operation(
        &self,
        smart_account: Address,
        network: &str,
        calls: &[UserOpCall],
    ) -> Result<UserOpResponse> {
        self.post_json(
            "api/send-user-operation",
            &serde_json::json!({
                "smartAccountAddress": smart_account,
                "network": network,
                "calls": calls,
            }),
        )
        .await
    }

    /// `POST /api/oneclick-campaign` - managed-wallet campaign creation.
    pub async fn create_managed_campaign(
        &self,
        request: &ManagedCampaignRequest,
    ) -> Result<ManagedCampaign> {
        let envelope: ManagedCampaignEnvelope =
            self.post_json("api/oneclick-campaign", request).await?;
        Ok(envelope.campaign)
    }

    /// `POST /api/transaction/send` - managed donation to a campaign.
    pub async fn send_managed_transaction(
        &self,
        campaign_id: &str,
        amount: &str,
        from: &str,
    ) -> Result<ManagedTxResult> {
        self.post_json(
            "api/transaction/send",
            &serde_json::json!({
                "campaignId": campaign_id,
                "amount": amount,
                "from": from,
            }),
        )
        .await
    }

    /// `GET /api/campaign/status/{campaignId}` - campaign status lookup.
    pub async fn campaign_status(&self, campaign_id: &str) -> Result<CampaignStatus> {
        self.get_json(&format!("api/campaign/status/{campaign_id}"))
            .await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = api_endpoint(&self.base_url, path);
        tracing::debug!(url = %url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = api_endpoint(&self.base_url, path);
        tracing::debug!(url = %url, "GET");
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status.to_string());
            return Err(DeployError::ApiRequest(message));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    #[test]
    fn wallet_record_accepts_either_address_field() {
        let record: WalletRecord = serde_json::from_str(
            r#"{"userId": "user-1", "walletAddress": "0x1111111111111111111111111111111111111111"}"#,
        )
        .unwrap();
        assert_eq!(
            record.any_address().unwrap(),
            address!("1111111111111111111111111111111111111111")
        );

        let record: WalletRecord = serde_json::from_str(
            r#"{"address": "0x2222222222222222222222222222222222222222"}"#,
        )
        .unwrap();
        assert_eq!(
            record.any_address().unwrap(),
            address!("2222222222222222222222222222222222222222")
        );
    }

    #[test]
    fn smart_account_list_parses_envelope() {
        let list: SmartAccountList = serde_json::from_str(
            r#"{"smartAccounts": [
                {"smartAccountAddress": "0x3333333333333333333333333333333333333333",
                 "network": "base-sepolia"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(list.smart_accounts.len(), 1);
        assert_eq!(
            list.smart_accounts[0].network.as_deref(),
            Some("base-sepolia")
        );
    }

    #[test]
    fn user_op_response_tolerates_missing_tx_hash() {
        let response: UserOpResponse =
            serde_json::from_str(r#"{"userOpHash": "0xabc"}"#).unwrap();
        assert_eq!(response.user_op_hash, "0xabc");
        assert!(response.transaction_hash.is_none());
    }

    #[test]
    fn managed_campaign_parses_envelope() {
        let envelope: ManagedCampaignEnvelope = serde_json::from_str(
            r#"{"campaign": {"id": "c-1", "name": "Water", "status": "deploying"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.campaign.id, "c-1");
        assert_eq!(envelope.campaign.status.as_deref(), Some("deploying"));
        assert!(envelope.campaign.contract_address.is_none());
    }
}
