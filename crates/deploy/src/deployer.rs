//! The five-step deployment orchestrator.
//!
//! The factory and NFT contracts reference each other: the factory needs
//! the NFT address and the NFT needs the factory address to authorize
//! minting. The cycle is broken with a two-pass factory deployment: a
//! disposable factory goes first (zero-address NFT reference), the NFT is
//! bound to it, the real factory is bound to the NFT, and the NFT is then
//! re-pointed at the real factory before the campaign is created.
//!
//! Steps run strictly one at a time; each step's call is only built after
//! the previous step's transaction is mined, because it needs the address
//! that transaction produced. A failure freezes the state at the failing
//! step: nothing is retried and nothing already on-chain is undone.

use alloy_core::primitives::{Address, B256};
use chrono::Utc;
use serde::Serialize;

use crate::artifacts::Artifacts;
use crate::calls::{self, UserOpCall};
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::metadata::{self, CampaignDetails};
use crate::receipt::{TransactionReceipt, extract_deployed_address};

/// Where the deployment sequence currently stands.
///
/// Strictly ordered; the orchestrator never skips a step and never
/// re-enters one once it has advanced past it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum DeploymentStep {
    #[default]
    NotStarted,
    DeployingTempFactory,
    DeployingNft,
    DeployingFinalFactory,
    UpdatingNft,
    CreatingCampaign,
    Completed,
}

/// Observable state of a deployment run.
///
/// Mutated only by the [`Deployer`]; callers read it for progress display.
/// `Default` is the idle state, and `reset` returns to exactly that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentState {
    pub step: DeploymentStep,
    pub is_deploying: bool,
    pub is_success: bool,
    pub is_error: bool,
    pub factory_address: Option<Address>,
    pub nft_address: Option<Address>,
    pub campaign_address: Option<Address>,
    /// Hashes of every confirmed transaction, in step order.
    pub tx_hashes: Vec<B256>,
    pub error: Option<String>,
}

/// Addresses and transactions of a completed deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentResult {
    pub factory_address: Address,
    pub nft_address: Address,
    pub campaign_address: Address,
    pub tx_hashes: Vec<B256>,
}

/// The seam between the orchestrator and whatever carries its transactions:
/// a direct wallet RPC connection, the smart-account relay, or a scripted
/// double in tests.
pub trait ChainClient {
    /// The account the deployment runs as (contract owner and creator).
    fn sender(&self) -> Address;

    /// Chain ID the client is connected to.
    fn chain_id(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Submit one call and return its transaction hash.
    fn submit(&self, call: &UserOpCall) -> impl Future<Output = Result<B256>> + Send;

    /// Block until the transaction is mined and return its receipt.
    fn wait_for_receipt(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<TransactionReceipt>> + Send;
}

/// Drives the deployment sequence over a [`ChainClient`].
pub struct Deployer<C: ChainClient> {
    client: C,
    artifacts: Artifacts,
    config: DeployConfig,
    state: DeploymentState,
}

impl<C: ChainClient> Deployer<C> {
    pub fn new(client: C, artifacts: Artifacts, config: DeployConfig) -> Self {
        Self {
            client,
            artifacts,
            config,
            state: DeploymentState::default(),
        }
    }

    /// Current deployment state, for progress display.
    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    /// Return to the idle state, discarding all addresses and hashes.
    /// On-chain state is untouched.
    pub fn reset(&mut self) {
        self.state = DeploymentState::default();
    }

    /// Run the full five-step sequence.
    ///
    /// On failure the error is both returned and recorded in the state,
    /// which stays frozen at the failing step.
    pub async fn deploy_contracts(
        &mut self,
        details: &CampaignDetails,
    ) -> Result<DeploymentResult> {
        self.state = DeploymentState {
            is_deploying: true,
            ..DeploymentState::default()
        };

        match self.run_steps(details).await {
            Ok(result) => {
                self.state.is_deploying = false;
                self.state.is_success = true;
                self.state.step = DeploymentStep::Completed;
                Ok(result)
            }
            Err(e) => {
                tracing::error!(step = %self.state.step, error = %e, "Deployment failed");
                self.state.is_deploying = false;
                self.state.is_error = true;
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_steps(&mut self, details: &CampaignDetails) -> Result<DeploymentResult> {
        let chain_id = self.client.chain_id().await?;
        if chain_id != self.config.expected_chain_id {
            return Err(DeployError::WrongNetwork {
                expected: self.config.expected_chain_id,
                actual: chain_id,
            });
        }

        let owner = self.client.sender();
        let goal_wei = details.goal_wei()?;

        // Step 1: temporary factory with a placeholder NFT reference.
        self.state.step = DeploymentStep::DeployingTempFactory;
        tracing::info!(owner = %owner, "Deploying temporary factory...");
        let call = calls::factory_deploy_call(&self.artifacts.factory.bytecode, Address::ZERO, owner)?;
        let receipt = self.execute(&call).await?;
        let temp_factory = extract_deployed_address(&receipt, &[])?;
        tracing::info!(address = %temp_factory, "Temporary factory deployed");

        // Step 2: NFT bound to the temporary factory.
        self.state.step = DeploymentStep::DeployingNft;
        tracing::info!(factory = %temp_factory, "Deploying campaign NFT...");
        let call = calls::nft_deploy_call(
            &self.artifacts.nft.bytecode,
            temp_factory,
            &self.config.base_uri,
            owner,
        )?;
        let receipt = self.execute(&call).await?;
        let nft = extract_deployed_address(&receipt, &[temp_factory])?;
        self.state.nft_address = Some(nft);
        tracing::info!(address = %nft, "Campaign NFT deployed");

        // Step 3: the final factory, bound to the real NFT address.
        self.state.step = DeploymentStep::DeployingFinalFactory;
        tracing::info!(nft = %nft, "Deploying final factory...");
        let call = calls::factory_deploy_call(&self.artifacts.factory.bytecode, nft, owner)?;
        let receipt = self.execute(&call).await?;
        let factory = extract_deployed_address(&receipt, &[temp_factory, nft])?;
        self.state.factory_address = Some(factory);
        tracing::info!(address = %factory, "Final factory deployed");

        // Step 4: re-point the NFT from the temporary factory to the final
        // one. No new address comes out of this step.
        self.state.step = DeploymentStep::UpdatingNft;
        tracing::info!(nft = %nft, factory = %factory, "Re-pointing NFT at final factory...");
        let call = calls::update_factory_call(nft, factory);
        self.execute(&call).await?;

        // Step 5: create the campaign, with the metadata embedded as a
        // percent-encoded data: URI.
        self.state.step = DeploymentStep::CreatingCampaign;
        let campaign_uri = metadata::campaign_uri(details, Utc::now());
        tracing::info!(
            creator = %owner,
            goal_wei = %goal_wei,
            campaign_uri = %campaign_uri,
            "Creating campaign..."
        );
        let call =
            calls::create_campaign_call(factory, owner, goal_wei, self.config.token, &campaign_uri);
        let receipt = self.execute(&call).await?;
        let campaign = extract_deployed_address(&receipt, &[factory, nft])?;
        self.state.campaign_address = Some(campaign);
        tracing::info!(address = %campaign, "Campaign created");

        Ok(DeploymentResult {
            factory_address: factory,
            nft_address: nft,
            campaign_address: campaign,
            tx_hashes: self.state.tx_hashes.clone(),
        })
    }

    /// Submit one call, wait for its receipt and record the confirmed hash.
    /// A reverted transaction fails the current step.
    async fn execute(&mut self, call: &UserOpCall) -> Result<TransactionReceipt> {
        let tx_hash = self.client.submit(call).await?;
        tracing::debug!(step = %self.state.step, tx_hash = %tx_hash, "Transaction submitted");

        let receipt = self.client.wait_for_receipt(tx_hash).await?;
        if !receipt.is_success() {
            return Err(DeployError::DeploymentStep {
                step: self.state.step,
                reason: format!("transaction {tx_hash} reverted"),
            });
        }

        self.state.tx_hashes.push(tx_hash);
        Ok(receipt)
    }
}
