//! safecap is a CLI for deploying and managing SafeCap crowdfunding
//! campaigns: direct wallet deployments, smart-account relayed deployments
//! and backend-managed one-click campaigns.

mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;
use rand::Rng;
use rand::distr::Alphanumeric;

use cli::{Cli, Command};
use safecap_deploy::api::{ApiClient, ManagedCampaignRequest};
use safecap_deploy::metadata::short_hex;
use safecap_deploy::{
    Artifacts, CampaignDetails, DeployConfig, Deployer, DeploymentResult, DeploymentStep,
    RelayClient, WalletClient,
};

/// Poll interval for managed campaign status checks.
const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Maximum number of status polls before giving up.
const STATUS_POLL_ATTEMPTS: u32 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let expected_chain_id = cli.chain_id.unwrap_or_else(|| cli.network.chain_id());

    match cli.command {
        Command::Deploy {
            campaign,
            base_uri,
            token,
            from,
            receipt_timeout,
        } => {
            let artifacts = Artifacts::load_dir(&cli.artifacts_dir)
                .context("Failed to load contract artifacts")?;

            let client = match from {
                Some(sender) => WalletClient::connect_as(&cli.rpc_url, sender, receipt_timeout)?,
                None => WalletClient::connect(&cli.rpc_url, receipt_timeout)
                    .await
                    .context("Failed to connect to the RPC node")?,
            };

            let mut config = DeployConfig::for_network(cli.network).with_chain_id(expected_chain_id);
            config.base_uri = base_uri;
            if let Some(token) = token {
                config.token = token;
            }

            let mut deployer = Deployer::new(client, artifacts, config);
            let result = deployer.deploy_contracts(&campaign.into()).await?;
            print_deployment_summary(&result);
        }

        Command::Relay {
            campaign,
            owner,
            smart_account,
            base_uri,
            receipt_timeout,
        } => {
            let artifacts = Artifacts::load_dir(&cli.artifacts_dir)
                .context("Failed to load contract artifacts")?;
            let api = ApiClient::new(cli.api_url)?;
            let network_name = cli.network.to_string();

            let client = match smart_account {
                Some(smart_account) => RelayClient::new(
                    api,
                    &cli.rpc_url,
                    smart_account,
                    owner,
                    &network_name,
                    receipt_timeout,
                )?,
                None => {
                    RelayClient::for_owner(api, &cli.rpc_url, owner, &network_name, receipt_timeout)
                        .await
                        .context("Failed to resolve a smart account for the owner")?
                }
            };

            tracing::info!(smart_account = %client.smart_account(), "Relaying deployment");

            let mut config = DeployConfig::for_network(cli.network).with_chain_id(expected_chain_id);
            config.base_uri = base_uri;

            let mut deployer = Deployer::new(client, artifacts, config);
            let result = deployer.deploy_contracts(&campaign.into()).await?;
            print_deployment_summary(&result);
        }

        Command::Managed {
            campaign,
            user_id,
            wait,
        } => {
            let api = ApiClient::new(cli.api_url)?;
            run_managed(&api, campaign.into(), user_id, wait).await?;
        }

        Command::CreateSmartAccount { owner } => {
            let api = ApiClient::new(cli.api_url)?;
            let account = api
                .create_smart_account(owner, &cli.network.to_string())
                .await
                .context("Failed to create smart account")?;
            tracing::info!(
                owner = %owner,
                smart_account = %account.smart_account_address,
                "Smart account created"
            );
        }

        Command::Status { campaign_id } => {
            let api = ApiClient::new(cli.api_url)?;
            let status = api
                .campaign_status(&campaign_id)
                .await
                .context("Failed to fetch campaign status")?;
            tracing::info!(
                campaign_id = %campaign_id,
                status = %status.status,
                updated_at = %status.updated_at,
                "Campaign status"
            );
        }

        Command::Donate {
            campaign_id,
            amount,
            from,
        } => {
            let api = ApiClient::new(cli.api_url)?;
            let result = api
                .send_managed_transaction(&campaign_id, &amount, &from)
                .await
                .context("Failed to send donation")?;
            tracing::info!(
                tx_hash = %result.transaction_hash,
                status = %result.status,
                "Donation sent"
            );
        }
    }

    Ok(())
}

/// Create (or reuse) a managed wallet, create the campaign and optionally
/// poll until its deployment settles.
async fn run_managed(
    api: &ApiClient,
    details: CampaignDetails,
    user_id: Option<String>,
    wait: bool,
) -> Result<()> {
    let user_id = match user_id {
        Some(user_id) => {
            let wallet = api
                .wallet(&user_id)
                .await
                .context("Failed to look up the managed wallet")?;
            tracing::info!(
                user_id = %user_id,
                wallet = ?wallet.any_address(),
                "Using existing managed wallet"
            );
            user_id
        }
        None => {
            let user_id = generate_user_id();
            let wallet = api
                .create_wallet(&user_id)
                .await
                .context("Failed to create a managed wallet")?;
            tracing::info!(
                user_id = %user_id,
                wallet = ?wallet.any_address(),
                "Created managed wallet"
            );
            user_id
        }
    };

    let campaign = api
        .create_managed_campaign(&ManagedCampaignRequest {
            user_id: user_id.clone(),
            name: details.name,
            description: details.description,
            goal: details.goal,
        })
        .await
        .context("Failed to create managed campaign")?;

    tracing::info!(
        campaign_id = %campaign.id,
        name = %campaign.name,
        status = ?campaign.status,
        "Managed campaign created"
    );

    if !wait {
        return Ok(());
    }

    for attempt in 1..=STATUS_POLL_ATTEMPTS {
        let status = api
            .campaign_status(&campaign.id)
            .await
            .context("Failed to poll campaign status")?;

        tracing::info!(attempt, status = %status.status, "Polling campaign status...");

        match status.status.as_str() {
            "pending" | "deploying" => tokio::time::sleep(STATUS_POLL_INTERVAL).await,
            _ => {
                tracing::info!(
                    campaign_id = %campaign.id,
                    status = %status.status,
                    "Campaign deployment settled"
                );
                return Ok(());
            }
        }
    }

    anyhow::bail!(
        "Campaign {} did not settle after {} polls",
        campaign.id,
        STATUS_POLL_ATTEMPTS
    )
}

/// Generate a short random user ID, `user-xxxxxxx`.
fn generate_user_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();
    format!("user-{}", suffix.to_lowercase())
}

/// Print the per-step transactions and resulting addresses of a completed
/// deployment.
fn print_deployment_summary(result: &DeploymentResult) {
    let steps = [
        DeploymentStep::DeployingTempFactory,
        DeploymentStep::DeployingNft,
        DeploymentStep::DeployingFinalFactory,
        DeploymentStep::UpdatingNft,
        DeploymentStep::CreatingCampaign,
    ];

    let mut transactions = Table::new();
    transactions.set_header(vec!["Step", "Transaction"]);
    for (step, tx_hash) in steps.iter().zip(&result.tx_hashes) {
        transactions.add_row(vec![step.to_string(), short_hex(&tx_hash.to_string())]);
    }

    let mut addresses = Table::new();
    addresses.set_header(vec!["Contract", "Address"]);
    addresses.add_row(vec!["Factory".to_string(), result.factory_address.to_string()]);
    addresses.add_row(vec!["NFT".to_string(), result.nft_address.to_string()]);
    addresses.add_row(vec![
        "Campaign".to_string(),
        result.campaign_address.to_string(),
    ]);

    println!("{transactions}");
    println!("{addresses}");
}
