use std::path::PathBuf;

use alloy_core::primitives::Address;
use clap::{Args, Parser, Subcommand};
use safecap_deploy::Network;
use safecap_deploy::config::{DEFAULT_API_URL, DEFAULT_BASE_URI, DEFAULT_RPC_URL};
use safecap_deploy::rpc::DEFAULT_RECEIPT_TIMEOUT_SECS;
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "safecap")]
#[command(
    author,
    version,
    about = "Deploy and manage SafeCap crowdfunding campaigns from the command line"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "SAFECAP_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Target network.
    #[arg(long, env = "SAFECAP_NETWORK", default_value_t = Network::Sepolia)]
    pub network: Network,

    /// Override the expected chain ID (custom/dev chains).
    #[arg(long, env = "SAFECAP_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// JSON-RPC endpoint of the node to deploy through.
    #[arg(long, env = "SAFECAP_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Base URL of the SafeCap backend API.
    #[arg(long, env = "SAFECAP_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: Url,

    /// Directory holding the CampaignFactory.json and CampaignNFT.json
    /// contract artifacts.
    #[arg(long, env = "SAFECAP_ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full five-step deployment through a wallet account on the
    /// RPC node.
    Deploy {
        #[command(flatten)]
        campaign: CampaignArgs,

        /// Base URI for the campaign NFT metadata.
        #[arg(long, default_value = DEFAULT_BASE_URI)]
        base_uri: String,

        /// Funding token address; defaults to the zero address (ETH).
        #[arg(long)]
        token: Option<Address>,

        /// Deploy from this account instead of the node's first unlocked
        /// account.
        #[arg(long)]
        from: Option<Address>,

        /// Seconds to wait for each transaction to be mined.
        #[arg(long, default_value_t = DEFAULT_RECEIPT_TIMEOUT_SECS)]
        receipt_timeout: u64,
    },

    /// Run the same deployment relayed through a smart account.
    Relay {
        #[command(flatten)]
        campaign: CampaignArgs,

        /// The EOA owning the smart account (campaign creator).
        #[arg(long)]
        owner: Address,

        /// Smart account to relay through. Resolved from the backend when
        /// omitted.
        #[arg(long)]
        smart_account: Option<Address>,

        /// Base URI for the campaign NFT metadata.
        #[arg(long, default_value = DEFAULT_BASE_URI)]
        base_uri: String,

        /// Seconds to wait for each transaction to be mined.
        #[arg(long, default_value_t = DEFAULT_RECEIPT_TIMEOUT_SECS)]
        receipt_timeout: u64,
    },

    /// One-click managed campaign: the backend deploys with a wallet it
    /// controls.
    Managed {
        #[command(flatten)]
        campaign: CampaignArgs,

        /// User the managed wallet belongs to. A random one is generated
        /// (and a wallet created) when omitted.
        #[arg(long)]
        user_id: Option<String>,

        /// Poll the campaign status until deployment settles.
        #[arg(long)]
        wait: bool,
    },

    /// Create a smart account for an owner, for later relayed deployments.
    CreateSmartAccount {
        /// The EOA that will own the smart account.
        #[arg(long)]
        owner: Address,
    },

    /// Look up the status of a managed campaign.
    Status {
        /// The campaign ID returned at creation.
        campaign_id: String,
    },

    /// Donate to a managed campaign.
    Donate {
        /// The campaign ID returned at creation.
        campaign_id: String,

        /// Donation amount in ETH.
        #[arg(long)]
        amount: String,

        /// User ID the donation is sent from.
        #[arg(long)]
        from: String,
    },
}

/// Details of the campaign to create.
#[derive(Debug, Clone, Args)]
pub struct CampaignArgs {
    /// Campaign name.
    #[arg(long, default_value = "Sample Campaign")]
    pub name: String,

    /// Campaign description.
    #[arg(long, default_value = "A sample fundraising campaign")]
    pub description: String,

    /// Funding goal in ETH.
    #[arg(long, default_value = "0.1")]
    pub goal: String,

    /// Campaign duration in days.
    #[arg(long, default_value_t = 30)]
    pub duration: u32,
}

impl From<CampaignArgs> for safecap_deploy::CampaignDetails {
    fn from(args: CampaignArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            goal: args.goal,
            duration_days: args.duration,
        }
    }
}
