//! safecap-deploy - Deployment library for the SafeCap crowdfunding contracts.
//!
//! This crate drives the five-step contract deployment sequence (temporary
//! factory, NFT, final factory, NFT re-pointing, campaign creation) over
//! either a direct JSON-RPC wallet connection or a smart-account relay
//! backend, and exposes the supporting pieces: receipt address extraction,
//! call payload building, campaign metadata encoding and the SafeCap backend
//! API client.

mod deployer;
pub use deployer::{ChainClient, Deployer, DeploymentResult, DeploymentState, DeploymentStep};

mod error;
pub use error::{DeployError, Result};

pub mod api;
pub mod artifacts;
pub mod calls;
pub mod config;
pub mod metadata;
pub mod receipt;
pub mod relay;
pub mod rpc;

pub use artifacts::{Artifacts, ContractArtifact};
pub use calls::UserOpCall;
pub use config::{DeployConfig, Network};
pub use metadata::CampaignDetails;
pub use receipt::{LogEntry, TransactionReceipt, extract_deployed_address};
pub use relay::RelayClient;
pub use rpc::WalletClient;
