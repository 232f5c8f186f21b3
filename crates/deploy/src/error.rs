//! Error types shared across the deployment library.

use alloy_core::primitives::B256;
use thiserror::Error;

use crate::deployer::DeploymentStep;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("no connected wallet or signer available")]
    NotConnected,

    #[error("connected to chain {actual}, expected chain {expected}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("deployment step {step} failed: {reason}")]
    DeploymentStep {
        step: DeploymentStep,
        reason: String,
    },

    #[error("no plausible contract address found in receipt for transaction {tx_hash}")]
    AddressExtraction { tx_hash: B256 },

    #[error("backend request failed: {0}")]
    ApiRequest(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("invalid ETH amount '{0}'")]
    InvalidAmount(String),

    #[error("invalid contract artifact: {0}")]
    InvalidArtifact(String),

    #[error("invalid campaign URI: {0}")]
    InvalidCampaignUri(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
