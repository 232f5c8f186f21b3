//! Contract artifact loading.
//!
//! The Factory, NFT and Campaign contracts are external, pre-compiled
//! artifacts consumed by address and signature; this crate only needs their
//! deployment bytecode (and keeps the ABI blob around for callers that want
//! to inspect it).

use std::path::Path;

use alloy_core::primitives::Bytes;
use serde::Deserialize;

use crate::error::{DeployError, Result};

/// File name of the campaign factory artifact inside the artifacts dir.
pub const FACTORY_ARTIFACT: &str = "CampaignFactory.json";
/// File name of the campaign NFT artifact inside the artifacts dir.
pub const NFT_ARTIFACT: &str = "CampaignNFT.json";

/// A compiled contract artifact: `{abi, bytecode}` as emitted by the
/// contract build pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    pub abi: serde_json::Value,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Load and validate an artifact from a JSON file.
    ///
    /// An artifact with empty (`0x`) bytecode cannot be deployed and is
    /// rejected here rather than at submission time.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let artifact: Self = serde_json::from_str(&content).map_err(|e| {
            DeployError::InvalidArtifact(format!("{}: {}", path.display(), e))
        })?;

        if artifact.bytecode.is_empty() {
            return Err(DeployError::InvalidArtifact(format!(
                "{}: bytecode is empty",
                path.display()
            )));
        }

        Ok(artifact)
    }
}

/// The pair of artifacts the deployment sequence needs.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub factory: ContractArtifact,
    pub nft: ContractArtifact,
}

impl Artifacts {
    /// Load `CampaignFactory.json` and `CampaignNFT.json` from a directory.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        tracing::debug!(dir = %dir.display(), "Loading contract artifacts");
        Ok(Self {
            factory: ContractArtifact::load(&dir.join(FACTORY_ARTIFACT))?,
            nft: ContractArtifact::load(&dir.join(NFT_ARTIFACT))?,
        })
    }
}
