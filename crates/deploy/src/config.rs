//! Network selection and environment configuration.

use alloy_core::primitives::Address;
use url::Url;

/// The default backend API base URL (development).
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
/// The default JSON-RPC endpoint (local dev node).
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
/// The default base URI handed to the NFT constructor.
pub const DEFAULT_BASE_URI: &str = "ipfs://";

/// The testnets the backend knows how to relay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Network {
    Sepolia,
    BaseSepolia,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Sepolia => 11155111,
            Network::BaseSepolia => 84532,
        }
    }
}

/// Per-run deployment configuration.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Chain ID the connected client must report; anything else aborts the
    /// run before the first transaction.
    pub expected_chain_id: u64,
    /// Base URI handed to the NFT constructor.
    pub base_uri: String,
    /// Funding token for created campaigns; the zero address means ETH.
    pub token: Address,
}

impl DeployConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            expected_chain_id: network.chain_id(),
            base_uri: DEFAULT_BASE_URI.to_string(),
            token: Address::ZERO,
        }
    }

    /// Override the expected chain ID (custom/dev chains).
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.expected_chain_id = chain_id;
        self
    }
}

/// Join a path onto an API base URL, tolerating a trailing slash on the base.
pub fn api_endpoint(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn network_names_round_trip() {
        assert_eq!(Network::Sepolia.to_string(), "sepolia");
        assert_eq!(Network::BaseSepolia.to_string(), "base-sepolia");
        assert_eq!(Network::from_str("base-sepolia").unwrap(), Network::BaseSepolia);
        assert!(Network::from_str("mainnet").is_err());
    }

    #[test]
    fn chain_ids_match_public_testnets() {
        assert_eq!(Network::Sepolia.chain_id(), 11155111);
        assert_eq!(Network::BaseSepolia.chain_id(), 84532);
    }

    #[test]
    fn api_endpoint_handles_trailing_slashes() {
        let base = Url::parse("http://localhost:3000").unwrap();
        assert_eq!(
            api_endpoint(&base, "/api/wallet/create"),
            "http://localhost:3000/api/wallet/create"
        );

        let base = Url::parse("https://api.safecap.xyz/").unwrap();
        assert_eq!(
            api_endpoint(&base, "api/campaign/status/42"),
            "https://api.safecap.xyz/api/campaign/status/42"
        );
    }
}
