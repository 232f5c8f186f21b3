//! Campaign details, ETH amount parsing and the embedded metadata URI.
//!
//! Campaign metadata is not IPFS-hosted: it is embedded directly in the
//! `createCampaign` call as a `data:application/json,` URI with the JSON
//! payload percent-encoded.

use alloy_core::primitives::U256;
use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

/// Scheme-and-type prefix of an embedded campaign metadata URI.
pub const DATA_URI_PREFIX: &str = "data:application/json,";

/// 10^18, the wei value of one ETH.
const WEI_PER_ETH: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);

/// Characters escaped by JavaScript's `encodeURIComponent`: everything but
/// alphanumerics and `- _ . ! ~ * ' ( )`. The on-chain URIs were produced by
/// the web frontend, so the same set is used here.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// User-provided details of the campaign to create.
///
/// Immutable once submitted into a deployment run; the goal is a decimal
/// ETH amount kept as a string until it is scaled to wei.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDetails {
    pub name: String,
    pub description: String,
    /// Funding goal in ETH, as a decimal string (e.g. "0.1").
    pub goal: String,
    /// Campaign duration in days.
    pub duration_days: u32,
}

impl Default for CampaignDetails {
    fn default() -> Self {
        Self {
            name: "Sample Campaign".to_string(),
            description: "A sample fundraising campaign".to_string(),
            goal: "0.1".to_string(),
            duration_days: 30,
        }
    }
}

impl CampaignDetails {
    /// The campaign goal scaled to wei.
    pub fn goal_wei(&self) -> Result<U256> {
        parse_eth(&self.goal)
    }
}

/// JSON metadata embedded in the campaign URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignMetadata {
    pub name: String,
    pub description: String,
    /// Duration in days, kept as a string on the wire.
    pub duration: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Parse a decimal ETH amount into wei, exactly.
///
/// Scales by 10^18 without going through floating point, so
/// `wei == round(goal_eth * 1e18)` holds for every representable input.
/// Amounts with more than 18 fractional digits are rejected rather than
/// silently truncated.
pub fn parse_eth(amount: &str) -> Result<U256> {
    let invalid = || DeployError::InvalidAmount(amount.to_string());

    let trimmed = amount.trim();
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if frac_part.len() > 18 {
        return Err(invalid());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let int_wei = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10)
            .map_err(|_| invalid())?
            .checked_mul(WEI_PER_ETH)
            .ok_or_else(invalid)?
    };

    let frac_wei = if frac_part.is_empty() {
        U256::ZERO
    } else {
        // Right-pad the fractional digits to 18 places.
        let padded = format!("{frac_part:0<18}");
        U256::from_str_radix(&padded, 10).map_err(|_| invalid())?
    };

    int_wei.checked_add(frac_wei).ok_or_else(invalid)
}

/// Build the `data:application/json,` URI embedding the campaign metadata.
pub fn campaign_uri(details: &CampaignDetails, created_at: DateTime<Utc>) -> String {
    let metadata = CampaignMetadata {
        name: details.name.clone(),
        description: details.description.clone(),
        duration: details.duration_days.to_string(),
        created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    // CampaignMetadata has no non-string fields, serialization cannot fail.
    let json = serde_json::to_string(&metadata).expect("metadata serializes to JSON");
    format!("{DATA_URI_PREFIX}{}", utf8_percent_encode(&json, URI_COMPONENT))
}

/// Decode a campaign metadata URI back into its fields.
pub fn decode_campaign_uri(uri: &str) -> Result<CampaignMetadata> {
    let encoded = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| DeployError::InvalidCampaignUri(format!("missing {DATA_URI_PREFIX} prefix")))?;

    let json = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| DeployError::InvalidCampaignUri(e.to_string()))?;

    Ok(serde_json::from_str(&json)?)
}

/// Shorten an address-like hex string for display: `0x1234…abcd`.
pub fn short_hex(value: &str) -> String {
    if value.len() <= 10 {
        return value.to_string();
    }
    format!("{}...{}", &value[..6], &value[value.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_eth_scales_exactly() {
        assert_eq!(parse_eth("1").unwrap(), WEI_PER_ETH);
        assert_eq!(
            parse_eth("1.5").unwrap(),
            U256::from(1_500_000_000_000_000_000u64)
        );
        assert_eq!(
            parse_eth("0.1").unwrap(),
            U256::from(100_000_000_000_000_000u64)
        );
        assert_eq!(parse_eth("0").unwrap(), U256::ZERO);
        assert_eq!(parse_eth(".5").unwrap(), U256::from(500_000_000_000_000_000u64));
        // Full 18-digit precision survives.
        assert_eq!(parse_eth("0.000000000000000001").unwrap(), U256::from(1u64));
    }

    #[test]
    fn parse_eth_is_monotonic() {
        let amounts = ["0", "0.000000000000000001", "0.1", "0.5", "1", "1.5", "100"];
        let weis: Vec<U256> = amounts.iter().map(|a| parse_eth(a).unwrap()).collect();
        assert!(weis.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn parse_eth_rejects_garbage() {
        assert!(parse_eth("").is_err());
        assert!(parse_eth(".").is_err());
        assert!(parse_eth("1.2.3").is_err());
        assert!(parse_eth("one").is_err());
        assert!(parse_eth("-1").is_err());
        assert!(parse_eth("1e18").is_err());
        // 19 fractional digits: below wei resolution.
        assert!(parse_eth("0.0000000000000000001").is_err());
    }

    #[test]
    fn goal_wei_uses_the_details_goal() {
        let details = CampaignDetails::default();
        assert_eq!(
            details.goal_wei().unwrap(),
            U256::from(100_000_000_000_000_000u64)
        );
    }

    #[test]
    fn campaign_uri_round_trips() {
        let details = CampaignDetails {
            name: "Clean Water For All".to_string(),
            description: "Wells & filters: 100% on-chain, 0% overhead".to_string(),
            goal: "2.5".to_string(),
            duration_days: 45,
        };
        let created_at = Utc::now();

        let uri = campaign_uri(&details, created_at);
        assert!(uri.starts_with(DATA_URI_PREFIX));

        let decoded = decode_campaign_uri(&uri).unwrap();
        assert_eq!(decoded.name, details.name);
        assert_eq!(decoded.description, details.description);
        assert_eq!(decoded.duration, "45");
    }

    #[test]
    fn campaign_uri_escapes_json_structure() {
        let uri = campaign_uri(&CampaignDetails::default(), Utc::now());
        let payload = &uri[DATA_URI_PREFIX.len()..];

        // Braces, quotes and spaces must all be percent-escaped.
        assert!(!payload.contains('{'));
        assert!(!payload.contains('"'));
        assert!(!payload.contains(' '));
        assert!(payload.contains("%7B"));
    }

    #[test]
    fn decode_rejects_foreign_uris() {
        assert!(decode_campaign_uri("ipfs://QmHash").is_err());
        assert!(decode_campaign_uri("data:application/json,not-json").is_err());
    }

    #[test]
    fn short_hex_keeps_ends() {
        assert_eq!(
            short_hex("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            "0xf39F...2266"
        );
        assert_eq!(short_hex("0x1234"), "0x1234");
    }
}
