//! Transaction receipt types and deployed-address extraction.
//!
//! The extraction is a heuristic rather than an ABI-aware event decode: the
//! factory's `CampaignCreated` event layout is known in advance, so the
//! address is recovered from the receipt with an ordered fallback chain.

use alloy_core::primitives::{Address, B256, Bytes};
use serde::Deserialize;

use crate::error::{DeployError, Result};

/// Reserved sentinel address (`0x…01`) that shows up in precompile slots and
/// must never be taken for a freshly deployed contract.
const SENTINEL_ADDRESS: Address = Address::with_last_byte(1);

/// A single event log entry, as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogEntry {
    /// Address of the contract that emitted the event.
    pub address: Address,
    /// Indexed event topics (topic 0 is the event signature hash).
    #[serde(default)]
    pub topics: Vec<B256>,
    /// Non-indexed event data.
    #[serde(default)]
    pub data: Bytes,
}

/// A transaction receipt, as returned by `eth_getTransactionReceipt`.
///
/// Only the fields the deployment flow reads are kept; everything else in
/// the RPC response is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    /// Set by the node for plain contract-creation transactions.
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Post-Byzantium status: `0x1` success, `0x0` reverted.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl TransactionReceipt {
    /// Whether the receipt reports the transaction as successful.
    ///
    /// A missing status field (pre-Byzantium node) is treated as success;
    /// only an explicit `0x0` marks a revert.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() != Some("0x0")
    }
}

/// Recover the address of a contract deployed (or announced in an event) by
/// the transaction behind `receipt`.
///
/// Ordered fallback chain, first success wins:
/// 1. The receipt's own `contractAddress` field (deployment transactions).
/// 2. The third topic of the first log carrying three or more topics,
///    low-order 20 bytes.
/// 3. Any topic of any log, low-order 20 bytes.
/// 4. Every 1-byte-aligned 20-byte window of any log's data.
///
/// Candidates equal to the zero address, the `0x…01` sentinel, or any entry
/// in `known` (addresses already assigned to the factory or NFT) are
/// rejected, and the scan falls through to the next stage.
pub fn extract_deployed_address(
    receipt: &TransactionReceipt,
    known: &[Address],
) -> Result<Address> {
    // Deployment transactions report the created address directly; that
    // field is authoritative and wins over any log content.
    if let Some(address) = receipt.contract_address {
        return Ok(address);
    }

    // The CampaignCreated event carries the new campaign address as its
    // third indexed topic.
    if let Some(log) = receipt.logs.iter().find(|log| log.topics.len() >= 3) {
        let candidate = address_from_word(&log.topics[2]);
        if is_plausible(candidate, known) {
            tracing::debug!(address = %candidate, "Extracted address from third topic");
            return Ok(candidate);
        }
    }

    // Fall back to any topic that ends in something address-shaped.
    for log in &receipt.logs {
        for topic in &log.topics {
            let candidate = address_from_word(topic);
            if is_plausible(candidate, known) {
                tracing::debug!(address = %candidate, "Extracted address from topic scan");
                return Ok(candidate);
            }
        }
    }

    // Last resort: scan the raw event data byte by byte.
    for log in &receipt.logs {
        if log.data.len() >= Address::len_bytes() {
            for window in log.data.windows(Address::len_bytes()) {
                let candidate = Address::from_slice(window);
                if is_plausible(candidate, known) {
                    tracing::debug!(address = %candidate, "Extracted address from data scan");
                    return Ok(candidate);
                }
            }
        }
    }

    Err(DeployError::AddressExtraction {
        tx_hash: receipt.transaction_hash,
    })
}

/// Interpret the low-order 20 bytes of a 32-byte word as an address.
fn address_from_word(word: &B256) -> Address {
    Address::from_slice(&word[12..])
}

/// A candidate is plausible if it is non-zero, not the sentinel, and not an
/// address we already know belongs to the factory or NFT (which would mean
/// we mis-parsed an event that merely echoes an existing contract).
fn is_plausible(candidate: Address, known: &[Address]) -> bool {
    !candidate.is_zero() && candidate != SENTINEL_ADDRESS && !known.contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::{address, b256};

    const CAMPAIGN: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const FACTORY: Address = address!("1111111111111111111111111111111111111111");
    const TX_HASH: B256 =
        b256!("00000000000000000000000000000000000000000000000000000000000000ff");

    fn word_with_address(address: Address) -> B256 {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_slice());
        B256::from(word)
    }

    fn receipt(contract_address: Option<Address>, logs: Vec<LogEntry>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: TX_HASH,
            contract_address,
            status: Some("0x1".to_string()),
            logs,
        }
    }

    #[test]
    fn direct_contract_address_wins_over_logs() {
        let receipt = receipt(
            Some(FACTORY),
            vec![LogEntry {
                address: FACTORY,
                topics: vec![B256::ZERO, B256::ZERO, word_with_address(CAMPAIGN)],
                data: Bytes::new(),
            }],
        );

        assert_eq!(extract_deployed_address(&receipt, &[]).unwrap(), FACTORY);
    }

    #[test]
    fn third_topic_yields_address() {
        let receipt = receipt(
            None,
            vec![LogEntry {
                address: FACTORY,
                topics: vec![
                    b256!("1234567890123456789012345678901234567890123456789012345678901234"),
                    B256::ZERO,
                    word_with_address(CAMPAIGN),
                ],
                data: Bytes::new(),
            }],
        );

        assert_eq!(extract_deployed_address(&receipt, &[]).unwrap(), CAMPAIGN);
    }

    #[test]
    fn zero_third_topic_falls_through_to_topic_scan() {
        // Third topic is zero; the first topic's suffix is address-shaped
        // and should be picked up by the scan stage.
        let receipt = receipt(
            None,
            vec![LogEntry {
                address: FACTORY,
                topics: vec![word_with_address(CAMPAIGN), B256::ZERO, B256::ZERO],
                data: Bytes::new(),
            }],
        );

        assert_eq!(extract_deployed_address(&receipt, &[]).unwrap(), CAMPAIGN);
    }

    #[test]
    fn known_address_is_rejected_and_scan_falls_through() {
        // The third topic echoes the factory address; the scan must skip it
        // and land on the campaign address in the first topic.
        let receipt = receipt(
            None,
            vec![LogEntry {
                address: FACTORY,
                topics: vec![
                    word_with_address(CAMPAIGN),
                    B256::ZERO,
                    word_with_address(FACTORY),
                ],
                data: Bytes::new(),
            }],
        );

        assert_eq!(
            extract_deployed_address(&receipt, &[FACTORY]).unwrap(),
            CAMPAIGN
        );
    }

    #[test]
    fn sentinel_address_is_rejected() {
        let receipt = receipt(
            None,
            vec![LogEntry {
                address: FACTORY,
                topics: vec![word_with_address(SENTINEL_ADDRESS)],
                data: Bytes::new(),
            }],
        );

        assert!(matches!(
            extract_deployed_address(&receipt, &[]),
            Err(DeployError::AddressExtraction { tx_hash }) if tx_hash == TX_HASH
        ));
    }

    #[test]
    fn data_scan_finds_unaligned_address() {
        // Address embedded mid-word in the data field, not word-aligned.
        let mut data = vec![0u8; 7];
        data.extend_from_slice(CAMPAIGN.as_slice());
        data.extend_from_slice(&[0u8; 5]);

        let receipt = receipt(
            None,
            vec![LogEntry {
                address: FACTORY,
                topics: vec![B256::ZERO],
                data: Bytes::from(data),
            }],
        );

        assert_eq!(extract_deployed_address(&receipt, &[]).unwrap(), CAMPAIGN);
    }

    #[test]
    fn later_logs_are_scanned_too() {
        // The first log is all noise; the second one carries the address.
        let receipt = receipt(
            None,
            vec![
                LogEntry {
                    address: FACTORY,
                    topics: vec![B256::ZERO],
                    data: Bytes::new(),
                },
                LogEntry {
                    address: FACTORY,
                    topics: vec![word_with_address(CAMPAIGN)],
                    data: Bytes::new(),
                },
            ],
        );

        assert_eq!(extract_deployed_address(&receipt, &[]).unwrap(), CAMPAIGN);
    }

    #[test]
    fn no_logs_and_no_contract_address_fails() {
        let receipt = receipt(None, vec![]);
        assert!(extract_deployed_address(&receipt, &[]).is_err());
    }

    #[test]
    fn receipt_deserializes_from_rpc_json() {
        let json = r#"{
            "transactionHash": "0x00000000000000000000000000000000000000000000000000000000000000ff",
            "contractAddress": null,
            "status": "0x1",
            "logs": [{
                "address": "0x1111111111111111111111111111111111111111",
                "topics": [
                    "0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
                ],
                "data": "0x"
            }]
        }"#;

        let receipt: TransactionReceipt = serde_json::from_str(json).unwrap();
        assert!(receipt.is_success());
        assert_eq!(receipt.contract_address, None);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(
            extract_deployed_address(&receipt, &[]).unwrap(),
            CAMPAIGN
        );
    }

    #[test]
    fn reverted_status_is_not_success() {
        let mut r = receipt(None, vec![]);
        r.status = Some("0x0".to_string());
        assert!(!r.is_success());
    }
}
