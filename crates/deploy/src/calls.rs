//! Call payload building for the deployment steps.
//!
//! Every step of the deployment sequence is expressed as a [`UserOpCall`]:
//! a `{to, value, data}` triple that can be submitted either as a plain
//! wallet transaction or relayed through the smart-account backend.
//! Contract creations target the zero address by convention and carry the
//! deployment bytecode followed by the ABI-encoded constructor arguments
//! (constructor encoding has no function selector).

use alloy_core::primitives::{Address, Bytes, U256, keccak256};
use serde::Serialize;

use crate::error::{DeployError, Result};

/// Canonical signature of the NFT re-pointing function.
pub const UPDATE_FACTORY_SIGNATURE: &str = "updateFactoryAddress(address)";
/// Canonical signature of the campaign creation function.
pub const CREATE_CAMPAIGN_SIGNATURE: &str = "createCampaign(address,uint256,address,string)";

/// A single call payload for one deployment step.
///
/// Serializes with 0x-prefixed hex fields, matching the shape the
/// `send-user-operation` backend endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOpCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl UserOpCall {
    /// Whether this call is a contract creation (zero-address target).
    pub fn is_creation(&self) -> bool {
        self.to.is_zero()
    }
}

/// An ABI-encodable argument value.
///
/// Covers exactly the types the factory and NFT constructors and calls use:
/// static address/uint256 words and one dynamic trailing string.
#[derive(Debug, Clone)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Str(String),
}

impl AbiValue {
    fn is_dynamic(&self) -> bool {
        matches!(self, AbiValue::Str(_))
    }

    /// The 32-byte head word for a static value.
    fn head_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        match self {
            AbiValue::Address(address) => word[12..].copy_from_slice(address.as_slice()),
            AbiValue::Uint(value) => word = value.to_be_bytes::<32>(),
            AbiValue::Str(_) => unreachable!("dynamic values have offset heads"),
        }
        word
    }

    /// The tail encoding for a dynamic value: length word plus payload
    /// padded to a 32-byte boundary.
    fn tail(&self) -> Vec<u8> {
        match self {
            AbiValue::Str(s) => {
                let bytes = s.as_bytes();
                let mut out = U256::from(bytes.len()).to_be_bytes::<32>().to_vec();
                out.extend_from_slice(bytes);
                let padding = (32 - bytes.len() % 32) % 32;
                out.extend(std::iter::repeat_n(0u8, padding));
                out
            }
            _ => Vec::new(),
        }
    }
}

/// Standard ABI head/tail encoding of an argument list.
pub fn encode_args(values: &[AbiValue]) -> Vec<u8> {
    let head_len = 32 * values.len();
    let mut heads = Vec::with_capacity(head_len);
    let mut tails = Vec::new();

    for value in values {
        if value.is_dynamic() {
            let offset = U256::from(head_len + tails.len());
            heads.extend_from_slice(&offset.to_be_bytes::<32>());
            tails.extend_from_slice(&value.tail());
        } else {
            heads.extend_from_slice(&value.head_word());
        }
    }

    heads.extend_from_slice(&tails);
    heads
}

/// ABI-encode a function call: 4-byte keccak selector plus encoded args.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Bytes {
    let selector = &keccak256(signature.as_bytes())[..4];
    let mut data = selector.to_vec();
    data.extend_from_slice(&encode_args(args));
    Bytes::from(data)
}

/// Build contract-creation data: deployment bytecode followed by the
/// ABI-encoded constructor arguments.
///
/// Empty bytecode is a build error and is rejected before anything is
/// submitted.
pub fn deploy_data(bytecode: &Bytes, args: &[AbiValue]) -> Result<Bytes> {
    if bytecode.is_empty() {
        return Err(DeployError::InvalidArtifact(
            "deployment bytecode is empty".to_string(),
        ));
    }

    let mut data = bytecode.to_vec();
    data.extend_from_slice(&encode_args(args));
    Ok(Bytes::from(data))
}

/// Call payload deploying a campaign factory bound to `nft` with `owner` as
/// the contract owner. Step 1 passes the zero address as `nft` (temporary
/// factory), step 3 passes the real NFT address (final factory).
pub fn factory_deploy_call(bytecode: &Bytes, nft: Address, owner: Address) -> Result<UserOpCall> {
    Ok(UserOpCall {
        to: Address::ZERO,
        value: U256::ZERO,
        data: deploy_data(bytecode, &[AbiValue::Address(nft), AbiValue::Address(owner)])?,
    })
}

/// Call payload deploying the campaign NFT bound to `factory`, with the
/// token metadata `base_uri` and `owner` as the contract owner.
pub fn nft_deploy_call(
    bytecode: &Bytes,
    factory: Address,
    base_uri: &str,
    owner: Address,
) -> Result<UserOpCall> {
    Ok(UserOpCall {
        to: Address::ZERO,
        value: U256::ZERO,
        data: deploy_data(
            bytecode,
            &[
                AbiValue::Address(factory),
                AbiValue::Str(base_uri.to_string()),
                AbiValue::Address(owner),
            ],
        )?,
    })
}

/// Call payload re-pointing the NFT at the final factory
/// (`updateFactoryAddress(factory)` on the NFT contract).
pub fn update_factory_call(nft: Address, factory: Address) -> UserOpCall {
    UserOpCall {
        to: nft,
        value: U256::ZERO,
        data: encode_call(UPDATE_FACTORY_SIGNATURE, &[AbiValue::Address(factory)]),
    }
}

/// Call payload creating a campaign on the final factory
/// (`createCampaign(creator, goal_wei, token, campaign_uri)`).
pub fn create_campaign_call(
    factory: Address,
    creator: Address,
    goal_wei: U256,
    token: Address,
    campaign_uri: &str,
) -> UserOpCall {
    UserOpCall {
        to: factory,
        value: U256::ZERO,
        data: encode_call(
            CREATE_CAMPAIGN_SIGNATURE,
            &[
                AbiValue::Address(creator),
                AbiValue::Uint(goal_wei),
                AbiValue::Address(token),
                AbiValue::Str(campaign_uri.to_string()),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    const NFT: Address = address!("2222222222222222222222222222222222222222");
    const FACTORY: Address = address!("1111111111111111111111111111111111111111");
    const OWNER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

    #[test]
    fn static_args_encode_as_padded_words() {
        let encoded = encode_args(&[AbiValue::Address(OWNER), AbiValue::Uint(U256::from(7u64))]);

        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[..12], &[0u8; 12][..]);
        assert_eq!(&encoded[12..32], OWNER.as_slice());
        assert_eq!(encoded[63], 7);
    }

    #[test]
    fn trailing_string_gets_offset_length_and_padding() {
        // (address, string, address): three head words, string tail after.
        let encoded = encode_args(&[
            AbiValue::Address(FACTORY),
            AbiValue::Str("ipfs://".to_string()),
            AbiValue::Address(OWNER),
        ]);

        // 3 head words + length word + one padded payload word.
        assert_eq!(encoded.len(), 3 * 32 + 32 + 32);

        // Offset word points past the head block (0x60).
        let offset = U256::from_be_slice(&encoded[32..64]);
        assert_eq!(offset, U256::from(96u64));

        // Length word holds the byte length of "ipfs://".
        let length = U256::from_be_slice(&encoded[96..128]);
        assert_eq!(length, U256::from(7u64));

        // Payload is the string, zero-padded to the word boundary.
        assert_eq!(&encoded[128..135], b"ipfs://".as_slice());
        assert_eq!(&encoded[135..160], &[0u8; 25][..]);
    }

    #[test]
    fn string_of_exact_word_length_is_not_padded() {
        let s = "a".repeat(32);
        let encoded = encode_args(&[AbiValue::Str(s)]);
        // Offset word + length word + exactly one payload word.
        assert_eq!(encoded.len(), 32 + 32 + 32);
    }

    #[test]
    fn encode_call_prefixes_keccak_selector() {
        let data = encode_call(UPDATE_FACTORY_SIGNATURE, &[AbiValue::Address(FACTORY)]);

        assert_eq!(data.len(), 4 + 32);
        assert_eq!(
            &data[..4],
            &keccak256(UPDATE_FACTORY_SIGNATURE.as_bytes())[..4]
        );
        assert_eq!(&data[16..36], FACTORY.as_slice());
    }

    #[test]
    fn deploy_data_concatenates_bytecode_and_args() {
        let bytecode = Bytes::from(vec![0x60, 0x80, 0x60, 0x40]);
        let data = deploy_data(&bytecode, &[AbiValue::Address(NFT)]).unwrap();

        assert_eq!(&data[..4], bytecode.as_ref());
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[16..36], NFT.as_slice());
    }

    #[test]
    fn empty_bytecode_is_rejected() {
        let result = deploy_data(&Bytes::new(), &[]);
        assert!(matches!(result, Err(DeployError::InvalidArtifact(_))));
    }

    #[test]
    fn creation_calls_target_zero_address() {
        let bytecode = Bytes::from(vec![0x60, 0x80]);
        let call = factory_deploy_call(&bytecode, Address::ZERO, OWNER).unwrap();
        assert!(call.is_creation());
        assert_eq!(call.value, U256::ZERO);

        let call = update_factory_call(NFT, FACTORY);
        assert!(!call.is_creation());
        assert_eq!(call.to, NFT);
    }

    #[test]
    fn create_campaign_call_references_the_final_factory() {
        let call = create_campaign_call(
            FACTORY,
            OWNER,
            U256::from(100u64),
            Address::ZERO,
            "data:application/json,%7B%7D",
        );

        assert_eq!(call.to, FACTORY);
        assert_eq!(
            &call.data[..4],
            &keccak256(CREATE_CAMPAIGN_SIGNATURE.as_bytes())[..4]
        );
    }

    #[test]
    fn user_op_call_serializes_with_hex_prefixes() {
        let call = update_factory_call(NFT, FACTORY);
        let json = serde_json::to_value(&call).unwrap();

        let to = json["to"].as_str().unwrap();
        let data = json["data"].as_str().unwrap();
        assert!(to.starts_with("0x"));
        assert!(data.starts_with("0x"));
    }
}
