// Vaultdesk Engine — Pool ABI Encoding
// Head-only EVM ABI encoding for the ERC-20 / ERC-4626 calls the controller
// issues, and strict decoding of single-word uint256 returns.

use super::primitives::keccak256;
use crate::atoms::types::{Address, BaseUnits};
use std::fmt;

pub(crate) const SIG_APPROVE: &str = "approve(address,uint256)";
pub(crate) const SIG_DEPOSIT: &str = "deposit(uint256,address)";
pub(crate) const SIG_WITHDRAW: &str = "withdraw(uint256,address,address)";
pub(crate) const SIG_BALANCE_OF: &str = "balanceOf(address)";
pub(crate) const SIG_CONVERT_TO_ASSETS: &str = "convertToAssets(uint256)";

/// A static ABI argument. Every call the pool controller makes uses only
/// these two head types, so no dynamic offsets are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(BaseUnits),
}

impl AbiValue {
    /// 32-byte head encoding
    pub fn encode(&self) -> [u8; 32] {
        match self {
            AbiValue::Address(addr) => abi_encode_address(addr),
            AbiValue::Uint(v) => abi_encode_uint256(*v),
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Address(a) => write!(f, "{}", a),
            AbiValue::Uint(v) => write!(f, "{}", v),
        }
    }
}

/// Compute 4-byte function selector from signature
pub fn function_selector(sig: &str) -> [u8; 4] {
    let hash = keccak256(sig.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[..4]);
    sel
}

/// ABI-encode an address (left-padded to 32 bytes)
pub(crate) fn abi_encode_address(addr: &Address) -> [u8; 32] {
    let mut encoded = [0u8; 32];
    encoded[12..].copy_from_slice(addr.as_bytes());
    encoded
}

/// ABI-encode a uint256 from a u128 (upper 16 bytes zero)
pub fn abi_encode_uint256(val: BaseUnits) -> [u8; 32] {
    let mut encoded = [0u8; 32];
    encoded[16..].copy_from_slice(&val.to_be_bytes());
    encoded
}

/// selector || head(args)
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    let mut data = function_selector(signature).to_vec();
    for arg in args {
        data.extend_from_slice(&arg.encode());
    }
    data
}

/// Encode ERC-20 balanceOf(address) — pool shares are the pool's own ERC-20
pub(crate) fn encode_balance_of(owner: &Address) -> Vec<u8> {
    encode_call(SIG_BALANCE_OF, &[AbiValue::Address(*owner)])
}

/// Encode ERC-4626 convertToAssets(uint256)
pub(crate) fn encode_convert_to_assets(shares: BaseUnits) -> Vec<u8> {
    encode_call(SIG_CONVERT_TO_ASSETS, &[AbiValue::Uint(shares)])
}

/// Decode a single uint256 return word.
/// Returns None unless the data is exactly one 32-byte word whose value fits
/// in a u128; anything else is an unexpected shape, not a number to coerce.
pub(crate) fn decode_uint_word(data: &[u8]) -> Option<BaseUnits> {
    if data.len() != 32 || data[..16].iter().any(|&b| b != 0) {
        return None;
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&data[16..]);
    Some(BaseUnits::from_be_bytes(low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pool::primitives::hex_encode;

    #[test]
    fn function_selector_approve() {
        // keccak256("approve(address,uint256)") first 4 bytes = 0x095ea7b3
        assert_eq!(hex_encode(&function_selector(SIG_APPROVE)), "0x095ea7b3");
    }

    #[test]
    fn function_selector_balance_of() {
        assert_eq!(hex_encode(&function_selector(SIG_BALANCE_OF)), "0x70a08231");
    }

    #[test]
    fn function_selectors_erc4626() {
        assert_eq!(hex_encode(&function_selector(SIG_DEPOSIT)), "0x6e553f65");
        assert_eq!(hex_encode(&function_selector(SIG_WITHDRAW)), "0xb460af94");
        assert_eq!(hex_encode(&function_selector(SIG_CONVERT_TO_ASSETS)), "0x07a2d13a");
    }

    #[test]
    fn abi_encode_address_padding() {
        let encoded = abi_encode_address(&Address::new([0xabu8; 20]));
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..], &[0xabu8; 20]);
    }

    #[test]
    fn abi_encode_uint256_big_endian() {
        let encoded = abi_encode_uint256(10_500_000);
        assert_eq!(&encoded[..29], &[0u8; 29]);
        assert_eq!(&encoded[29..], &[0xa0, 0x37, 0xa0]);
    }

    #[test]
    fn encode_balance_of_length() {
        let data = encode_balance_of(&Address::new([1u8; 20]));
        assert_eq!(data.len(), 4 + 32);
    }

    #[test]
    fn decode_uint_word_accepts_only_one_word() {
        let word = abi_encode_uint256(2_000_000);
        assert_eq!(decode_uint_word(&word), Some(2_000_000));
        assert_eq!(decode_uint_word(&word[1..]), None);
        assert_eq!(decode_uint_word(&[]), None);

        let mut two_words = word.to_vec();
        two_words.extend_from_slice(&word);
        assert_eq!(decode_uint_word(&two_words), None);

        let mut huge = [0u8; 32];
        huge[0] = 1;
        assert_eq!(decode_uint_word(&huge), None);
    }
}
