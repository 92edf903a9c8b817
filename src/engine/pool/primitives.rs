// Vaultdesk Engine — Pool Ethereum Primitives
// Keccak, hex, EIP-55 checksum and address parsing.

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::Address;
use std::fmt;
use std::str::FromStr;

pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    use tiny_keccak::{Hasher, Keccak};
    let mut digest = [0u8; 32];
    let mut keccak = Keccak::v256();
    keccak.update(data);
    keccak.finalize(&mut digest);
    digest
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Lowercase hex with a `0x` prefix.
pub fn hex_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(2 + data.len() * 2);
    out.push_str("0x");
    for b in data {
        out.push(HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

fn nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Decode hex with or without `0x`. Odd-length quantities from RPC nodes
/// ("0x0", "0x1a3") get an implicit leading zero; "0x" is empty.
pub fn hex_decode(s: &str) -> EngineResult<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s).as_bytes();
    let mut out = Vec::with_capacity(digits.len().div_ceil(2));
    let (head, rest) = digits.split_at(digits.len() % 2);
    let bad = |at: usize| EngineError::Other(format!("Hex decode: invalid digit at offset {}", at));

    if let Some(&c) = head.first() {
        out.push(nibble(c).ok_or_else(|| bad(0))?);
    }
    for (i, pair) in rest.chunks_exact(2).enumerate() {
        let at = head.len() + i * 2;
        let hi = nibble(pair[0]).ok_or_else(|| bad(at))?;
        let lo = nibble(pair[1]).ok_or_else(|| bad(at + 1))?;
        out.push(hi << 4 | lo);
    }
    Ok(out)
}

/// EIP-55: uppercase each hex letter whose keccak nibble is >= 8.
pub(crate) fn eip55_checksum(addr_bytes: &[u8; 20]) -> String {
    let lower = hex_encode(addr_bytes);
    let hash = keccak256(lower[2..].as_bytes());
    let body: String = lower[2..]
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let byte = hash[i / 2];
            let n = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if n >= 8 { c.to_ascii_uppercase() } else { c }
        })
        .collect();
    format!("0x{}", body)
}

/// Parse a `0x`-prefixed, 40-digit address. Checksum case is not enforced.
pub fn parse_address(addr: &str) -> EngineResult<Address> {
    let trimmed = addr.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| EngineError::Other(format!("Address must be 0x-prefixed: '{}'", trimmed)))?;
    if digits.len() != 40 {
        return Err(EngineError::Other(format!("Address must have 40 hex digits: '{}'", trimmed)));
    }
    let bytes: [u8; 20] = hex_decode(digits)?
        .try_into()
        .map_err(|_| EngineError::Other(format!("Address must be 20 bytes: '{}'", trimmed)))?;
    Ok(Address::new(bytes))
}

impl FromStr for Address {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&eip55_checksum(self.as_bytes()))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_encode(self.as_bytes()))
    }
}
