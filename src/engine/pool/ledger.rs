// Vaultdesk Engine — Ledger Transport seam
//
// The controller never talks to a chain directly. Reads, writes and receipt
// checks go through `LedgerTransport`; `rpc::RpcLedger` is the JSON-RPC
// implementation and tests plug in in-memory fakes.

use super::abi::decode_uint_word;
use super::intents::TransactionIntent;
use crate::atoms::error::EngineResult;
use crate::atoms::types::{Address, BaseUnits};
use async_trait::async_trait;
use log::warn;

/// Tagged outcome of a balance-style read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    /// No answer yet.
    Pending,
    /// A well-formed uint256 that fits the snapshot.
    Value(BaseUnits),
    /// Some other shape came back; discard it.
    Unexpected,
}

impl ReadResult {
    /// Classify raw `eth_call` return data. A well-formed word above
    /// `u128::MAX` does not fit a snapshot and is unexpected too.
    pub fn from_return_data(data: &[u8]) -> Self {
        match decode_uint_word(data) {
            Some(v) => ReadResult::Value(v),
            None if data.len() == 32 => {
                warn!("[pool] uint256 result exceeds u128, balance left unresolved");
                ReadResult::Unexpected
            }
            None => ReadResult::Unexpected,
        }
    }
}

/// Mined state of a submitted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Pending,
    Success,
    Reverted,
}

#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Read-only contract call; returns the raw return data.
    async fn read(&self, contract: Address, calldata: &[u8]) -> EngineResult<Vec<u8>>;

    /// Submit a write from `from`; returns the transaction hash.
    /// Rejections (insufficient allowance, balance, reverts caught at
    /// estimation) come back as errors and are not interpreted further.
    async fn send(&self, from: Option<Address>, intent: &TransactionIntent) -> EngineResult<String>;

    /// Receipt lookup for a previously returned hash.
    async fn receipt(&self, tx_hash: &str) -> EngineResult<ReceiptStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pool::abi::abi_encode_uint256;

    #[test]
    fn classifies_return_data() {
        assert_eq!(ReadResult::from_return_data(&abi_encode_uint256(2_000_000)), ReadResult::Value(2_000_000));
        assert_eq!(ReadResult::from_return_data(&[]), ReadResult::Unexpected);
        assert_eq!(ReadResult::from_return_data(&[0u8; 64]), ReadResult::Unexpected);
    }

    #[test]
    fn word_above_u128_is_unexpected() {
        let mut word = [0u8; 32];
        word[15] = 1;
        assert_eq!(ReadResult::from_return_data(&word), ReadResult::Unexpected);
        word[15] = 0;
        word[31] = 7;
        assert_eq!(ReadResult::from_return_data(&word), ReadResult::Value(7));
    }
}
