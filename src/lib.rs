// Vaultdesk — position controller for share-based liquidity pools.
//
// atoms   — pure types, constants and the error enum
// engine  — config resolution, amount codec, intents, balance reads, RPC

pub mod atoms;
pub mod engine;

pub use atoms::error::{EngineError, EngineResult};
pub use atoms::types::{Address, BaseUnits, ChainId, MarketStats, Session};
pub use engine::pool::{
    Action, AssetConfig, LedgerTransport, NetworkTable, PendingAmount, PositionCard, PositionController,
    RpcLedger, SubmitOutcome, TransactionIntent, WriteState, WriteStatus,
};
