// Vaultdesk Engine — Pool Position Module (ERC-4626-style share pools / EVM)
//
// Submodules:
//   constants   — default chain, decimal fallback, chain names, explorer links
//   primitives  — keccak256, hex encode/decode, EIP-55 address formatting
//   abi         — selectors and head-only ABI encoding for pool/token calls
//   config      — network table: (chain, asset) → decimals, token, pool
//   amount      — decimal text ⇄ integer base units, pending amount
//   intents     — approve / deposit / withdraw intent preparation
//   ledger      — transport seam for reads, writes and receipts
//   rpc         — JSON-RPC implementation of the ledger seam
//   balance     — share balance + share→asset conversion queries
//   display     — position card formatting
//   controller  — per-card orchestration of all of the above

pub mod constants;
pub mod primitives;
pub mod abi;
pub mod config;
pub mod amount;
pub mod intents;
pub mod ledger;
pub mod rpc;
pub mod balance;
pub mod display;
pub mod controller;

pub use amount::{format_units, to_base_units, to_display_units, PendingAmount};
pub use balance::{BalanceReader, BalanceStatus, PositionSnapshot, QueryState};
pub use config::{AssetConfig, ChainConfig, NetworkTable, WithdrawApproval};
pub use controller::{PositionController, SubmitOutcome, WriteState, WriteStatus};
pub use display::PositionCard;
pub use intents::{Action, PoolCall, TransactionIntent};
pub use ledger::{LedgerTransport, ReadResult, ReceiptStatus};
pub use rpc::RpcLedger;
