// ── Vaultdesk Atoms: Constants ────────────────────────────────────────────
// Crate-wide named constants. Chain-specific values (default chain, explorer
// URLs) live in engine/pool/constants.rs next to the code that uses them.

// ── Configuration discovery ───────────────────────────────────────────────
// Environment variables read by the CLI (clap `env`) and by
// `NetworkTable::discover()`.
pub const ENV_CONFIG_PATH: &str = "VAULTDESK_CONFIG";
pub const ENV_RPC_URL: &str = "VAULTDESK_RPC_URL";
pub const ENV_ACCOUNT: &str = "VAULTDESK_ACCOUNT";

/// Directory under the platform config dir (`dirs::config_dir()`).
pub const CONFIG_DIR_NAME: &str = "vaultdesk";
/// Network table file name inside `CONFIG_DIR_NAME`.
pub const NETWORKS_FILE_NAME: &str = "networks.toml";

// ── JSON-RPC transport ────────────────────────────────────────────────────
pub const RPC_TIMEOUT_SECS: u64 = 30;
/// Gas estimates are padded to this percentage before sending (120 = +20%).
pub const GAS_BUFFER_PCT: u64 = 120;
/// Used when `eth_estimateGas` itself fails; the node still arbitrates.
pub const FALLBACK_GAS_LIMIT: u64 = 300_000;
