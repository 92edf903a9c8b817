// Vaultdesk Engine — Pool Constants
// Default chain, decimal fallback, chain names and explorer links.

use crate::atoms::types::ChainId;

/// Chain used when the session reports no chain, or one the table doesn't know.
pub const DEFAULT_CHAIN_ID: ChainId = 137;

/// Precision assumed when a configured asset omits `dec` or it is not numeric.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Built-in network table, used when no override file is found.
pub(crate) const BUILTIN_NETWORKS_TOML: &str = include_str!("../../../config/networks.toml");

/// (chain id, display name, explorer tx prefix) for chains the table may
/// omit `name` / `explorer` on.
const KNOWN_CHAINS: &[(ChainId, &str, &str)] = &[
    (1, "Ethereum Mainnet", "https://etherscan.io/tx/"),
    (10, "Optimism", "https://optimistic.etherscan.io/tx/"),
    (137, "Polygon", "https://polygonscan.com/tx/"),
    (8453, "Base", "https://basescan.org/tx/"),
    (31337, "Local Devnet", "https://etherscan.io/tx/"),
    (42161, "Arbitrum One", "https://arbiscan.io/tx/"),
    (80002, "Polygon Amoy", "https://amoy.polygonscan.com/tx/"),
    (11155111, "Sepolia Testnet", "https://sepolia.etherscan.io/tx/"),
];

fn known(chain_id: ChainId) -> Option<&'static (ChainId, &'static str, &'static str)> {
    KNOWN_CHAINS.iter().find(|(id, _, _)| *id == chain_id)
}

/// Block explorer tx prefix; Etherscan for chains not listed above.
pub fn explorer_tx_url(chain_id: ChainId) -> &'static str {
    known(chain_id).map_or("https://etherscan.io/tx/", |c| c.2)
}

pub fn chain_name(chain_id: ChainId) -> &'static str {
    known(chain_id).map_or("Unknown", |c| c.1)
}
