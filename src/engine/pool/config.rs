// Vaultdesk Engine — Network Table & Config Resolver
//
// Static chain → pool table, loaded once at process start from TOML.
// `resolve()` is the only lookup the controller uses: a pure function of
// (chain id, asset symbol) and the table. An unconfigured pair is `None`,
// never an error.

use super::constants::{explorer_tx_url, BUILTIN_NETWORKS_TOML, DEFAULT_CHAIN_ID, DEFAULT_DECIMALS};
use super::primitives::parse_address;
use crate::atoms::constants::{CONFIG_DIR_NAME, NETWORKS_FILE_NAME};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{Address, ChainId};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Whether withdrawing requires the owner to approve pool shares first.
/// The controller only offers the extra approve; it never sequences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawApproval {
    #[default]
    None,
    PoolShares,
}

/// Resolved per-asset pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetConfig {
    pub decimals: u8,
    /// Underlying ERC-20 token.
    pub token: Option<Address>,
    /// Pool (share token) contract.
    pub pool: Option<Address>,
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub name: String,
    pub explorer: Option<String>,
    pub withdraw_approval: WithdrawApproval,
    pub pools: BTreeMap<String, AssetConfig>,
}

#[derive(Debug, Clone)]
pub struct NetworkTable {
    default_chain: ChainId,
    chains: BTreeMap<ChainId, ChainConfig>,
}

// ── Raw TOML shape ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawTable {
    default_chain: Option<ChainId>,
    #[serde(default)]
    chains: BTreeMap<String, RawChain>,
}

#[derive(Deserialize)]
struct RawChain {
    name: Option<String>,
    explorer: Option<String>,
    #[serde(default)]
    withdraw_approval: WithdrawApproval,
    #[serde(default)]
    pool: BTreeMap<String, RawPool>,
}

#[derive(Deserialize)]
struct RawPool {
    dec: Option<toml::Value>,
    token: Option<String>,
    address: Option<String>,
}

/// Decimals as written in the table: integer, whole float, or a string whose
/// leading digits form the number ("6", "18 decimals"). Anything else → None.
fn parse_decimals(raw: Option<&toml::Value>) -> Option<u8> {
    match raw? {
        toml::Value::Integer(i) => u8::try_from(*i).ok(),
        toml::Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= u8::MAX as f64 => Some(*f as u8),
        toml::Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn parse_optional_address(raw: Option<&str>, chain: &str, symbol: &str, field: &str) -> EngineResult<Option<Address>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_address(s).map(Some).map_err(|e| {
            EngineError::Config(format!("chains.{}.pool.{}.{}: {}", chain, symbol, field, e))
        }),
    }
}

impl NetworkTable {
    /// Parse a TOML network table.
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let raw: RawTable = toml::from_str(source)?;
        let mut chains = BTreeMap::new();

        for (key, raw_chain) in raw.chains {
            let chain_id: ChainId = key
                .trim()
                .parse()
                .map_err(|_| EngineError::Config(format!("chain key '{}' is not a numeric chain id", key)))?;

            let mut pools = BTreeMap::new();
            for (symbol, raw_pool) in raw_chain.pool {
                let decimals = parse_decimals(raw_pool.dec.as_ref()).unwrap_or(DEFAULT_DECIMALS);
                let token = parse_optional_address(raw_pool.token.as_deref(), &key, &symbol, "token")?;
                let pool = parse_optional_address(raw_pool.address.as_deref(), &key, &symbol, "address")?;
                pools.insert(symbol, AssetConfig { decimals, token, pool });
            }

            chains.insert(chain_id, ChainConfig {
                name: raw_chain.name.unwrap_or_else(|| super::constants::chain_name(chain_id).to_string()),
                explorer: raw_chain.explorer,
                withdraw_approval: raw_chain.withdraw_approval,
                pools,
            });
        }

        Ok(NetworkTable {
            default_chain: raw.default_chain.unwrap_or(DEFAULT_CHAIN_ID),
            chains,
        })
    }

    /// The table compiled into the binary.
    pub fn builtin() -> EngineResult<Self> {
        Self::from_toml_str(BUILTIN_NETWORKS_TOML)
    }

    /// Load a table from a TOML file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let source = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&source)?;
        info!("[config] Loaded {} chain(s) from {}", table.chains.len(), path.display());
        Ok(table)
    }

    /// Default per-user location: `<config dir>/vaultdesk/networks.toml`.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(NETWORKS_FILE_NAME))
    }

    /// Explicit path if given, else the per-user file if present, else the
    /// built-in table. An explicit path that cannot be read is an error.
    pub fn discover(explicit: Option<&Path>) -> EngineResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = Self::user_path().filter(|p| p.is_file()) {
            return Self::load(&path);
        }
        debug!("[config] No network table override found, using built-in table");
        Self::builtin()
    }

    pub fn default_chain(&self) -> ChainId {
        self.default_chain
    }

    /// The chain the table will actually use for `chain_id`: the id itself if
    /// configured, the designated default otherwise.
    pub fn active_chain(&self, chain_id: Option<ChainId>) -> ChainId {
        match chain_id {
            Some(id) if self.chains.contains_key(&id) => id,
            _ => self.default_chain,
        }
    }

    pub fn chain(&self, chain_id: Option<ChainId>) -> Option<&ChainConfig> {
        self.chains.get(&self.active_chain(chain_id))
    }

    /// Resolve (chain, symbol) to its pool configuration.
    pub fn resolve(&self, chain_id: Option<ChainId>, symbol: &str) -> Option<AssetConfig> {
        self.chain(chain_id)?.pools.get(symbol).copied()
    }

    pub fn withdraw_approval(&self, chain_id: Option<ChainId>) -> WithdrawApproval {
        self.chain(chain_id).map(|c| c.withdraw_approval).unwrap_or_default()
    }

    /// Explorer link prefix for transactions on the active chain.
    pub fn explorer_tx_url(&self, chain_id: Option<ChainId>) -> String {
        let active = self.active_chain(chain_id);
        self.chains
            .get(&active)
            .and_then(|c| c.explorer.clone())
            .unwrap_or_else(|| explorer_tx_url(active).to_string())
    }

    /// Configured asset symbols on the active chain.
    pub fn symbols(&self, chain_id: Option<ChainId>) -> Vec<&str> {
        self.chain(chain_id)
            .map(|c| c.pools.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
        default_chain = 137

        [chains.137]
        name = "Polygon"

        [chains.137.pool.USDC]
        dec = "6"
        token = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
        address = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB"

        [chains.137.pool.DAI]
        token = "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC"
        address = "0xDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDD"

        [chains.137.pool.ODD]
        dec = "lots"
        address = "0xEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEE"

        [chains.10]
        withdraw_approval = "pool_shares"
        explorer = "https://explorer.example/tx/"

        [chains.10.pool.USDC]
        dec = 6
        token = "0x1111111111111111111111111111111111111111"
        address = "0x2222222222222222222222222222222222222222"
    "#;

    fn table() -> NetworkTable {
        NetworkTable::from_toml_str(TABLE).unwrap()
    }

    #[test]
    fn resolves_configured_pair() {
        let cfg = table().resolve(Some(137), "USDC").unwrap();
        assert_eq!(cfg.decimals, 6);
        assert_eq!(cfg.token, Some(Address::new([0xaa; 20])));
        assert_eq!(cfg.pool, Some(Address::new([0xbb; 20])));
    }

    #[test]
    fn unknown_chain_behaves_like_default() {
        let t = table();
        for id in [None, Some(1), Some(56), Some(999_999)] {
            assert_eq!(t.active_chain(id), 137);
            assert_eq!(t.resolve(id, "USDC"), t.resolve(Some(137), "USDC"));
            assert_eq!(t.resolve(id, "DAI"), t.resolve(Some(137), "DAI"));
            assert_eq!(t.resolve(id, "NOPE"), None);
        }
    }

    #[test]
    fn unknown_symbol_is_none() {
        assert_eq!(table().resolve(Some(137), "WBTC"), None);
        assert_eq!(table().resolve(Some(10), "DAI"), None);
        // lookups are exact
        assert_eq!(table().resolve(Some(137), "usdc"), None);
    }

    #[test]
    fn decimals_default_to_18_when_missing_or_non_numeric() {
        let t = table();
        assert_eq!(t.resolve(Some(137), "DAI").unwrap().decimals, 18);
        let odd = t.resolve(Some(137), "ODD").unwrap();
        assert_eq!(odd.decimals, 18);
        assert_eq!(odd.token, None);
        assert_eq!(t.resolve(Some(10), "USDC").unwrap().decimals, 6);
    }

    #[test]
    fn parse_decimals_variants() {
        assert_eq!(parse_decimals(Some(&toml::Value::Integer(8))), Some(8));
        assert_eq!(parse_decimals(Some(&toml::Value::Integer(-1))), None);
        assert_eq!(parse_decimals(Some(&toml::Value::Integer(300))), None);
        assert_eq!(parse_decimals(Some(&toml::Value::Float(6.0))), Some(6));
        assert_eq!(parse_decimals(Some(&toml::Value::Float(6.5))), None);
        assert_eq!(parse_decimals(Some(&toml::Value::String(" 12 ".into()))), Some(12));
        assert_eq!(parse_decimals(Some(&toml::Value::String("6abc".into()))), Some(6));
        assert_eq!(parse_decimals(Some(&toml::Value::String("abc".into()))), None);
        assert_eq!(parse_decimals(Some(&toml::Value::Boolean(true))), None);
        assert_eq!(parse_decimals(None), None);
    }

    #[test]
    fn withdraw_policy_and_explorer_per_chain() {
        let t = table();
        assert_eq!(t.withdraw_approval(Some(137)), WithdrawApproval::None);
        assert_eq!(t.withdraw_approval(Some(10)), WithdrawApproval::PoolShares);
        assert_eq!(t.explorer_tx_url(Some(10)), "https://explorer.example/tx/");
        assert_eq!(t.explorer_tx_url(Some(137)), "https://polygonscan.com/tx/");
        assert_eq!(t.chain(Some(10)).unwrap().name, "Optimism");
    }

    #[test]
    fn malformed_address_fails_the_load() {
        let bad = r#"
            [chains.137.pool.USDC]
            token = "0x1234"
        "#;
        let err = NetworkTable::from_toml_str(bad).unwrap_err();
        assert!(matches!(err, EngineError::Config(ref m) if m.contains("chains.137.pool.USDC.token")));
    }

    #[test]
    fn non_numeric_chain_key_fails_the_load() {
        let bad = r#"
            [chains.polygon]
            name = "Polygon"
        "#;
        assert!(matches!(NetworkTable::from_toml_str(bad), Err(EngineError::Config(_))));
    }

    #[test]
    fn missing_default_chain_uses_constant() {
        let t = NetworkTable::from_toml_str("").unwrap();
        assert_eq!(t.default_chain(), DEFAULT_CHAIN_ID);
        assert_eq!(t.resolve(Some(137), "USDC"), None);
    }

    #[test]
    fn builtin_table_parses() {
        let t = NetworkTable::builtin().unwrap();
        assert_eq!(t.default_chain(), 137);
        let usdc = t.resolve(Some(137), "USDC").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert!(usdc.token.is_some());
        let local = t.resolve(Some(31337), "USDC").unwrap();
        assert!(local.token.is_some() && local.pool.is_some());
        assert_eq!(t.symbols(Some(137)), vec!["USDC", "WETH"]);
    }
}
