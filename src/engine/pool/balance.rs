// Vaultdesk Engine — Balance Reader
//
// Two read-only pool queries:
//   balanceOf(owner)          → share balance
//   convertToAssets(shares)   → value of those shares in the underlying asset
// The conversion always takes the latest *successful* share balance as its
// input; until one exists it is not issued. Each query carries its own
// loading/success flags so a caller can tell "balance known, conversion
// pending" from "nothing known yet".

use super::abi::{encode_balance_of, encode_convert_to_assets};
use super::ledger::{LedgerTransport, ReadResult};
use crate::atoms::error::EngineResult;
use crate::atoms::types::{Address, BaseUnits};
use log::{debug, warn};

/// Latest state of one read query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryState {
    /// Last accepted value. Survives later failures and in-flight refreshes.
    pub value: Option<BaseUnits>,
    pub loading: bool,
    pub success: bool,
}

impl QueryState {
    fn begin(&mut self) {
        self.loading = true;
    }

    /// Returns whether the stored value changed.
    fn apply(&mut self, result: ReadResult) -> bool {
        match result {
            ReadResult::Value(v) => {
                let changed = self.value != Some(v);
                self.value = Some(v);
                self.loading = false;
                self.success = true;
                changed
            }
            // unexpected shapes are dropped and the query reads as loading
            ReadResult::Pending | ReadResult::Unexpected => {
                self.loading = true;
                false
            }
        }
    }

    fn fail(&mut self) {
        self.loading = false;
        self.success = false;
    }
}

/// The user's position in share and asset units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub share_balance: Option<BaseUnits>,
    pub asset_balance: Option<BaseUnits>,
}

/// What the display can honestly say about the asset balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStatus {
    /// No share balance yet.
    Unknown,
    /// Shares known, conversion still loading.
    Converting { shares: BaseUnits },
    Known { shares: Option<BaseUnits>, assets: BaseUnits },
}

/// `balanceOf(owner)` on the pool.
pub async fn read_share_balance<L: LedgerTransport + ?Sized>(
    ledger: &L,
    pool: Address,
    owner: Address,
) -> EngineResult<ReadResult> {
    let data = ledger.read(pool, &encode_balance_of(&owner)).await?;
    Ok(ReadResult::from_return_data(&data))
}

/// `convertToAssets(shares)` on the pool.
pub async fn convert_shares_to_assets<L: LedgerTransport + ?Sized>(
    ledger: &L,
    pool: Address,
    shares: BaseUnits,
) -> EngineResult<ReadResult> {
    let data = ledger.read(pool, &encode_convert_to_assets(shares)).await?;
    Ok(ReadResult::from_return_data(&data))
}

#[derive(Debug, Clone, Default)]
pub struct BalanceReader {
    share: QueryState,
    assets: QueryState,
}

impl BalanceReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn share(&self) -> &QueryState {
        &self.share
    }

    pub fn assets(&self) -> &QueryState {
        &self.assets
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot { share_balance: self.share.value, asset_balance: self.assets.value }
    }

    pub fn status(&self) -> BalanceStatus {
        match (self.share.value, self.assets.value) {
            (_, Some(assets)) if !self.assets.loading => BalanceStatus::Known { shares: self.share.value, assets },
            (Some(shares), _) => BalanceStatus::Converting { shares },
            (None, _) => BalanceStatus::Unknown,
        }
    }

    // ── Event-level API (for callback-driven transports) ───────────────

    pub fn begin_share_read(&mut self) {
        self.share.begin();
    }

    /// Returns whether the share balance changed.
    pub fn complete_share_read(&mut self, result: EngineResult<ReadResult>) -> bool {
        match result {
            Ok(r) => {
                if r == ReadResult::Unexpected {
                    debug!("[pool] Discarded share balance with unexpected shape");
                }
                self.share.apply(r)
            }
            Err(e) => {
                warn!("[pool] Share balance read failed: {}", e);
                self.share.fail();
                false
            }
        }
    }

    /// Input for the conversion query: the latest successful share balance.
    pub fn conversion_input(&self) -> Option<BaseUnits> {
        self.share.value
    }

    pub fn begin_conversion(&mut self) {
        self.assets.begin();
    }

    pub fn complete_conversion(&mut self, result: EngineResult<ReadResult>) {
        match result {
            Ok(r) => {
                if r == ReadResult::Unexpected {
                    debug!("[pool] Discarded asset conversion with unexpected shape");
                }
                self.assets.apply(r);
            }
            Err(e) => {
                warn!("[pool] Share→asset conversion failed: {}", e);
                self.assets.fail();
            }
        }
    }

    // ── Driver ──────────────────────────────────────────────────────────

    /// Re-read the share balance, then re-derive the asset value from the
    /// latest successful share balance.
    pub async fn refresh<L: LedgerTransport + ?Sized>(&mut self, ledger: &L, pool: Address, owner: Address) {
        self.begin_share_read();
        let share_result = read_share_balance(ledger, pool, owner).await;
        self.complete_share_read(share_result);
        self.refresh_conversion(ledger, pool).await;
    }

    /// Conversion only; a no-op until a share balance is known.
    pub async fn refresh_conversion<L: LedgerTransport + ?Sized>(&mut self, ledger: &L, pool: Address) {
        let Some(shares) = self.conversion_input() else {
            debug!("[pool] No share balance yet, conversion not issued");
            return;
        };
        self.begin_conversion();
        let result = convert_shares_to_assets(ledger, pool, shares).await;
        self.complete_conversion(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_distinguishes_unknown_converting_known() {
        let mut reader = BalanceReader::new();
        assert_eq!(reader.status(), BalanceStatus::Unknown);

        reader.begin_share_read();
        assert!(reader.share().loading);
        assert!(reader.complete_share_read(Ok(ReadResult::Value(2_000_000))));
        reader.begin_conversion();
        assert_eq!(reader.status(), BalanceStatus::Converting { shares: 2_000_000 });

        reader.complete_conversion(Ok(ReadResult::Value(2_100_000)));
        assert_eq!(reader.status(), BalanceStatus::Known { shares: Some(2_000_000), assets: 2_100_000 });
    }

    #[test]
    fn unexpected_shape_is_discarded_and_reads_as_loading() {
        let mut reader = BalanceReader::new();
        reader.complete_share_read(Ok(ReadResult::Value(5)));
        reader.complete_conversion(Ok(ReadResult::Value(6)));

        reader.begin_conversion();
        reader.complete_conversion(Ok(ReadResult::Unexpected));
        assert!(reader.assets().loading);
        assert_eq!(reader.assets().value, Some(6));
        assert_eq!(reader.status(), BalanceStatus::Converting { shares: 5 });
    }

    #[test]
    fn failure_keeps_last_value() {
        let mut reader = BalanceReader::new();
        reader.complete_share_read(Ok(ReadResult::Value(9)));
        reader.begin_share_read();
        assert!(!reader.complete_share_read(Err("rpc down".into())));
        assert_eq!(reader.share().value, Some(9));
        assert!(!reader.share().loading);
        assert!(!reader.share().success);
        assert_eq!(reader.conversion_input(), Some(9));
    }

    #[test]
    fn same_value_reports_unchanged() {
        let mut reader = BalanceReader::new();
        assert!(reader.complete_share_read(Ok(ReadResult::Value(1))));
        assert!(!reader.complete_share_read(Ok(ReadResult::Value(1))));
        assert!(reader.complete_share_read(Ok(ReadResult::Value(2))));
    }
}
