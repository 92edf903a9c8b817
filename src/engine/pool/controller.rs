// Vaultdesk Engine — Position Controller
//
// Orchestrates one pool card: owns the pending amount, observes the session
// (address, connection, chain) it is handed, derives config and intents from
// those inputs on every access, submits writes only on explicit request, and
// drives the balance reader.
//
// Derived values (config, intents, displayed balance) are never stored;
// they are recomputed from the current inputs each time they are asked for.

use super::amount::{to_display_units, PendingAmount};
use super::balance::{BalanceReader, BalanceStatus, PositionSnapshot};
use super::config::{AssetConfig, NetworkTable, WithdrawApproval};
use super::constants::DEFAULT_DECIMALS;
use super::display::PositionCard;
use super::intents::{
    prepare_approve, prepare_deposit, prepare_share_approve, prepare_withdraw, Action, TransactionIntent,
};
use super::ledger::{LedgerTransport, ReceiptStatus};
use crate::atoms::types::{ChainId, MarketStats, Session};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteStatus {
    #[default]
    Idle,
    /// Sent, or waiting for the receipt.
    Loading,
    Success,
    /// Rejected by the ledger or reverted.
    Failed,
}

/// Per-action write flags, as exposed to the display layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteState {
    pub status: WriteStatus,
    pub tx_hash: Option<String>,
}

impl WriteState {
    pub fn is_loading(&self) -> bool {
        self.status == WriteStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == WriteStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The intent could not be prepared; nothing was sent.
    NotPrepared,
    Submitted { tx_hash: String },
    /// The transport refused the write.
    Rejected,
}

pub struct PositionController {
    table: Arc<NetworkTable>,
    asset: String,
    session: Session,
    amount: PendingAmount,
    balances: BalanceReader,
    writes: BTreeMap<Action, WriteState>,
    refresh_due: bool,
}

impl PositionController {
    pub fn new(table: Arc<NetworkTable>, asset: impl Into<String>, session: Session) -> Self {
        PositionController {
            table,
            asset: asset.into(),
            session,
            amount: PendingAmount::Empty,
            balances: BalanceReader::new(),
            writes: BTreeMap::new(),
            refresh_due: true,
        }
    }

    // ── Inputs ──────────────────────────────────────────────────────────

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn pending_amount(&self) -> PendingAmount {
        self.amount
    }

    /// Wallet/network change notification. The pending amount is kept.
    pub fn on_session_change(&mut self, session: Session) {
        if session == self.session {
            return;
        }
        info!(
            "[pool] Session changed: connected={} address={:?} chain={:?}",
            session.connected, session.address, session.chain_id
        );
        self.session = session;
        self.refresh_due = true;
    }

    /// Switch the card to another asset. The pending amount, balances and
    /// write states belong to the previous asset's decimals and pool, and
    /// are dropped.
    pub fn set_asset(&mut self, symbol: impl Into<String>) {
        let symbol = symbol.into();
        if symbol == self.asset {
            return;
        }
        info!("[pool] Asset changed: {} → {}", self.asset, symbol);
        self.asset = symbol;
        self.amount = PendingAmount::Empty;
        self.balances = BalanceReader::new();
        self.writes.clear();
        self.refresh_due = true;
    }

    /// Feed the raw text of the amount field. Invalid text leaves the pending
    /// amount untouched. Returns whether the text parsed.
    pub fn on_amount_input(&mut self, input: &str) -> bool {
        let before = self.amount;
        let decimals = self.decimals().unwrap_or(DEFAULT_DECIMALS);
        let accepted = self.amount.apply(input, decimals);
        if !accepted {
            debug!("[pool] Ignoring unparseable amount {:?}", input);
        } else if self.amount != before {
            self.refresh_due = true;
        }
        accepted
    }

    // ── Derived ─────────────────────────────────────────────────────────

    pub fn active_chain(&self) -> ChainId {
        self.table.active_chain(self.session.chain_id)
    }

    pub fn config(&self) -> Option<AssetConfig> {
        self.table.resolve(self.session.chain_id, &self.asset)
    }

    pub fn decimals(&self) -> Option<u8> {
        self.config().map(|c| c.decimals)
    }

    pub fn withdraw_approval(&self) -> WithdrawApproval {
        self.table.withdraw_approval(self.session.chain_id)
    }

    /// Actions this card offers on the active chain.
    pub fn available_actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| *a != Action::ApproveShares || self.withdraw_approval() == WithdrawApproval::PoolShares)
            .collect()
    }

    /// The intent for `action` given the current inputs, if preparable.
    pub fn intent(&self, action: Action) -> Option<TransactionIntent> {
        let cfg = self.config();
        let wallet = self.session.wallet();
        let amount = self.amount.value();
        match action {
            Action::Approve => prepare_approve(cfg.as_ref(), wallet, amount),
            Action::ApproveShares => match self.withdraw_approval() {
                WithdrawApproval::PoolShares => prepare_share_approve(cfg.as_ref(), wallet, amount),
                WithdrawApproval::None => None,
            },
            Action::Deposit => prepare_deposit(cfg.as_ref(), wallet, amount),
            Action::Withdraw => prepare_withdraw(cfg.as_ref(), wallet, amount),
        }
    }

    pub fn is_preparable(&self, action: Action) -> bool {
        self.intent(action).is_some()
    }

    // ── Balances ────────────────────────────────────────────────────────

    pub fn balances(&self) -> &BalanceReader {
        &self.balances
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        self.balances.snapshot()
    }

    /// True after any input the balances depend on has changed.
    pub fn needs_refresh(&self) -> bool {
        self.refresh_due
    }

    /// Re-read share balance and its asset value. Skipped (keeping the last
    /// known values) while there is no connected wallet or no pool address.
    /// Returns whether reads were issued.
    pub async fn refresh<L: LedgerTransport + ?Sized>(&mut self, ledger: &L) -> bool {
        self.refresh_due = false;
        let (Some(owner), Some(pool)) = (self.session.wallet(), self.config().and_then(|c| c.pool)) else {
            debug!("[pool] {}: no wallet or pool address, balances not fetched", self.asset);
            return false;
        };
        self.balances.refresh(ledger, pool, owner).await;
        true
    }

    /// Asset balance in display units, `None` while loading or unknown.
    pub fn balance_display(&self) -> Option<f64> {
        match self.balances.status() {
            BalanceStatus::Known { assets, .. } => {
                Some(to_display_units(assets, self.decimals().unwrap_or(DEFAULT_DECIMALS)))
            }
            BalanceStatus::Converting { .. } | BalanceStatus::Unknown => None,
        }
    }

    pub fn card(&self, stats: MarketStats) -> PositionCard {
        PositionCard { asset: self.asset.clone(), balance: self.balance_display(), stats }
    }

    // ── Writes ──────────────────────────────────────────────────────────

    pub fn write_state(&self, action: Action) -> WriteState {
        self.writes.get(&action).cloned().unwrap_or_default()
    }

    /// Submit `action` if it is preparable. Writes are independent: nothing
    /// here waits for an earlier approve before sending a deposit.
    pub async fn submit<L: LedgerTransport + ?Sized>(&mut self, action: Action, ledger: &L) -> SubmitOutcome {
        let Some(intent) = self.intent(action) else {
            debug!("[pool] {} not prepared, nothing to submit", action);
            return SubmitOutcome::NotPrepared;
        };
        let from = self.session.wallet();

        self.writes.insert(action, WriteState { status: WriteStatus::Loading, tx_hash: None });
        info!("[pool] Submitting {}", intent);

        match ledger.send(from, &intent).await {
            Ok(tx_hash) => {
                info!("[pool] {} tx: {}", action, tx_hash);
                self.writes.insert(action, WriteState { status: WriteStatus::Loading, tx_hash: Some(tx_hash.clone()) });
                SubmitOutcome::Submitted { tx_hash }
            }
            Err(e) => {
                warn!("[pool] {} rejected: {}", action, e);
                self.writes.insert(action, WriteState { status: WriteStatus::Failed, tx_hash: None });
                SubmitOutcome::Rejected
            }
        }
    }

    /// Check receipts once for every in-flight write. A mined deposit or
    /// withdraw marks balances for refresh.
    pub async fn settle_writes<L: LedgerTransport + ?Sized>(&mut self, ledger: &L) {
        let in_flight: Vec<(Action, String)> = self
            .writes
            .iter()
            .filter(|(_, w)| w.is_loading())
            .filter_map(|(a, w)| w.tx_hash.clone().map(|h| (*a, h)))
            .collect();

        for (action, tx_hash) in in_flight {
            let status = match ledger.receipt(&tx_hash).await {
                Ok(ReceiptStatus::Pending) => continue,
                Ok(ReceiptStatus::Success) => WriteStatus::Success,
                Ok(ReceiptStatus::Reverted) => WriteStatus::Failed,
                Err(e) => {
                    warn!("[pool] Receipt lookup for {} failed: {}", tx_hash, e);
                    continue;
                }
            };
            info!("[pool] {} {} → {:?}", action, tx_hash, status);
            if status == WriteStatus::Success && matches!(action, Action::Deposit | Action::Withdraw) {
                self.refresh_due = true;
            }
            self.writes.insert(action, WriteState { status, tx_hash: Some(tx_hash) });
        }
    }

    /// Explorer URL for a transaction on the active chain.
    pub fn explorer_link(&self, tx_hash: &str) -> String {
        format!("{}{}", self.table.explorer_tx_url(self.session.chain_id), tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::Address;
    use crate::engine::pool::intents::PoolCall;
    use crate::engine::pool::ledger::ReadResult;

    const WALLET: Address = Address::new([0x11; 20]);

    fn table() -> Arc<NetworkTable> {
        Arc::new(
            NetworkTable::from_toml_str(
                r#"
                default_chain = 137
                [chains.137.pool.USDC]
                dec = "6"
                token = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
                address = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB"
                [chains.137.pool.WETH]
                dec = 18
                token = "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC"
                address = "0xDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDD"
                [chains.10]
                withdraw_approval = "pool_shares"
                [chains.10.pool.USDC]
                dec = 6
                token = "0x1111111111111111111111111111111111111111"
                address = "0x2222222222222222222222222222222222222222"
                "#,
            )
            .unwrap(),
        )
    }

    fn controller() -> PositionController {
        PositionController::new(table(), "USDC", Session::connected(WALLET, Some(137)))
    }

    #[test]
    fn nothing_preparable_before_an_amount() {
        let c = controller();
        assert_eq!(c.pending_amount(), PendingAmount::Empty);
        for action in Action::ALL {
            assert!(!c.is_preparable(action));
        }
    }

    #[test]
    fn amount_input_drives_intents() {
        let mut c = controller();
        assert!(c.on_amount_input("10.5"));
        assert_eq!(c.pending_amount(), PendingAmount::Valid(10_500_000));
        assert_eq!(
            c.intent(Action::Deposit).unwrap().call,
            PoolCall::Deposit { amount: 10_500_000, receiver: WALLET }
        );
        assert!(c.is_preparable(Action::Approve));
        assert!(c.is_preparable(Action::Withdraw));
        assert!(!c.is_preparable(Action::ApproveShares));
    }

    #[test]
    fn bad_input_keeps_amount_and_refresh_flag() {
        let mut c = controller();
        c.on_amount_input("3");
        c.refresh_due = false;
        assert!(!c.on_amount_input("abc"));
        assert_eq!(c.pending_amount(), PendingAmount::Valid(3_000_000));
        assert!(!c.needs_refresh());
        // same value again is not a change
        assert!(c.on_amount_input("3.0"));
        assert!(!c.needs_refresh());
        assert!(c.on_amount_input("4"));
        assert!(c.needs_refresh());
    }

    #[test]
    fn session_change_keeps_amount_and_marks_refresh() {
        let mut c = controller();
        c.on_amount_input("1");
        c.refresh_due = false;
        c.on_session_change(Session::disconnected(Some(137)));
        assert!(c.needs_refresh());
        assert_eq!(c.pending_amount(), PendingAmount::Valid(1_000_000));
        for action in Action::ALL {
            assert!(!c.is_preparable(action));
        }
    }

    #[test]
    fn identical_session_is_not_a_change() {
        let mut c = controller();
        c.refresh_due = false;
        c.on_session_change(Session::connected(WALLET, Some(137)));
        assert!(!c.needs_refresh());
    }

    #[test]
    fn share_approval_offered_only_under_policy() {
        let mut c = controller();
        c.on_amount_input("1");
        assert_eq!(c.available_actions(), vec![Action::Approve, Action::Deposit, Action::Withdraw]);

        c.on_session_change(Session::connected(WALLET, Some(10)));
        assert_eq!(c.available_actions(), Action::ALL.to_vec());
        let intent = c.intent(Action::ApproveShares).unwrap();
        assert_eq!(intent.contract, Address::new([0x22; 20]));
    }

    #[test]
    fn unknown_asset_resolves_nothing() {
        let mut c = controller();
        c.set_asset("WBTC");
        c.on_amount_input("1");
        assert_eq!(c.config(), None);
        for action in Action::ALL {
            assert!(!c.is_preparable(action));
        }
    }

    #[test]
    fn asset_switch_drops_amount_scaled_for_previous_asset() {
        let mut c = controller();
        c.on_amount_input("1");
        c.balances.complete_share_read(Ok(ReadResult::Value(2_000_000)));
        c.balances.complete_conversion(Ok(ReadResult::Value(2_100_000)));
        assert_eq!(c.balance_display(), Some(2.1));

        c.set_asset("WETH");
        assert_eq!(c.pending_amount(), PendingAmount::Empty);
        assert_eq!(c.balance_display(), None);
        assert_eq!(c.snapshot(), PositionSnapshot::default());
        for action in Action::ALL {
            assert!(!c.is_preparable(action));
        }

        c.on_amount_input("1");
        assert_eq!(c.pending_amount(), PendingAmount::Valid(1_000_000_000_000_000_000));
    }

    #[test]
    fn explorer_link_uses_active_chain() {
        let c = controller();
        assert_eq!(c.explorer_link("0xabc"), "https://polygonscan.com/tx/0xabc");
    }
}
