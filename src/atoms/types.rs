// ── Vaultdesk Atoms: Pure Data Types ──────────────────────────────────────
// Plain struct/enum definitions with no I/O.
// Hex/checksum formatting for `Address` lives in engine/pool/primitives.rs
// because it needs keccak.

/// EVM chain identifier (e.g. 137 for Polygon).
pub type ChainId = u64;

/// Integer token amount in the smallest indivisible unit.
pub type BaseUnits = u128;

/// 20-byte EVM account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

/// Wallet/session context as reported by the external wallet provider.
/// Passed explicitly into the controller — never read from ambient state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub address: Option<Address>,
    pub connected: bool,
    pub chain_id: Option<ChainId>,
}

impl Session {
    pub fn connected(address: Address, chain_id: Option<ChainId>) -> Self {
        Session { address: Some(address), connected: true, chain_id }
    }

    pub fn disconnected(chain_id: Option<ChainId>) -> Self {
        Session { address: None, connected: false, chain_id }
    }

    /// The wallet address usable for intents and reads: present only while
    /// the provider reports a live connection.
    pub fn wallet(&self) -> Option<Address> {
        if self.connected { self.address } else { None }
    }
}

/// Pool-level figures supplied by the caller for display; the controller
/// does not derive these.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketStats {
    /// Annual percentage yield, in percent.
    pub apy: f64,
    /// Pool utilization, in percent.
    pub utilization_rate: f64,
    /// Total deposit volume in display units.
    pub total_deposit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_session_has_no_wallet() {
        let mut s = Session::connected(Address::new([7u8; 20]), Some(137));
        assert_eq!(s.wallet(), Some(Address::new([7u8; 20])));
        s.connected = false;
        assert_eq!(s.wallet(), None);
    }
}
