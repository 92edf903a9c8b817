// Vaultdesk Engine — Transaction Preparer
//
// Builds approve / deposit / withdraw intents from the resolved pool config,
// the connected wallet and the pending amount. A preparer returns `None`
// whenever a referenced address, the connected wallet or the amount is
// missing; a `None` intent is
// simply "nothing to submit yet". Nothing here is cached: callers re-derive
// intents from current inputs every time.

use super::abi::{encode_call, function_selector, AbiValue, SIG_APPROVE, SIG_DEPOSIT, SIG_WITHDRAW};
use super::config::AssetConfig;
use crate::atoms::types::{Address, BaseUnits};
use std::fmt;

/// A user-triggered write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Approve the pool to pull the underlying token.
    Approve,
    /// Approve the pool to burn the owner's shares (withdraw policy).
    ApproveShares,
    Deposit,
    Withdraw,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Approve, Action::ApproveShares, Action::Deposit, Action::Withdraw];

    pub fn label(&self) -> &'static str {
        match self {
            Action::Approve => "approve",
            Action::ApproveShares => "approve-shares",
            Action::Deposit => "deposit",
            Action::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The contract function an intent invokes, with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolCall {
    Approve { spender: Address, amount: BaseUnits },
    Deposit { amount: BaseUnits, receiver: Address },
    Withdraw { amount: BaseUnits, receiver: Address, owner: Address },
}

impl PoolCall {
    pub fn signature(&self) -> &'static str {
        match self {
            PoolCall::Approve { .. } => SIG_APPROVE,
            PoolCall::Deposit { .. } => SIG_DEPOSIT,
            PoolCall::Withdraw { .. } => SIG_WITHDRAW,
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            PoolCall::Approve { .. } => "approve",
            PoolCall::Deposit { .. } => "deposit",
            PoolCall::Withdraw { .. } => "withdraw",
        }
    }

    /// Arguments in ABI order.
    pub fn args(&self) -> Vec<AbiValue> {
        match *self {
            PoolCall::Approve { spender, amount } => vec![AbiValue::Address(spender), AbiValue::Uint(amount)],
            PoolCall::Deposit { amount, receiver } => vec![AbiValue::Uint(amount), AbiValue::Address(receiver)],
            PoolCall::Withdraw { amount, receiver, owner } => vec![
                AbiValue::Uint(amount),
                AbiValue::Address(receiver),
                AbiValue::Address(owner),
            ],
        }
    }

    pub fn amount(&self) -> BaseUnits {
        match *self {
            PoolCall::Approve { amount, .. } | PoolCall::Deposit { amount, .. } | PoolCall::Withdraw { amount, .. } => amount,
        }
    }
}

/// A fully-resolved contract call, ready for the write transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionIntent {
    pub contract: Address,
    pub call: PoolCall,
}

impl TransactionIntent {
    pub fn selector(&self) -> [u8; 4] {
        function_selector(self.call.signature())
    }

    pub fn calldata(&self) -> Vec<u8> {
        encode_call(self.call.signature(), &self.call.args())
    }
}

impl fmt::Display for TransactionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.call.args().iter().map(|a| a.to_string()).collect();
        write!(f, "{}({}) on {}", self.call.function_name(), args.join(", "), self.contract)
    }
}

/// approve(spender = pool, amount) on the underlying token, sent by `wallet`.
pub fn prepare_approve(
    cfg: Option<&AssetConfig>,
    wallet: Option<Address>,
    amount: Option<BaseUnits>,
) -> Option<TransactionIntent> {
    let cfg = cfg?;
    let (token, pool, _owner, amount) = (cfg.token?, cfg.pool?, wallet?, amount?);
    Some(TransactionIntent { contract: token, call: PoolCall::Approve { spender: pool, amount } })
}

/// approve(spender = pool, amount) on the pool's own share token.
pub fn prepare_share_approve(
    cfg: Option<&AssetConfig>,
    wallet: Option<Address>,
    amount: Option<BaseUnits>,
) -> Option<TransactionIntent> {
    let (pool, _owner, amount) = (cfg?.pool?, wallet?, amount?);
    Some(TransactionIntent { contract: pool, call: PoolCall::Approve { spender: pool, amount } })
}

/// deposit(amount, receiver = wallet) on the pool.
pub fn prepare_deposit(
    cfg: Option<&AssetConfig>,
    wallet: Option<Address>,
    amount: Option<BaseUnits>,
) -> Option<TransactionIntent> {
    let (pool, receiver, amount) = (cfg?.pool?, wallet?, amount?);
    Some(TransactionIntent { contract: pool, call: PoolCall::Deposit { amount, receiver } })
}

/// withdraw(amount, receiver = wallet, owner = wallet) on the pool.
pub fn prepare_withdraw(
    cfg: Option<&AssetConfig>,
    wallet: Option<Address>,
    amount: Option<BaseUnits>,
) -> Option<TransactionIntent> {
    let (pool, wallet, amount) = (cfg?.pool?, wallet?, amount?);
    Some(TransactionIntent {
        contract: pool,
        call: PoolCall::Withdraw { amount, receiver: wallet, owner: wallet },
    })
}
