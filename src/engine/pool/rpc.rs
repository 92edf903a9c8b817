// Vaultdesk Engine — JSON-RPC Ledger
//
// `LedgerTransport` over a plain Ethereum JSON-RPC endpoint. Writes go
// through `eth_sendTransaction`, so signing is the node's (or the wallet
// bridge's) business; this side only estimates gas and submits.

use super::intents::TransactionIntent;
use super::ledger::{LedgerTransport, ReceiptStatus};
use super::primitives::{hex_decode, hex_encode, parse_address};
use crate::atoms::constants::{FALLBACK_GAS_LIMIT, GAS_BUFFER_PCT, RPC_TIMEOUT_SECS};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{Address, ChainId, Session};
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{json, Value};
use std::time::Duration;

pub struct RpcLedger {
    url: String,
    client: reqwest::Client,
}

impl RpcLedger {
    pub fn new(url: impl Into<String>) -> Self {
        RpcLedger { url: url.into(), client: reqwest::Client::new() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Low-level JSON-RPC call
    async fn call(&self, method: &str, params: Value) -> EngineResult<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .timeout(Duration::from_secs(RPC_TIMEOUT_SECS))
            .send()
            .await?;

        let envelope: Value = resp.json().await?;
        rpc_result(method, envelope)
    }

    pub async fn chain_id(&self) -> EngineResult<ChainId> {
        let result = self.call("eth_chainId", json!([])).await?;
        parse_quantity("eth_chainId", &result)
    }

    /// First account the node manages, if any.
    pub async fn account(&self) -> EngineResult<Option<Address>> {
        let result = self.call("eth_accounts", json!([])).await?;
        match result.as_array().and_then(|a| a.first()).and_then(Value::as_str) {
            Some(s) => Ok(Some(parse_address(s)?)),
            None => Ok(None),
        }
    }

    /// Build a session from the endpoint: its chain id, plus `account` (or
    /// the node's first managed account) as the connected wallet.
    pub async fn session(&self, account: Option<Address>) -> EngineResult<Session> {
        let chain_id = self.chain_id().await?;
        let address = match account {
            Some(a) => Some(a),
            None => self.account().await?,
        };
        Ok(match address {
            Some(a) => Session::connected(a, Some(chain_id)),
            None => Session::disconnected(Some(chain_id)),
        })
    }

    async fn estimate_gas(&self, from: Address, intent: &TransactionIntent) -> u64 {
        let result = self
            .call("eth_estimateGas", json!([tx_object(from, intent)]))
            .await
            .and_then(|v| parse_quantity("eth_estimateGas", &v));
        match result {
            Ok(estimate) => estimate * GAS_BUFFER_PCT / 100,
            Err(e) => {
                warn!("[pool] Gas estimate failed ({}), using fallback {}", e, FALLBACK_GAS_LIMIT);
                FALLBACK_GAS_LIMIT
            }
        }
    }
}

#[async_trait]
impl LedgerTransport for RpcLedger {
    async fn read(&self, contract: Address, calldata: &[u8]) -> EngineResult<Vec<u8>> {
        let result = self
            .call("eth_call", json!([{ "to": contract.to_string(), "data": hex_encode(calldata) }, "latest"]))
            .await?;
        let hex = result.as_str().ok_or_else(|| EngineError::rpc("eth_call", "result is not a hex string"))?;
        hex_decode(hex)
    }

    async fn send(&self, from: Option<Address>, intent: &TransactionIntent) -> EngineResult<String> {
        let from = from.ok_or_else(|| EngineError::Other(format!("no sending account for {}", intent)))?;
        let gas = self.estimate_gas(from, intent).await;
        debug!("[pool] Gas limit {} for {}", gas, intent);

        let mut tx = tx_object(from, intent);
        tx["gas"] = json!(format!("0x{:x}", gas));
        let result = self.call("eth_sendTransaction", json!([tx])).await?;
        result
            .as_str()
            .map(String::from)
            .ok_or_else(|| EngineError::rpc("eth_sendTransaction", "result is not a transaction hash"))
    }

    async fn receipt(&self, tx_hash: &str) -> EngineResult<ReceiptStatus> {
        let result = self.call("eth_getTransactionReceipt", json!([tx_hash])).await?;
        Ok(receipt_status(&result))
    }
}

fn tx_object(from: Address, intent: &TransactionIntent) -> Value {
    json!({
        "from": from.to_string(),
        "to": intent.contract.to_string(),
        "data": hex_encode(&intent.calldata()),
        "value": "0x0"
    })
}

/// Unwrap a JSON-RPC response envelope.
fn rpc_result(method: &str, envelope: Value) -> EngineResult<Value> {
    if let Some(error) = envelope.get("error") {
        let message = error.get("message").and_then(Value::as_str).map(String::from).unwrap_or_else(|| error.to_string());
        return Err(EngineError::rpc(method, message));
    }
    envelope
        .get("result")
        .cloned()
        .ok_or_else(|| EngineError::rpc(method, "response missing 'result' field"))
}

fn parse_quantity(method: &str, value: &Value) -> EngineResult<u64> {
    let hex = value.as_str().ok_or_else(|| EngineError::rpc(method, "result is not a hex quantity"))?;
    u64::from_str_radix(hex.strip_prefix("0x").unwrap_or(hex), 16)
        .map_err(|e| EngineError::rpc(method, format!("parse quantity {}: {}", hex, e)))
}

/// A null receipt means not mined yet; status 0x1 is success.
fn receipt_status(receipt: &Value) -> ReceiptStatus {
    if receipt.is_null() {
        return ReceiptStatus::Pending;
    }
    match receipt.get("status").and_then(Value::as_str) {
        Some("0x1") => ReceiptStatus::Success,
        _ => ReceiptStatus::Reverted,
    }
}
