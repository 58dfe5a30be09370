//! Signing payloads for relay requests and relay transactions.

use serde_json::{Value, json};

pub const RELAY_REQUEST_DOMAIN: &str = "onsocial:relay_request:v1";
pub const RELAY_TRANSACTION_DOMAIN: &str = "onsocial:relay_tx:v1";

/// Fields a sender commits to when authorizing a relayed call.
#[derive(Debug, Clone, Copy)]
pub struct RelayRequestFields<'a> {
    pub sender: &'a str,
    pub target: &'a str,
    pub encoded_function: &'a [u8],
    pub transaction_fee: u32,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: u64,
    pub relay_hub: &'a str,
    pub relay: &'a str,
    pub sponsor: &'a str,
}

/// A transaction signed by a relay, as submitted for penalization.
#[derive(Debug, Clone, Copy)]
pub struct RelayTransactionFields<'a> {
    pub nonce: u64,
    pub receiver: &'a str,
    pub data: &'a [u8],
}

/// Requires `serde_json` `preserve_order` for deterministic field order.
/// Integers are strings, bytes are hex.
pub fn build_relay_request_payload(fields: &RelayRequestFields<'_>) -> Value {
    json!({
        "sender": fields.sender,
        "target": fields.target,
        "encoded_function": hex::encode(fields.encoded_function),
        "transaction_fee": fields.transaction_fee.to_string(),
        "gas_price": fields.gas_price.to_string(),
        "gas_limit": fields.gas_limit.to_string(),
        "nonce": fields.nonce.to_string(),
        "relay_hub": fields.relay_hub,
        "relay": fields.relay,
        "sponsor": fields.sponsor,
    })
}

pub fn build_relay_transaction_payload(fields: &RelayTransactionFields<'_>) -> Value {
    json!({
        "nonce": fields.nonce.to_string(),
        "receiver": fields.receiver,
        "data": hex::encode(fields.data),
    })
}

/// Format: `{domain_prefix}:{hub_id}\0{payload_json}`.
pub fn build_signing_message(domain_prefix: &str, hub_id: &str, payload: &Value) -> Vec<u8> {
    let payload_json = payload.to_string();
    let mut message = format!("{domain_prefix}:{hub_id}").into_bytes();
    message.reserve_exact(1 + payload_json.len());
    message.push(0);
    message.extend_from_slice(payload_json.as_bytes());
    message
}
