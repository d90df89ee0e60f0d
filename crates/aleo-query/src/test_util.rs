//! Shared test helpers for `aleo-query` unit tests.
//!
//! Builds node-shaped JSON fixtures (`block_json`, `execute_transaction_json`,
//! ...) so that tests across modules share a single source of truth for
//! dummy ledger data.

use serde_json::{json, Value};

// ==============================================================================
// Identifiers
// ==============================================================================

pub const TX_ID: &str = "at1z4sgvtmc7mhd3qw2tdzc8mqyg60gx2qgtdzcg6e6k673d3pfz5psfhe3kd";
pub const TRANSITION_ID: &str =
    "2429232855236830926144356377868449890830704336664550203176918782554219952323field";
pub const FEE_TRANSITION_ID: &str =
    "7361485329874521096375810483962158205839174032865291047362850193847561029384field";
pub const STATE_ROOT: &str = "ar1pxcnhmvl3yzqyvhldhxeyz3ktznwc9jxhmwq4jmfx3q5mjxkxq9qh2tgfl";

/// Deterministic, distinct block hash for a height.
pub fn block_hash(height: u32) -> String {
    format!("ab1{height:0>58}")
}

// ==============================================================================
// Transaction Builders
// ==============================================================================

pub fn transition_json(id: &str, function: &str) -> Value {
    json!({
        "id": id,
        "program": "credits.aleo",
        "function": function,
        "inputs": [
            { "type": "public", "id": "1field", "value": "5000000u64" }
        ],
        "outputs": [],
        "tpk": "1group",
        "tcm": "2field"
    })
}

/// An `execute` transaction with one call and a fee transition.
pub fn execute_transaction_json(id: &str) -> Value {
    json!({
        "type": "execute",
        "id": id,
        "execution": {
            "transitions": [transition_json(TRANSITION_ID, "transfer_public")],
            "global_state_root": STATE_ROOT,
            "proof": "proof1qyqsq"
        },
        "fee": {
            "transition": transition_json(FEE_TRANSITION_ID, "fee_public"),
            "global_state_root": STATE_ROOT,
            "proof": "proof1qyqsq"
        }
    })
}

pub fn confirmed_transaction_json(index: u32, id: &str) -> Value {
    json!({
        "status": "accepted",
        "type": "execute",
        "index": index,
        "transaction": execute_transaction_json(id),
        "finalize": []
    })
}

// ==============================================================================
// Block Builders
// ==============================================================================

/// A block at `height` carrying one accepted execute transaction.
pub fn block_json(height: u32) -> Value {
    let previous = height.saturating_sub(1);
    json!({
        "block_hash": block_hash(height),
        "previous_hash": block_hash(previous),
        "header": {
            "previous_state_root": STATE_ROOT,
            "transactions_root": "1field",
            "finalize_root": "2field",
            "metadata": {
                "network": 3,
                "round": height as u64 * 2,
                "height": height,
                "coinbase_target": 8_589_934_592u64,
                "proof_target": 2_147_483_648u64,
                "last_coinbase_target": 8_589_934_592u64,
                "last_coinbase_timestamp": 1_675_209_600i64,
                "timestamp": 1_675_209_600i64 + height as i64 * 15
            }
        },
        "transactions": [confirmed_transaction_json(0, TX_ID)],
        "signature": "sign1qyqsq"
    })
}

/// Blocks for every height in `[start, end)`, as a JSON array.
pub fn block_range_json(start: u32, end: u32) -> Value {
    Value::Array((start..end).map(block_json).collect())
}
