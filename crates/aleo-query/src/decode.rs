//! Fail-closed decoding of node response bodies.
//!
//! Structured entities go through serde into the types of [`crate::types`];
//! scalars accept either a JSON literal or raw text. Nothing is ever
//! coerced to a default: a missing or mismatched field is a
//! [`FetchError::Decode`].

use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::types::{Block, BlockHeight, ConfirmedTransaction, Transaction, TransactionKind};

pub(crate) fn decode_json<T: DeserializeOwned>(
    body: &str,
    entity: &'static str,
) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::decode(entity, e))
}

pub(crate) fn decode_block(body: &str) -> Result<Block, FetchError> {
    let block: Block = decode_json(body, "block")?;
    check_block(&block)?;
    Ok(block)
}

pub(crate) fn decode_blocks(body: &str) -> Result<Vec<Block>, FetchError> {
    let blocks: Vec<Block> = decode_json(body, "block list")?;
    for block in &blocks {
        check_block(block)?;
    }
    Ok(blocks)
}

pub(crate) fn decode_transaction(body: &str) -> Result<Transaction, FetchError> {
    let transaction: Transaction = decode_json(body, "transaction")?;
    check_transaction(&transaction)?;
    Ok(transaction)
}

pub(crate) fn decode_transactions(body: &str) -> Result<Vec<Transaction>, FetchError> {
    let transactions: Vec<Transaction> = decode_json(body, "transaction list")?;
    for transaction in &transactions {
        check_transaction(transaction)?;
    }
    Ok(transactions)
}

pub(crate) fn decode_confirmed_transactions(
    body: &str,
) -> Result<Vec<ConfirmedTransaction>, FetchError> {
    let confirmed: Vec<ConfirmedTransaction> = decode_json(body, "confirmed transaction list")?;
    for entry in &confirmed {
        check_transaction(&entry.transaction)?;
    }
    Ok(confirmed)
}

/// A non-negative integer that fits a block height. Strings, floats and
/// negative numbers are rejected.
pub(crate) fn decode_height(body: &str) -> Result<BlockHeight, FetchError> {
    let height: u32 = decode_json(body.trim(), "block height")?;
    Ok(BlockHeight(height))
}

/// An opaque scalar served either as a JSON string literal or as raw text.
pub(crate) fn decode_text(body: &str, entity: &'static str) -> Result<String, FetchError> {
    decode_optional_text(body, entity)?
        .ok_or_else(|| FetchError::decode(entity, "expected a value, got null"))
}

/// Like [`decode_text`], but a JSON `null` body decodes to `None`.
pub(crate) fn decode_optional_text(
    body: &str,
    entity: &'static str,
) -> Result<Option<String>, FetchError> {
    let trimmed = body.trim();
    let text = match trimmed.as_bytes().first() {
        None => return Err(FetchError::decode(entity, "empty response body")),
        Some(b'"') => decode_json::<String>(trimmed, entity)?,
        Some(b'{') | Some(b'[') => {
            return Err(FetchError::decode(
                entity,
                "expected a scalar, got a JSON structure",
            ))
        }
        Some(_) if trimmed == "null" => return Ok(None),
        Some(_) => trimmed.to_owned(),
    };

    if text.is_empty() {
        return Err(FetchError::decode(entity, "empty value"));
    }
    Ok(Some(text))
}

// ==============================================================================
// Consistency Checks
// ==============================================================================

fn check_block(block: &Block) -> Result<(), FetchError> {
    if block.block_hash.is_empty() {
        return Err(FetchError::decode("block", "empty block_hash"));
    }
    for entry in &block.transactions {
        check_transaction(&entry.transaction)?;
    }
    Ok(())
}

/// The payload matching the transaction's discriminant must be present.
fn check_transaction(transaction: &Transaction) -> Result<(), FetchError> {
    let has_payload = match transaction.kind {
        TransactionKind::Execute => transaction.execution.is_some(),
        TransactionKind::Deploy => transaction.deployment.is_some(),
        TransactionKind::Fee => transaction.fee.is_some(),
    };
    if !has_payload {
        return Err(FetchError::decode(
            "transaction",
            format!(
                "{} transaction {} has no {} payload",
                transaction.kind, transaction.id, transaction.kind
            ),
        ));
    }
    Ok(())
}

/// The block fetched for `expected` must record that height.
pub(crate) fn check_block_height(block: &Block, expected: BlockHeight) -> Result<(), FetchError> {
    if block.height() != expected {
        return Err(FetchError::decode(
            "block",
            format!(
                "requested height {expected}, node returned height {}",
                block.height()
            ),
        ));
    }
    Ok(())
}

/// A page for `[start, end)` must hold exactly one block per height, in
/// ascending order.
pub(crate) fn check_block_page(
    blocks: &[Block],
    start: BlockHeight,
    end: BlockHeight,
) -> Result<(), FetchError> {
    let expected_len = (*end - *start) as usize;
    if blocks.len() != expected_len {
        return Err(FetchError::range(format!(
            "expected {expected_len} blocks for [{start}, {end}), node returned {}",
            blocks.len()
        )));
    }
    for (offset, block) in blocks.iter().enumerate() {
        let expected = BlockHeight(*start + offset as u32);
        if block.height() != expected {
            return Err(FetchError::range(format!(
                "expected height {expected} at position {offset}, node returned {}",
                block.height()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn decode_height_plain_number() {
        assert_eq!(decode_height("42").expect("should parse"), BlockHeight(42));
        assert_eq!(decode_height(" 7\n").expect("should parse"), BlockHeight(7));
    }

    #[test]
    fn decode_height_rejects_non_integers() {
        for body in ["", "null", "-1", "1.5", "\"12\"", "{}", "4294967296"] {
            let err = decode_height(body).expect_err("must reject");
            assert!(matches!(err, FetchError::Decode { .. }), "body `{body}`");
        }
    }

    #[test]
    fn decode_text_json_string() {
        let text = decode_text("\"ab1qqsq\"", "hash").expect("should parse");
        assert_eq!(text, "ab1qqsq");
    }

    #[test]
    fn decode_text_raw_body() {
        let source = "program credits.aleo;\n\nrecord credits:\n    owner as address.private;\n";
        let text = decode_text(source, "program").expect("should parse");
        assert!(text.starts_with("program credits.aleo;"));
    }

    #[test]
    fn decode_text_rejects_empty_and_structures() {
        assert!(decode_text("", "hash").is_err());
        assert!(decode_text("   ", "hash").is_err());
        assert!(decode_text("\"\"", "hash").is_err());
        assert!(decode_text("null", "hash").is_err());
        assert!(decode_text("{\"hash\":\"ab1\"}", "hash").is_err());
        assert!(decode_text("\"unterminated", "hash").is_err());
    }

    #[test]
    fn decode_optional_text_null_is_none() {
        assert_eq!(decode_optional_text("null", "value").expect("ok"), None);
        assert_eq!(
            decode_optional_text("\"5u64\"", "value").expect("ok"),
            Some("5u64".to_owned())
        );
    }

    #[test]
    fn decode_transaction_requires_matching_payload() {
        let mut raw = execute_transaction_json(TX_ID);
        raw.as_object_mut()
            .expect("transaction is an object")
            .remove("execution");
        let err = decode_transaction(&raw.to_string()).expect_err("must reject");
        assert!(err.to_string().contains("no execute payload"));
    }

    #[test]
    fn decode_block_rejects_truncated_body() {
        let body = block_json(1).to_string();
        let truncated = &body[..body.len() / 2];
        assert!(decode_block(truncated).is_err());
    }

    #[test]
    fn check_block_height_mismatch() {
        let block = decode_block(&block_json(5).to_string()).expect("fixture block must decode");
        assert!(check_block_height(&block, BlockHeight(5)).is_ok());
        assert!(check_block_height(&block, BlockHeight(6)).is_err());
    }

    #[test]
    fn check_block_page_requires_full_ascending_span() {
        let blocks = decode_blocks(&block_range_json(1, 3).to_string()).expect("must decode");
        assert!(check_block_page(&blocks, BlockHeight(1), BlockHeight(3)).is_ok());

        let short = &blocks[..1];
        assert!(matches!(
            check_block_page(short, BlockHeight(1), BlockHeight(3)),
            Err(FetchError::Range { .. })
        ));

        let reversed: Vec<Block> = blocks.iter().rev().cloned().collect();
        assert!(matches!(
            check_block_page(&reversed, BlockHeight(1), BlockHeight(3)),
            Err(FetchError::Range { .. })
        ));
    }

    #[test]
    fn decode_confirmed_transactions_keeps_order() {
        let body = serde_json::json!([
            confirmed_transaction_json(0, TX_ID),
            confirmed_transaction_json(1, "at1qqsq")
        ])
        .to_string();
        let confirmed = decode_confirmed_transactions(&body).expect("must decode");
        let indices: Vec<u32> = confirmed.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(confirmed[1].transaction.id, "at1qqsq");
    }
}
