//! Logical queries understood by the node API.
//!
//! Each [`Query`] knows its request path (relative to the network root) and
//! the fixed message reported when it fails.

use std::fmt;

use crate::types::BlockHeight;

/// One logical read against the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    Block {
        height: BlockHeight,
    },
    /// Heights in `[start, end)`.
    BlockRange {
        start: BlockHeight,
        end: BlockHeight,
    },
    LatestBlock,
    LatestHash,
    LatestHeight,
    StateRoot,
    Program {
        program_id: String,
    },
    Transaction {
        transaction_id: String,
    },
    Transactions {
        height: BlockHeight,
    },
    Transition {
        transition_id: String,
    },
    HeightByHash {
        block_hash: String,
    },
    ProgramMappingNames {
        program_id: String,
    },
    ProgramMappingValue {
        program_id: String,
        mapping: String,
        key: String,
    },
    DeploymentTransactionId {
        program_id: String,
    },
    MempoolTransactions,
}

impl Query {
    /// Request path relative to `{base_url}/{network}`. Ids are embedded
    /// verbatim.
    pub fn path(&self) -> String {
        match self {
            Self::Block { height } => format!("/block/{height}"),
            Self::BlockRange { start, end } => format!("/blocks?start={start}&end={end}"),
            Self::LatestBlock => "/latest/block".to_owned(),
            Self::LatestHash => "/latest/hash".to_owned(),
            Self::LatestHeight => "/latest/height".to_owned(),
            Self::StateRoot => "/latest/stateRoot".to_owned(),
            Self::Program { program_id } => format!("/program/{program_id}"),
            Self::Transaction { transaction_id } => format!("/transaction/{transaction_id}"),
            Self::Transactions { height } => format!("/block/{height}/transactions"),
            Self::Transition { transition_id } => format!("/find/transactionID/{transition_id}"),
            Self::HeightByHash { block_hash } => format!("/height/{block_hash}"),
            Self::ProgramMappingNames { program_id } => format!("/program/{program_id}/mappings"),
            Self::ProgramMappingValue {
                program_id,
                mapping,
                key,
            } => format!("/program/{program_id}/mapping/{mapping}/{key}"),
            Self::DeploymentTransactionId { program_id } => {
                format!("/find/transactionID/deployment/{program_id}")
            }
            Self::MempoolTransactions => "/memoryPool/transactions".to_owned(),
        }
    }

    /// Fixed message carried by every failure of this query.
    pub fn failure_message(&self) -> String {
        match self {
            Self::Block { .. } => "Error fetching block.".to_owned(),
            Self::BlockRange { start, end } => {
                format!("Error fetching blocks between {start} and {end}.")
            }
            Self::LatestBlock => "Error fetching latest block.".to_owned(),
            Self::LatestHash => "Error fetching latest hash.".to_owned(),
            Self::LatestHeight => "Error fetching latest height.".to_owned(),
            Self::StateRoot => "Error fetching latest state root.".to_owned(),
            Self::Program { program_id } => format!("Error fetching program {program_id}."),
            Self::Transaction { .. } => "Error fetching transaction.".to_owned(),
            Self::Transactions { .. } => "Error fetching transactions.".to_owned(),
            Self::Transition { .. } => "Error fetching transition.".to_owned(),
            Self::HeightByHash { block_hash } => {
                format!("Error fetching height for block hash {block_hash}.")
            }
            Self::ProgramMappingNames { program_id } => {
                format!("Error fetching mappings for program {program_id}.")
            }
            Self::ProgramMappingValue {
                program_id,
                mapping,
                key,
            } => format!(
                "Error fetching value for key '{key}' in mapping '{mapping}' of program {program_id}."
            ),
            Self::DeploymentTransactionId { program_id } => {
                format!("Error fetching deployment transaction for program {program_id}.")
            }
            Self::MempoolTransactions => "Error fetching transactions from mempool.".to_owned(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block { height } => write!(f, "block({height})"),
            Self::BlockRange { start, end } => write!(f, "blocks({start}..{end})"),
            Self::LatestBlock => write!(f, "latest_block"),
            Self::LatestHash => write!(f, "latest_hash"),
            Self::LatestHeight => write!(f, "latest_height"),
            Self::StateRoot => write!(f, "state_root"),
            Self::Program { program_id } => write!(f, "program({program_id})"),
            Self::Transaction { transaction_id } => write!(f, "transaction({transaction_id})"),
            Self::Transactions { height } => write!(f, "transactions({height})"),
            Self::Transition { transition_id } => write!(f, "transition({transition_id})"),
            Self::HeightByHash { block_hash } => write!(f, "height({block_hash})"),
            Self::ProgramMappingNames { program_id } => write!(f, "mappings({program_id})"),
            Self::ProgramMappingValue {
                program_id,
                mapping,
                key,
            } => write!(f, "mapping_value({program_id}/{mapping}/{key})"),
            Self::DeploymentTransactionId { program_id } => {
                write!(f, "deployment_transaction({program_id})")
            }
            Self::MempoolTransactions => write!(f, "mempool_transactions"),
        }
    }
}

// ==============================================================================
// Identifier Conventions
// ==============================================================================

const BECH32_CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

fn is_bech32_with_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix).is_some_and(|data| {
        !data.is_empty() && data.bytes().all(|b| BECH32_CHARSET.contains(&b))
    })
}

/// `at1` followed by bech32 data.
pub fn is_transaction_id(id: &str) -> bool {
    is_bech32_with_prefix(id, "at1")
}

/// A field element (`<digits>field`) or an `au1` bech32 id.
pub fn is_transition_id(id: &str) -> bool {
    let is_field = id
        .strip_suffix("field")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
    is_field || is_bech32_with_prefix(id, "au1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{TRANSITION_ID, TX_ID};

    #[test]
    fn block_paths_embed_heights() {
        assert_eq!(
            Query::Block {
                height: BlockHeight(1)
            }
            .path(),
            "/block/1"
        );
        assert_eq!(
            Query::BlockRange {
                start: BlockHeight(1),
                end: BlockHeight(3)
            }
            .path(),
            "/blocks?start=1&end=3"
        );
        assert_eq!(
            Query::Transactions {
                height: BlockHeight(9)
            }
            .path(),
            "/block/9/transactions"
        );
    }

    #[test]
    fn ids_are_passed_through_verbatim() {
        let query = Query::Program {
            program_id: "hello world.aleo".into(),
        };
        assert_eq!(query.path(), "/program/hello world.aleo");
    }

    #[test]
    fn range_message_names_both_bounds() {
        let query = Query::BlockRange {
            start: BlockHeight(999_999_999),
            end: BlockHeight(1_000_000_000),
        };
        assert_eq!(
            query.failure_message(),
            "Error fetching blocks between 999999999 and 1000000000."
        );
    }

    #[test]
    fn program_message_references_id() {
        let message = Query::Program {
            program_id: "credits.aleo".into(),
        }
        .failure_message();
        assert!(message.starts_with("Error fetching program"));
        assert!(message.contains("credits.aleo"));
    }

    #[test]
    fn transaction_id_convention() {
        assert!(is_transaction_id(TX_ID));
        assert!(!is_transaction_id("nonexistentid"));
        assert!(!is_transaction_id("at1"));
        // `b` is outside the bech32 charset.
        assert!(!is_transaction_id("at1bbbb"));
    }

    #[test]
    fn transition_id_convention() {
        assert!(is_transition_id(TRANSITION_ID));
        assert!(is_transition_id("au1qqsq"));
        assert!(!is_transition_id("garbage"));
        assert!(!is_transition_id("field"));
        assert!(!is_transition_id("12x4field"));
    }
}
