//! Domain types returned by node queries.
//!
//! Contains the block model (`Block`, `BlockHeader`, `BlockMetadata`), the
//! transaction model (`Transaction`, `ConfirmedTransaction`, `Transition`)
//! and the `BlockHeight` newtype. All of them are immutable projections of
//! ledger state and are decoded fresh for every query.

use serde::{Deserialize, Serialize};

// ==============================================================================
// Block Height
// ==============================================================================

/// A block height, wrapped for type safety.
///
/// `#[serde(transparent)]` keeps the JSON representation a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHeight(pub u32);

impl From<u32> for BlockHeight {
    fn from(h: u32) -> Self {
        Self(h)
    }
}

impl From<BlockHeight> for u32 {
    fn from(h: BlockHeight) -> Self {
        h.0
    }
}

impl std::ops::Deref for BlockHeight {
    type Target = u32;
    fn deref(&self) -> &u32 {
        &self.0
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ==============================================================================
// Blocks
// ==============================================================================

/// A block as served by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub block_hash: String,
    pub previous_hash: String,
    pub header: BlockHeader,
    /// The node omits the list for blocks without transactions.
    #[serde(default)]
    pub transactions: Vec<ConfirmedTransaction>,
    pub signature: String,
}

impl Block {
    /// Height recorded in the block header.
    pub fn height(&self) -> BlockHeight {
        self.header.metadata.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub previous_state_root: String,
    pub transactions_root: String,
    pub finalize_root: Option<String>,
    pub ratifications_root: Option<String>,
    pub solutions_root: Option<String>,
    pub subdag_root: Option<String>,
    pub metadata: BlockMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub network: u16,
    pub round: u64,
    pub height: BlockHeight,
    pub coinbase_target: u64,
    pub proof_target: u64,
    pub last_coinbase_target: u64,
    pub last_coinbase_timestamp: i64,
    /// Unix seconds.
    pub timestamp: i64,
}

// ==============================================================================
// Transactions
// ==============================================================================

/// Transaction discriminant. Unknown values fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deploy,
    Execute,
    Fee,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deploy => write!(f, "deploy"),
            Self::Execute => write!(f, "execute"),
            Self::Fee => write!(f, "fee"),
        }
    }
}

/// A transaction, identified by an `at1…` id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub id: String,
    pub execution: Option<Execution>,
    pub deployment: Option<Deployment>,
    pub fee: Option<Fee>,
}

impl Transaction {
    /// Every transition in the transaction, execution transitions first,
    /// followed by the fee transition when present.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.execution
            .iter()
            .flat_map(|execution| execution.transitions.iter())
            .chain(self.fee.iter().map(|fee| &fee.transition))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Accepted,
    Rejected,
}

/// A transaction together with its inclusion status inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedTransaction {
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Position inside the block.
    pub index: u32,
    pub transaction: Transaction,
    #[serde(default)]
    pub finalize: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub transitions: Vec<Transition>,
    pub global_state_root: String,
    pub proof: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub edition: u16,
    /// Program source, passed through as given by the node.
    pub program: String,
    #[serde(default)]
    pub verifying_keys: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub transition: Transition,
    pub global_state_root: String,
    pub proof: Option<String>,
}

// ==============================================================================
// Transitions
// ==============================================================================

/// One program-call effect recorded inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    pub program: String,
    pub function: String,
    #[serde(default)]
    pub inputs: Vec<TransitionValue>,
    #[serde(default)]
    pub outputs: Vec<TransitionValue>,
    pub tpk: String,
    pub tcm: String,
}

/// An input or output of a transition. `kind` is the visibility tag the
/// node reports (`public`, `private`, `record`, `future`, ...); the value
/// itself stays opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub value: Option<String>,
    pub tag: Option<String>,
}
