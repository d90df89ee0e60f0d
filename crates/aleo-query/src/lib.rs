pub mod account;
pub mod client;
pub mod config;
mod decode;
pub mod error;
pub mod query;
#[cfg(test)]
mod test_util;
pub mod transport;
pub mod types;

pub use account::Account;
pub use client::AleoNetworkClient;
pub use config::{ClientConfig, RetryPolicy};
pub use error::{ErrorKind, QueryError};
pub use types::{Block, BlockHeight, ConfirmedTransaction, Transaction, TransactionKind};
