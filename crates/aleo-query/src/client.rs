//! The query client.
//!
//! [`AleoNetworkClient`] turns each logical query into one transport call
//! (or one call per page for block ranges), decodes the body into a domain
//! type, and classifies every failure into a [`QueryError`] carrying the
//! query's fixed message.

use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::{Arc, PoisonError, RwLock};

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::account::Account;
use crate::config::{ClientConfig, DEFAULT_MAX_BLOCK_RANGE, DEFAULT_MAX_CONCURRENT_PAGES};
use crate::decode::{
    check_block_height, check_block_page, decode_block, decode_blocks,
    decode_confirmed_transactions, decode_height, decode_json, decode_optional_text, decode_text,
    decode_transaction, decode_transactions,
};
use crate::error::{ConfigError, FetchError, QueryError, TransportError};
use crate::query::{is_transaction_id, is_transition_id, Query};
use crate::transport::{HttpTransport, Transport};
use crate::types::{Block, BlockHeight, ConfirmedTransaction, Transaction};

/// Client for the read-only query API of a ledger node.
///
/// Holds no per-request state, so one instance can serve concurrent queries.
/// The attached [`Account`] is never read while a query runs.
pub struct AleoNetworkClient {
    transport: Arc<dyn Transport>,
    max_block_range: NonZeroU32,
    max_concurrent_pages: NonZeroUsize,
    account: RwLock<Option<Arc<Account>>>,
}

impl AleoNetworkClient {
    /// Client for `base_url` (for example `https://vm.aleo.org/api`) with
    /// default settings.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(&config)?;
        let max_block_range =
            NonZeroU32::new(config.max_block_range).ok_or(ConfigError::Zero("max_block_range"))?;
        let max_concurrent_pages = NonZeroUsize::new(config.max_concurrent_pages)
            .ok_or(ConfigError::Zero("max_concurrent_pages"))?;
        Ok(Self::with_transport(Arc::new(transport))
            .with_max_block_range(max_block_range)
            .with_max_concurrent_pages(max_concurrent_pages))
    }

    /// Client over any [`Transport`] implementation.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            max_block_range: NonZeroU32::new(DEFAULT_MAX_BLOCK_RANGE)
                .expect("DEFAULT_MAX_BLOCK_RANGE is non-zero"),
            max_concurrent_pages: NonZeroUsize::new(DEFAULT_MAX_CONCURRENT_PAGES)
                .expect("DEFAULT_MAX_CONCURRENT_PAGES is non-zero"),
            account: RwLock::new(None),
        }
    }

    /// Largest number of heights requested in one `/blocks` call.
    pub fn with_max_block_range(mut self, max_block_range: NonZeroU32) -> Self {
        self.max_block_range = max_block_range;
        self
    }

    /// Largest number of range pages requested at once.
    pub fn with_max_concurrent_pages(mut self, max_concurrent_pages: NonZeroUsize) -> Self {
        self.max_concurrent_pages = max_concurrent_pages;
        self
    }

    // ==========================================================================
    // Identity
    // ==========================================================================

    /// Attach an identity. Last write wins.
    pub fn set_account(&self, account: Arc<Account>) {
        *self.account.write().unwrap_or_else(PoisonError::into_inner) = Some(account);
    }

    /// The identity last attached, if any.
    pub fn account(&self) -> Option<Arc<Account>> {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    pub async fn get_block(&self, height: u32) -> Result<Block, QueryError> {
        let height = BlockHeight(height);
        self.fetch(Query::Block { height }, |body| {
            let block = decode_block(body)?;
            check_block_height(&block, height)?;
            Ok(block)
        })
        .await
    }

    /// Blocks for heights in `[start, end)`, in ascending order.
    ///
    /// The span is split into pages of at most `max_block_range` heights,
    /// with at most `max_concurrent_pages` in flight. Either every page
    /// arrives complete or the whole call fails.
    pub async fn get_block_range(&self, start: u32, end: u32) -> Result<Vec<Block>, QueryError> {
        let query = Query::BlockRange {
            start: BlockHeight(start),
            end: BlockHeight(end),
        };
        if start >= end {
            return Err(self.fail(
                query,
                FetchError::range(format!("start {start} must be below end {end}")),
            ));
        }
        debug!(%query, "node query");

        let page_size = self.max_block_range.get();
        let pages: Result<Vec<Vec<Block>>, FetchError> =
            stream::iter((start..end).step_by(page_size as usize))
                .map(|page_start| {
                    let page_end = page_start.saturating_add(page_size).min(end);
                    self.fetch_block_page(BlockHeight(page_start), BlockHeight(page_end))
                })
                .buffered(self.max_concurrent_pages.get())
                .try_collect()
                .await;

        match pages {
            Ok(pages) => Ok(pages.into_iter().flatten().collect()),
            Err(source) => Err(self.fail(query, source)),
        }
    }

    async fn fetch_block_page(
        &self,
        start: BlockHeight,
        end: BlockHeight,
    ) -> Result<Vec<Block>, FetchError> {
        let page = Query::BlockRange { start, end };
        let body = self
            .transport
            .get(&page.path())
            .await
            .map_err(|err| match classify_transport_error(&page, err) {
                // A span the node cannot serve is an unsatisfiable bound.
                FetchError::NotFound { what } => FetchError::range(what),
                other => other,
            })?;
        let blocks = decode_blocks(&body)?;
        check_block_page(&blocks, start, end)?;
        Ok(blocks)
    }

    pub async fn get_latest_block(&self) -> Result<Block, QueryError> {
        self.fetch(Query::LatestBlock, decode_block).await
    }

    pub async fn get_latest_hash(&self) -> Result<String, QueryError> {
        self.fetch(Query::LatestHash, |body| decode_text(body, "block hash"))
            .await
    }

    pub async fn get_latest_height(&self) -> Result<BlockHeight, QueryError> {
        self.fetch(Query::LatestHeight, decode_height).await
    }

    /// Current state root. Not guaranteed to match a concurrent
    /// [`get_latest_block`](Self::get_latest_block).
    pub async fn get_state_root(&self) -> Result<String, QueryError> {
        self.fetch(Query::StateRoot, |body| decode_text(body, "state root"))
            .await
    }

    pub async fn get_height_by_hash(&self, block_hash: &str) -> Result<BlockHeight, QueryError> {
        let query = Query::HeightByHash {
            block_hash: block_hash.to_owned(),
        };
        if block_hash.is_empty() {
            return Err(self.fail(query, FetchError::not_found("empty block hash")));
        }
        self.fetch(query, decode_height).await
    }

    // ==========================================================================
    // Programs
    // ==========================================================================

    /// Raw program source. The id is passed through verbatim.
    pub async fn get_program(&self, program_id: &str) -> Result<String, QueryError> {
        let query = Query::Program {
            program_id: program_id.to_owned(),
        };
        if program_id.is_empty() {
            return Err(self.fail(query, FetchError::not_found("empty program id")));
        }
        self.fetch(query, |body| decode_text(body, "program source"))
            .await
    }

    pub async fn get_program_mapping_names(
        &self,
        program_id: &str,
    ) -> Result<Vec<String>, QueryError> {
        let query = Query::ProgramMappingNames {
            program_id: program_id.to_owned(),
        };
        if program_id.is_empty() {
            return Err(self.fail(query, FetchError::not_found("empty program id")));
        }
        self.fetch(query, |body| decode_json(body, "mapping name list"))
            .await
    }

    /// Value stored under `key`. A key without a value fails as not found.
    pub async fn get_program_mapping_value(
        &self,
        program_id: &str,
        mapping: &str,
        key: &str,
    ) -> Result<String, QueryError> {
        let query = Query::ProgramMappingValue {
            program_id: program_id.to_owned(),
            mapping: mapping.to_owned(),
            key: key.to_owned(),
        };
        if program_id.is_empty() {
            return Err(self.fail(query, FetchError::not_found("empty program id")));
        }
        self.fetch(query, |body| {
            decode_optional_text(body, "mapping value")?
                .ok_or_else(|| FetchError::not_found(format!("value for key {key}")))
        })
        .await
    }

    pub async fn get_deployment_transaction_id(
        &self,
        program_id: &str,
    ) -> Result<String, QueryError> {
        let query = Query::DeploymentTransactionId {
            program_id: program_id.to_owned(),
        };
        if program_id.is_empty() {
            return Err(self.fail(query, FetchError::not_found("empty program id")));
        }
        self.fetch(query, |body| decode_text(body, "transaction id"))
            .await
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    /// Malformed and unknown ids fail alike; a malformed id never reaches
    /// the node.
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Transaction, QueryError> {
        let query = Query::Transaction {
            transaction_id: transaction_id.to_owned(),
        };
        if !is_transaction_id(transaction_id) {
            return Err(self.fail(
                query,
                FetchError::not_found(format!("transaction with malformed id `{transaction_id}`")),
            ));
        }
        self.fetch(query, decode_transaction).await
    }

    /// Transactions included in the block at `height`, in block order. A
    /// block without transactions yields an empty list.
    pub async fn get_transactions(
        &self,
        height: u32,
    ) -> Result<Vec<ConfirmedTransaction>, QueryError> {
        let query = Query::Transactions {
            height: BlockHeight(height),
        };
        self.fetch(query, decode_confirmed_transactions).await
    }

    pub async fn get_transactions_in_mempool(&self) -> Result<Vec<Transaction>, QueryError> {
        self.fetch(Query::MempoolTransactions, decode_transactions)
            .await
    }

    /// Existence check for a transition: returns the id the node reports for
    /// it. Malformed ids fail without reaching the node.
    pub async fn get_transition(&self, transition_id: &str) -> Result<String, QueryError> {
        let query = Query::Transition {
            transition_id: transition_id.to_owned(),
        };
        if !is_transition_id(transition_id) {
            return Err(self.fail(
                query,
                FetchError::not_found(format!("transition with malformed id `{transition_id}`")),
            ));
        }
        self.fetch(query, |body| decode_text(body, "transition lookup"))
            .await
    }

    // ==========================================================================
    // Request / Classification
    // ==========================================================================

    async fn fetch<T>(
        &self,
        query: Query,
        decode: impl FnOnce(&str) -> Result<T, FetchError>,
    ) -> Result<T, QueryError> {
        debug!(%query, "node query");
        let result = match self.transport.get(&query.path()).await {
            Ok(body) => decode(&body),
            Err(err) => Err(classify_transport_error(&query, err)),
        };
        result.map_err(|source| self.fail(query, source))
    }

    fn fail(&self, query: Query, source: FetchError) -> QueryError {
        let err = QueryError::new(query, source);
        debug!(
            query = %err.query(),
            error.kind = %err.kind(),
            error = %err.cause(),
            "node query failed"
        );
        err
    }
}

/// Map a transport failure onto the query's failure classes.
///
/// `404`, and error replies whose body reports a missing or uninterpretable
/// item, become `NotFound`; everything else stays a transport failure.
fn classify_transport_error(query: &Query, err: TransportError) -> FetchError {
    if err.is_not_found() {
        return FetchError::not_found(format!("{query} ({err})"));
    }
    FetchError::Transport(err)
}
