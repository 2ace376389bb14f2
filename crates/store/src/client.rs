//! The `TableClient` trait: the store round-trips the reader is built on.

use async_trait::async_trait;
use tb_domain::error::Result;
use tb_domain::record::Record;

/// Metadata snapshot returned by a table refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    /// Item count as last published by the store.  DynamoDB refreshes this
    /// value roughly every six hours, so it is an estimate.
    pub item_count: u64,
    pub size_bytes: Option<u64>,
    pub status: Option<String>,
}

/// Opaque cursor returned by the store when more pages remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(pub Record);

/// One page of a full-table scan.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub items: Vec<Record>,
    /// `None` means this was the last page.
    pub next: Option<ContinuationToken>,
}

/// Abstraction over a single table of the document store.
///
/// Implementations may talk to DynamoDB or be a test double.  Handles are
/// shared across concurrent commands, so implementations must not keep
/// per-call mutable state.
#[async_trait]
pub trait TableClient: Send + Sync {
    /// The table this client reads.
    fn table_name(&self) -> &str;

    /// Refresh and return the table metadata.
    async fn describe_table(&self) -> Result<TableDescription>;

    /// Fetch one scan page, starting after `start` when given.
    async fn scan_page(&self, start: Option<ContinuationToken>) -> Result<ScanPage>;
}
