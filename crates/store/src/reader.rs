//! Store Reader: the two reads the bot performs against its table.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tb_domain::error::Result;
use tb_domain::record::Record;

use crate::client::TableClient;

/// An item count that the store publishes lazily.  It may be stale and must
/// always be presented as an approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproximateCount(pub u64);

impl ApproximateCount {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ApproximateCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every record of the table, in the order the pages were returned.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<Record>,
    /// Number of scan pages fetched to assemble `records`.
    pub pages: usize,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only view over one table.
///
/// Cheap to clone; the client handle is shared between concurrent
/// commands and no state is kept between calls.
#[derive(Clone)]
pub struct StoreReader {
    client: Arc<dyn TableClient>,
}

impl StoreReader {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { client }
    }

    pub fn table_name(&self) -> &str {
        self.client.table_name()
    }

    /// Refresh the table metadata and return its published item count.
    ///
    /// Exactly one metadata round-trip; no item is read.
    pub async fn approximate_count(&self) -> Result<ApproximateCount> {
        let desc = self.client.describe_table().await?;
        tracing::debug!(
            table = %self.table_name(),
            item_count = desc.item_count,
            status = ?desc.status,
            "table metadata refreshed"
        );
        Ok(ApproximateCount(desc.item_count))
    }

    /// Scan the whole table, following continuation tokens until the store
    /// reports no more pages.
    ///
    /// A table of N pages costs N scan calls (an empty table still costs
    /// one).  Any page failure aborts the scan; records gathered so far are
    /// discarded.
    pub async fn all_records(&self) -> Result<RecordSet> {
        let start = Instant::now();
        let mut set = RecordSet::default();
        let mut token = None;

        loop {
            let page = self.client.scan_page(token.take()).await.map_err(|e| {
                tracing::warn!(
                    table = %self.table_name(),
                    pages_read = set.pages,
                    records_read = set.records.len(),
                    error = %e,
                    "scan aborted"
                );
                e
            })?;

            set.pages += 1;
            tracing::trace!(
                table = %self.table_name(),
                page = set.pages,
                items = page.items.len(),
                more = page.next.is_some(),
                "scan page"
            );
            set.records.extend(page.items);

            match page.next {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::info!(
            table = %self.table_name(),
            records = set.records.len(),
            pages = set.pages,
            duration_ms = start.elapsed().as_millis() as u64,
            "full scan complete"
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ContinuationToken, ScanPage, TableDescription};
    use async_trait::async_trait;
    use tb_domain::error::Error;

    struct OnePageTable;

    #[async_trait]
    impl TableClient for OnePageTable {
        fn table_name(&self) -> &str {
            "single"
        }
        async fn describe_table(&self) -> Result<TableDescription> {
            Ok(TableDescription {
                item_count: 0,
                size_bytes: None,
                status: None,
            })
        }
        async fn scan_page(&self, start: Option<ContinuationToken>) -> Result<ScanPage> {
            if start.is_some() {
                return Err(Error::Other("unexpected continuation".into()));
            }
            Ok(ScanPage::default())
        }
    }

    #[tokio::test]
    async fn empty_table_costs_one_scan() {
        let reader = StoreReader::new(Arc::new(OnePageTable));
        let set = reader.all_records().await.unwrap();
        assert!(set.is_empty());
        assert_eq!(set.pages, 1);
    }

    #[tokio::test]
    async fn zero_count_is_valid() {
        let reader = StoreReader::new(Arc::new(OnePageTable));
        assert_eq!(reader.approximate_count().await.unwrap().value(), 0);
    }

    #[test]
    fn count_displays_as_plain_integer() {
        assert_eq!(ApproximateCount(4821).to_string(), "4821");
    }
}
