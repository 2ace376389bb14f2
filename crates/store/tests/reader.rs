use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tb_domain::error::{Error, Result};
use tb_domain::record::{AttributeValue, Record};
use tb_store::{ContinuationToken, ScanPage, StoreReader, TableClient, TableDescription};

// ── Fake table ──────────────────────────────────────────────────────

/// Serves pre-sized pages and counts every round-trip.  When `fail_on_page`
/// is set, that (1-based) page returns an error instead.
struct PagedTable {
    page_sizes: Vec<usize>,
    item_count: u64,
    fail_on_page: Option<usize>,
    scan_calls: AtomicUsize,
    describe_calls: AtomicUsize,
}

impl PagedTable {
    fn new(page_sizes: &[usize]) -> Self {
        Self {
            page_sizes: page_sizes.to_vec(),
            item_count: 4821,
            fail_on_page: None,
            scan_calls: AtomicUsize::new(0),
            describe_calls: AtomicUsize::new(0),
        }
    }
}

fn item(page: usize, n: usize) -> Record {
    let mut r = Record::new();
    r.insert("pk".into(), AttributeValue::s(format!("p{page}#{n}")));
    r.insert("qty".into(), AttributeValue::n(n.to_string()));
    r
}

fn page_token(page: usize) -> ContinuationToken {
    let mut key = Record::new();
    key.insert("page".into(), AttributeValue::n(page.to_string()));
    ContinuationToken(key)
}

fn page_index(token: &ContinuationToken) -> usize {
    match &token.0["page"] {
        AttributeValue::Number(n) => n.parse().unwrap(),
        other => panic!("bad token {other:?}"),
    }
}

#[async_trait]
impl TableClient for PagedTable {
    fn table_name(&self) -> &str {
        "pets"
    }

    async fn describe_table(&self) -> Result<TableDescription> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TableDescription {
            item_count: self.item_count,
            size_bytes: None,
            status: Some("ACTIVE".into()),
        })
    }

    async fn scan_page(&self, start: Option<ContinuationToken>) -> Result<ScanPage> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        let idx = start.as_ref().map(page_index).unwrap_or(0);

        if self.fail_on_page == Some(idx + 1) {
            return Err(Error::Store {
                table: "pets".into(),
                message: "ProvisionedThroughputExceededException".into(),
            });
        }

        let size = self.page_sizes.get(idx).copied().unwrap_or(0);
        let items = (0..size).map(|n| item(idx, n)).collect();
        let next = (idx + 1 < self.page_sizes.len()).then(|| page_token(idx + 1));
        Ok(ScanPage { items, next })
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn count_is_one_metadata_call_and_no_scan() {
    let table = Arc::new(PagedTable::new(&[10]));
    let reader = StoreReader::new(table.clone());

    let count = reader.approximate_count().await.unwrap();
    assert_eq!(count.value(), 4821);
    assert_eq!(table.describe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(table.scan_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn full_scan_follows_every_continuation() {
    // Three data pages followed by an empty terminal page.
    let table = Arc::new(PagedTable::new(&[250, 250, 37, 0]));
    let reader = StoreReader::new(table.clone());

    let set = reader.all_records().await.unwrap();
    assert_eq!(set.len(), 537);
    assert_eq!(set.pages, 4);
    assert_eq!(table.scan_calls.load(Ordering::SeqCst), 4);
    assert_eq!(table.describe_calls.load(Ordering::SeqCst), 0);

    // Page order is preserved.
    assert_eq!(set.records[0]["pk"], AttributeValue::s("p0#0"));
    assert_eq!(set.records[250]["pk"], AttributeValue::s("p1#0"));
    assert_eq!(set.records[536]["pk"], AttributeValue::s("p2#36"));
}

#[tokio::test]
async fn mid_scan_failure_discards_partial_results() {
    let mut table = PagedTable::new(&[250, 250, 37]);
    table.fail_on_page = Some(2);
    let table = Arc::new(table);
    let reader = StoreReader::new(table.clone());

    let err = reader.all_records().await.unwrap_err();
    assert!(err.to_string().contains("ProvisionedThroughputExceededException"));
    // The failing page is the last call made; no further pages are requested.
    assert_eq!(table.scan_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_scans_share_one_client() {
    let table = Arc::new(PagedTable::new(&[3, 2]));
    let reader = StoreReader::new(table.clone());

    let other = reader.clone();
    let (a, b) = tokio::join!(reader.all_records(), other.all_records());
    assert_eq!(a.unwrap().len(), 5);
    assert_eq!(b.unwrap().len(), 5);
    assert_eq!(table.scan_calls.load(Ordering::SeqCst), 4);
}
