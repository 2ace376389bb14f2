//! `tb-store`: read access to the document store.
//!
//! Provides the [`TableClient`] trait (one method per store round-trip),
//! the production [`DynamoDbClient`] that speaks the DynamoDB JSON protocol
//! with SigV4 request signing, and the [`StoreReader`] that turns those
//! round-trips into the two reads the bot needs: an approximate item count
//! and the full, paginated record set.
//!
//! ```rust,no_run
//! use tb_domain::config::{NetworkConfig, StoreConfig};
//! use tb_store::{create_table_client, StoreReader};
//!
//! # async fn example() -> tb_domain::error::Result<()> {
//! let client = create_table_client(&StoreConfig::default(), &NetworkConfig::default())?;
//! let reader = StoreReader::new(client);
//! let count = reader.approximate_count().await?;
//! println!("about {count} rows");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod dynamodb;
pub mod reader;
pub mod sigv4;

pub use client::{ContinuationToken, ScanPage, TableClient, TableDescription};
pub use dynamodb::DynamoDbClient;
pub use reader::{ApproximateCount, RecordSet, StoreReader};
pub use sigv4::RequestSigner;

use std::sync::Arc;

use tb_domain::config::{NetworkConfig, StoreConfig};
use tb_domain::error::Result;

/// Build the production [`TableClient`] for the configured table.
pub fn create_table_client(
    cfg: &StoreConfig,
    network: &NetworkConfig,
) -> Result<Arc<dyn TableClient>> {
    let client = DynamoDbClient::new(cfg, network)?;
    tracing::info!(
        table = %cfg.table_name,
        endpoint = %client.endpoint(),
        "DynamoDB client ready"
    );
    Ok(Arc::new(client))
}
