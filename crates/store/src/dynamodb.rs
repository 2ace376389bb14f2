//! DynamoDB implementation of [`TableClient`].
//!
//! `DynamoDbClient` speaks the DynamoDB JSON 1.0 protocol directly over
//! `reqwest`: every call is a signed `POST /` with an `X-Amz-Target`
//! header naming the operation.  Only `DescribeTable` and `Scan` are used.

use std::time::{Duration, Instant, SystemTime};

use async_trait::async_trait;
use aws_credential_types::Credentials;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tb_domain::config::{NetworkConfig, StoreConfig};
use tb_domain::error::{Error, Result};
use tb_domain::net::{from_reqwest, http_client};
use tb_domain::record::Record;
use tb_domain::secret::{resolve_optional_secret, resolve_secret};

use crate::client::{ContinuationToken, ScanPage, TableClient, TableDescription};
use crate::sigv4::RequestSigner;

const TARGET_PREFIX: &str = "DynamoDB_20120810";
const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A DynamoDB table client.
///
/// Created once at startup and shared by every command; the underlying
/// `reqwest::Client` keeps a connection pool.
#[derive(Debug, Clone)]
pub struct DynamoDbClient {
    http: Client,
    endpoint: Url,
    table: String,
    signer: RequestSigner,
    page_limit: Option<u32>,
    consistent_read: bool,
}

impl DynamoDbClient {
    /// Build a client from the store and network configuration.
    ///
    /// Credentials and region are resolved here, so a misconfigured store
    /// fails at startup instead of on the first command.
    pub fn new(cfg: &StoreConfig, network: &NetworkConfig) -> Result<Self> {
        if cfg.table_name.is_empty() {
            return Err(Error::Config("store.table_name is empty".into()));
        }
        let region = cfg.resolved_region().ok_or_else(|| {
            Error::Config("store.region is empty and AWS_REGION is not set".into())
        })?;

        let credentials = Credentials::new(
            resolve_secret(&cfg.access_key_id)?,
            resolve_secret(&cfg.secret_access_key)?,
            resolve_optional_secret(&cfg.session_token),
            None,
            "tablebot-config",
        );

        let endpoint_str = cfg
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://dynamodb.{region}.amazonaws.com"));
        let endpoint = Url::parse(&endpoint_str)
            .map_err(|e| Error::Config(format!("invalid store.endpoint '{endpoint_str}': {e}")))?;
        if endpoint.host_str().is_none() {
            return Err(Error::Config(format!("store endpoint '{endpoint}' has no host")));
        }

        let http = http_client(Duration::from_millis(cfg.timeout_ms), network)?;

        Ok(Self {
            http,
            endpoint,
            table: cfg.table_name.clone(),
            signer: RequestSigner::new(credentials, region),
            page_limit: cfg.page_limit,
            consistent_read: cfg.consistent_read,
        })
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Sign and send one JSON-protocol call, returning the response body.
    async fn call(&self, operation: &str, body: &Value) -> Result<String> {
        let payload = serde_json::to_vec(body)?;
        let target = format!("{TARGET_PREFIX}.{operation}");

        let headers = [
            ("content-type", CONTENT_TYPE),
            ("x-amz-target", target.as_str()),
        ];
        let auth = self.signer.sign(
            "POST",
            self.endpoint.as_str(),
            &headers,
            &payload,
            SystemTime::now(),
        )?;

        let mut rb = self.http.post(self.endpoint.clone());
        for (name, value) in headers {
            rb = rb.header(name, value);
        }
        for (name, value) in auth {
            rb = rb.header(name, value);
        }

        let start = Instant::now();
        let resp = rb.body(payload).send().await.map_err(from_reqwest)?;
        let status = resp.status();
        let text = resp.text().await.map_err(from_reqwest)?;

        tracing::debug!(
            operation,
            table = %self.table,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "dynamodb call"
        );

        if !status.is_success() {
            return Err(service_error(&self.table, status, &text));
        }
        Ok(text)
    }

    fn scan_body(&self, start: Option<&ContinuationToken>) -> Value {
        let mut body = json!({ "TableName": self.table });
        if let Some(limit) = self.page_limit {
            body["Limit"] = json!(limit);
        }
        if self.consistent_read {
            body["ConsistentRead"] = json!(true);
        }
        if let Some(token) = start {
            body["ExclusiveStartKey"] = json!(token.0);
        }
        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl TableClient for DynamoDbClient {
    fn table_name(&self) -> &str {
        &self.table
    }

    async fn describe_table(&self) -> Result<TableDescription> {
        let body = self
            .call("DescribeTable", &json!({ "TableName": self.table }))
            .await?;
        parse_describe_table(&self.table, &body)
    }

    async fn scan_page(&self, start: Option<ContinuationToken>) -> Result<ScanPage> {
        let body = self.call("Scan", &self.scan_body(start.as_ref())).await?;
        parse_scan(&self.table, &body)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeTableOutput {
    table: TableWire,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TableWire {
    item_count: Option<u64>,
    table_size_bytes: Option<u64>,
    table_status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScanOutput {
    #[serde(default)]
    items: Vec<Record>,
    last_evaluated_key: Option<Record>,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(alias = "Message", default)]
    message: String,
}

fn store_err(table: &str, message: impl Into<String>) -> Error {
    Error::Store {
        table: table.to_owned(),
        message: message.into(),
    }
}

/// Parse a `DescribeTable` response body.
pub fn parse_describe_table(table: &str, body: &str) -> Result<TableDescription> {
    let out: DescribeTableOutput = serde_json::from_str(body)
        .map_err(|e| store_err(table, format!("failed to parse DescribeTable response: {e}")))?;
    Ok(TableDescription {
        item_count: out.table.item_count.unwrap_or(0),
        size_bytes: out.table.table_size_bytes,
        status: out.table.table_status,
    })
}

/// Parse a `Scan` response body.  An empty `LastEvaluatedKey` is treated
/// the same as an absent one.
pub fn parse_scan(table: &str, body: &str) -> Result<ScanPage> {
    let out: ScanOutput = serde_json::from_str(body)
        .map_err(|e| store_err(table, format!("failed to parse Scan response: {e}")))?;
    Ok(ScanPage {
        items: out.items,
        next: out
            .last_evaluated_key
            .filter(|key| !key.is_empty())
            .map(ContinuationToken),
    })
}

/// Turn a non-2xx response into an [`Error`].
///
/// Credential problems surface as [`Error::Auth`]; every other service
/// error becomes [`Error::Store`] carrying the short exception name.
pub fn service_error(table: &str, status: StatusCode, body: &str) -> Error {
    let parsed: Option<ServiceErrorBody> = serde_json::from_str(body).ok();
    let (kind, message) = match parsed {
        Some(err) => {
            let kind = err.kind.rsplit('#').next().unwrap_or_default().to_owned();
            (kind, err.message)
        }
        None => (String::new(), body.trim().to_owned()),
    };

    let auth_failure = matches!(
        kind.as_str(),
        "UnrecognizedClientException"
            | "InvalidSignatureException"
            | "MissingAuthenticationTokenException"
            | "ExpiredTokenException"
            | "AccessDeniedException"
    );
    if auth_failure {
        return Error::Auth(format!("DynamoDB rejected credentials ({kind}): {message}"));
    }

    let label = if kind.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        kind
    };
    if message.is_empty() {
        store_err(table, label)
    } else {
        store_err(table, format!("{label}: {message}"))
    }
}
