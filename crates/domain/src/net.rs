//! Outbound HTTP client construction.

use std::time::Duration;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};

/// Build a `reqwest::Client` with `timeout` and the configured proxy, if any.
///
/// Every outbound client (store, generator, Discord REST) goes through here
/// so that a single `[network]` section routes all traffic.
pub fn http_client(timeout: Duration, network: &NetworkConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout);

    if let Some(proxy_url) = network.resolved_proxy() {
        let proxy = reqwest::Proxy::all(&proxy_url)
            .map_err(|e| Error::Config(format!("invalid proxy '{proxy_url}': {e}")))?;
        tracing::debug!(proxy = %proxy_url, "outbound HTTP via proxy");
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| Error::Http(e.to_string()))
}

/// Convert a `reqwest::Error` into the shared error type.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_client_builds() {
        let network = NetworkConfig {
            proxy: None,
            proxy_env: "TB_TEST_NET_NEVER_SET".into(),
        };
        assert!(http_client(Duration::from_secs(5), &network).is_ok());
    }

    #[test]
    fn socks_proxy_is_accepted() {
        let network = NetworkConfig {
            proxy: Some("socks5h://127.0.0.1:40000".into()),
            proxy_env: "TB_TEST_NET_NEVER_SET".into(),
        };
        assert!(http_client(Duration::from_secs(5), &network).is_ok());
    }

    #[test]
    fn malformed_proxy_is_a_config_error() {
        let network = NetworkConfig {
            proxy: Some("http://[::1".into()),
            proxy_env: "TB_TEST_NET_NEVER_SET".into(),
        };
        let err = http_client(Duration::from_secs(5), &network).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
