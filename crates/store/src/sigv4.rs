//! AWS Signature Version 4 for DynamoDB calls.
//!
//! Signing is delegated to `aws-sigv4`; this module only adapts it to the
//! single-shot, fully buffered JSON requests the client sends.

use std::time::SystemTime;

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use tb_domain::error::{Error, Result};

const SERVICE: &str = "dynamodb";

/// Static credentials bound to one region.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    identity: Identity,
    region: String,
}

impl RequestSigner {
    pub fn new(credentials: Credentials, region: impl Into<String>) -> Self {
        Self {
            identity: credentials.into(),
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Headers to add to the request so it carries a valid signature
    /// (`authorization`, `x-amz-date`, and `x-amz-security-token` when a
    /// session token is set).
    ///
    /// `headers` are covered by the signature; `host` is taken from `url`.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
        time: SystemTime,
    ) -> Result<Vec<(String, String)>> {
        let params: aws_sigv4::http_request::SigningParams<'_> = v4::SigningParams::builder()
            .identity(&self.identity)
            .region(&self.region)
            .name(SERVICE)
            .time(time)
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| Error::Auth(format!("invalid SigV4 parameters: {e}")))?
            .into();

        let signable = SignableRequest::new(
            method,
            url,
            headers.iter().copied(),
            SignableBody::Bytes(body),
        )
        .map_err(|e| Error::Auth(format!("request cannot be signed: {e}")))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| Error::Auth(format!("SigV4 signing failed: {e}")))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect())
    }
}
