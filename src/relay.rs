//! Request relay - proxied HTTP exchanges with credential injection
//!
//! Executes one outbound call per inbound proxy request: builds the
//! upstream URL, injects the server's bearer token, and relays the
//! upstream's status, body, and content type back verbatim.
//!
//! # Security
//!
//! The bearer token exists only in the outbound `Authorization` header.
//! It is never logged, never serialized, and transport error messages
//! are redacted before they cross back to the caller.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Method, StatusCode, header};
use serde_json::Value;
use tracing::debug;

use crate::error::redact;
use crate::registry::UpstreamServer;
use crate::{Error, Result};

/// Fixed timeout for outbound upstream calls.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// One inbound proxy request, reduced to the parts that cross the trust
/// boundary. Inbound headers are deliberately absent: nothing from the
/// caller's headers is forwarded upstream.
#[derive(Debug)]
pub struct RelayRequest {
    /// Inbound HTTP method (the router registers GET/POST/PUT/DELETE).
    pub method: Method,
    /// Upstream-relative endpoint path, no leading slash.
    pub endpoint: String,
    /// Raw inbound query string, forwarded byte-for-byte.
    pub raw_query: Option<String>,
    /// Decoded JSON body for POST/PUT; `None` otherwise.
    pub body: Option<Value>,
}

/// Upstream response, relayed to the caller unmodified.
#[derive(Debug)]
pub struct RelayResponse {
    /// Upstream status code.
    pub status: StatusCode,
    /// Upstream content type, `application/json` when omitted.
    pub content_type: String,
    /// Raw upstream body bytes, unparsed.
    pub body: Bytes,
}

/// The proxy engine. One shared HTTP client; relay operations are
/// independent and block only their own caller.
pub struct Relay {
    client: Client,
}

impl Relay {
    /// Create a relay with the fixed upstream timeout.
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Execute one proxied exchange against `server`.
    ///
    /// A non-2xx upstream status is not an error of the proxy; it is
    /// relayed verbatim. A single attempt is made, no retries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UpstreamTransport`] on connect, timeout, DNS, or
    /// TLS failure, with the bearer token redacted from the message.
    pub async fn forward(
        &self,
        server: &UpstreamServer,
        request: RelayRequest,
    ) -> Result<RelayResponse> {
        let url = build_url(&server.base_url, &request.endpoint, request.raw_query.as_deref());
        debug!(server = %server.id, method = %request.method, url = %url, "Relaying request");

        let mut outbound = self
            .client
            .request(request.method, &url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", server.token.reveal()),
            )
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(body) = &request.body {
            outbound = outbound.json(body);
        }

        let response = outbound
            .send()
            .await
            .map_err(|e| transport_error(&e, server))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&e, server))?;

        debug!(server = %server.id, status = %status, "Relayed upstream response");
        Ok(RelayResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Convert a client error into a transport error safe to surface to the
/// caller. The client's message can embed request internals, so the
/// token value is scrubbed unconditionally.
fn transport_error(err: &reqwest::Error, server: &UpstreamServer) -> Error {
    Error::UpstreamTransport(redact(&err.to_string(), server.token.reveal()))
}

/// Outbound URL: `base_url + "/api/" + endpoint`, with the raw query
/// string appended unmodified. Never re-parsed, so character escaping is
/// preserved exactly as the caller sent it.
fn build_url(base_url: &str, endpoint: &str, raw_query: Option<&str>) -> String {
    match raw_query {
        Some(query) if !query.is_empty() => format!("{base_url}/api/{endpoint}?{query}"),
        _ => format!("{base_url}/api/{endpoint}"),
    }
}
