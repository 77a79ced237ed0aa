// Gateway HTTP client
//
// Wraps `reqwest::Client` with gateway URL construction and envelope
// unwrapping. Session endpoints live in `sessions.rs` as inherent methods
// so this module stays focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::gateway::models::GatewayResponse;
use crate::transport::TransportConfig;

/// Raw HTTP client for the device-automation gateway.
///
/// Handles the `{ meta: { rc, msg, kind }, data: [...] }` envelope. All
/// methods return the unwrapped `data` payload.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new gateway client from a `TransportConfig`.
    ///
    /// `base_url` is the gateway root, e.g. `https://gateway.lab:8080`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a gateway client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/v1/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/v1/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Send a DELETE request and unwrap the envelope.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Parse the `{ meta, data }` envelope, returning `data` on success.
    ///
    /// HTTP 401 is a gateway authentication failure, HTTP 504 a gateway
    /// timeout. An `rc = "error"` envelope carrying a `kind` becomes
    /// `Error::Device`; without one it is a plain gateway error.
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "gateway rejected the API key".into(),
            });
        }

        if status == reqwest::StatusCode::GATEWAY_TIMEOUT {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::GatewayTimeout {
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        // Error envelopes may arrive with a 4xx/5xx status; prefer their
        // message over the bare status line.
        let envelope: GatewayResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(Error::Gateway {
                    message: format!("HTTP {status}: {}", preview(&body)),
                });
            }
            Err(e) => {
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {:?})", preview(&body)),
                    body,
                });
            }
        };

        if envelope.meta.rc == "ok" && status.is_success() {
            return Ok(envelope.data);
        }

        let message = envelope
            .meta
            .msg
            .unwrap_or_else(|| format!("rc={} (HTTP {status})", envelope.meta.rc));
        Err(match envelope.meta.kind {
            Some(kind) => Error::Device { kind, message },
            None => Error::Gateway { message },
        })
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
