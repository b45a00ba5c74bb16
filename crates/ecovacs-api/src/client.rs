// Open platform HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, the `ak` parameter the
// vendor expects on every call, and `{code, msg, data}` envelope unwrapping.
// Endpoint methods live in `robot.rs` as inherent methods.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::redact::{redact_body, redact_value};
use crate::transport::TransportConfig;

/// Raw HTTP client for the Ecovacs open platform.
///
/// Holds no credential: every call takes the API key explicitly, so one
/// client can serve several accounts and the caller decides which session
/// authorizes what.
#[derive(Debug, Clone)]
pub struct EcovacsClient {
    http: reqwest::Client,
    base_url: Url,
    log_http: bool,
}

impl EcovacsClient {
    /// Create a client for `base_url` (e.g. `https://open.ecovacs.cn`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            log_http: transport.log_http,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            log_http: false,
        })
    }

    /// Toggle redacted request/response tracing.
    pub fn set_http_logging(&mut self, enabled: bool) {
        self.log_http = enabled;
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the base path ends with `/` so relative endpoint joins
    /// append instead of replacing the last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Submit `params` (plus `ak`) to an endpoint and return the envelope's `data`.
    ///
    /// GET sends the parameters as a query string, POST as a JSON object.
    /// All values are strings on the wire.
    pub(crate) async fn call(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        ak: &SecretString,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;

        let mut body: Map<String, Value> = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
            .collect();
        body.insert("ak".into(), Value::String(ak.expose_secret().to_owned()));
        let body = Value::Object(body);

        if self.log_http {
            debug!(%url, params = %redact_value(&body), "[HTTP_REQUEST]");
        } else {
            debug!("{method} {url}");
        }

        let builder = if method == Method::GET {
            let query: Vec<(&str, &str)> = params
                .iter()
                .copied()
                .chain(std::iter::once(("ak", ak.expose_secret())))
                .collect();
            self.http.get(url).query(&query)
        } else {
            self.http.request(method, url).json(&body)
        };

        let resp = builder.send().await?;
        self.parse_envelope(resp).await
    }

    /// Check the HTTP status, then the `{code, msg}` envelope, returning `data`.
    async fn parse_envelope(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("API key refused (HTTP {status})"),
            });
        }

        let body = resp.text().await?;

        if self.log_http {
            debug!(status = status.as_u16(), body = %redact_body(&body), "[HTTP_RESPONSE]");
        }

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

        if !envelope.code.is_success() {
            return Err(Error::Api {
                code: envelope.code.0,
                message: envelope.msg.unwrap_or_default(),
            });
        }

        Ok(envelope.data)
    }
}

/// First 200 bytes of `body`, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = EcovacsClient::with_client(reqwest::Client::new(), "https://open.ecovacs.cn")
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://open.ecovacs.cn/");
        assert_eq!(
            client.url("robot/ctl").unwrap().as_str(),
            "https://open.ecovacs.cn/robot/ctl"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let client =
            EcovacsClient::with_client(reqwest::Client::new(), "http://127.0.0.1:8080/proxy/")
                .unwrap();
        assert_eq!(
            client.url("robot/deviceList").unwrap().as_str(),
            "http://127.0.0.1:8080/proxy/robot/deviceList"
        );
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "扫".repeat(100);
        assert!(preview(&body).len() <= 200);
        assert!(body.starts_with(preview(&body)));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = EcovacsClient::with_client(reqwest::Client::new(), "not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
