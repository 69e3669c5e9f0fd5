// Dashboard backend HTTP client
//
// Wraps `reqwest::Client` with URL construction, status handling, and
// body decoding. Endpoint methods live in `devices.rs` and
// `provisioning.rs` as inherent impls, keeping this module focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Ack;
use crate::transport::TransportConfig;

/// Path the backend redirects every request to until WiFi credentials
/// have been provided.
pub(crate) const WIFI_SETUP_PATH: &str = "wifi";

const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the dashboard backend.
///
/// Cheap to clone: `reqwest::Client` is reference-counted internally.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DashboardClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the dashboard root (e.g. `http://192.168.1.50:5000`).
    /// A path prefix is allowed; endpoint paths are appended to it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The dashboard base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{segments...}`, percent-encoding each segment so
    /// opaque device ids can never escape their path position.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        self.parse_json(resp).await
    }

    /// Send a bodyless POST request and decode the `{message}`/`{error}` ack.
    pub(crate) async fn post_empty(&self, url: Url) -> Result<Ack, Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await?;
        self.parse_json(resp).await
    }

    /// Send a POST request with a JSON body and decode the ack.
    pub(crate) async fn post_json(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Ack, Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        self.parse_json(resp).await
    }

    /// Turn a response into `T`, or into the matching error.
    ///
    /// Non-2xx responses become `Error::Backend` carrying the backend's
    /// `{error}`/`{message}` text when present. A response that landed on
    /// the WiFi setup page (after redirects) becomes `WifiSetupRequired`.
    async fn parse_json<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if self.is_wifi_setup_redirect(resp.url()) {
            return Err(Error::WifiSetupRequired);
        }

        let body = resp.text().await?;
        trace!(status = status.as_u16(), body = %preview(&body), "response received");

        if !status.is_success() {
            return Err(Error::Backend {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    pub(crate) fn is_wifi_setup_redirect(&self, final_url: &Url) -> bool {
        self.endpoint(&[WIFI_SETUP_PATH])
            .is_ok_and(|setup| setup.path() == final_url.path())
    }
}

/// Pull `{error}` or `{message}` out of an error body, if it is JSON.
fn extract_message(body: &str) -> Option<String> {
    serde_json::from_str::<Ack>(body)
        .ok()
        .and_then(Ack::any_text)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
