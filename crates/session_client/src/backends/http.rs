//! HttpBackend - POSTs viewport updates to the recording API

use std::time::Duration;

use contracts::{ContractError, Dimensions, SessionId, ViewportBackend};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::error::SessionClientError;

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Backend talking to `POST {api_url}/recordings/live/{session_id}/viewport`
pub struct HttpBackend {
    name: String,
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend for `api_url`; every request is bounded by `timeout`
    pub fn new(
        name: impl Into<String>,
        api_url: &str,
        timeout: Duration,
    ) -> Result<Self, SessionClientError> {
        let base_url = Url::parse(api_url.trim_end_matches('/'))
            .map_err(|e| SessionClientError::invalid_api_url(api_url, e.to_string()))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SessionClientError::invalid_api_url(
                api_url,
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }
        if base_url.cannot_be_a_base() {
            return Err(SessionClientError::invalid_api_url(
                api_url,
                "url cannot carry a path",
            ));
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            name: name.into(),
            http,
            base_url,
        })
    }

    /// Viewport endpoint for `session_id`, with the id percent-encoded as one segment
    pub fn endpoint(&self, session_id: &SessionId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["recordings", "live", session_id.as_str(), "viewport"]);
        }
        url
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

impl ViewportBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_backend_push",
        skip(self),
        fields(backend = %self.name)
    )]
    async fn push_viewport(
        &self,
        session_id: &SessionId,
        viewport: Dimensions,
    ) -> Result<(), ContractError> {
        let url = self.endpoint(session_id);
        debug!(%url, %viewport, "Posting viewport");

        let res = self
            .http
            .post(url)
            .json(&viewport)
            .send()
            .await
            .map_err(|e| ContractError::backend_request(e.to_string()))?;

        if res.status().is_success() {
            Ok(())
        } else {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            Err(ContractError::backend_status(status, truncate_body(body)))
        }
    }
}
