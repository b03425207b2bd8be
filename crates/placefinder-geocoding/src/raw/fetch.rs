use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{
    Client, Request,
    header::{ACCEPT, USER_AGENT},
};
use tracing::{debug, instrument, warn};

use super::{Coordinate, RawCandidate};
use crate::{GeocodeError, Geocoder, Result};

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`NominatimClient`].
///
/// Nominatim's usage policy requires every request to identify the
/// application and a contact address, so both are mandatory.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub app_name: String,
    pub app_version: String,
    pub contact: String,
    pub timeout: Duration,
    /// Upper bound on candidates requested from the provider
    pub limit: Option<u8>,
}

impl ClientConfig {
    pub fn new(app_name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            endpoint: NOMINATIM_SEARCH_URL.to_string(),
            app_name: app_name.into(),
            app_version: "1.0".to_string(),
            contact: contact.into(),
            timeout: DEFAULT_TIMEOUT,
            limit: None,
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn limit(mut self, limit: u8) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Renders the identification header, e.g. `LocationSearch/1.0 (ops@example.org)`.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!("{}/{} ({})", self.app_name, self.app_version, self.contact)
    }

    fn validate(&self) -> Result<()> {
        if self.app_name.trim().is_empty() {
            return Err(GeocodeError::MissingIdentification("application name"));
        }
        if self.contact.trim().is_empty() {
            return Err(GeocodeError::MissingIdentification("contact address"));
        }
        Ok(())
    }
}

/// HTTP client for the Nominatim `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    config: ClientConfig,
}

impl NominatimClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the search request without sending it.
    pub fn build_request(&self, text: &str, near: Option<Coordinate>) -> Result<Request> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", text.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("featureType", "settlement".to_string()),
        ];
        if let Some(near) = near {
            params.push(("lat", near.lat.to_string()));
            params.push(("lon", near.lon.to_string()));
        }
        if let Some(limit) = self.config.limit {
            params.push(("limit", limit.to_string()));
        }

        Ok(self
            .client
            .get(&self.config.endpoint)
            .query(&params)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, self.config.user_agent())
            .build()?)
    }

    /// Sends one search request and decodes the candidate list.
    ///
    /// Any transport error, non-success status or undecodable body fails the
    /// whole call; nothing is salvaged from a partial response.
    #[instrument(name = "Nominatim search", skip(self), level = "debug")]
    pub async fn search(&self, text: &str, near: Option<Coordinate>) -> Result<Vec<RawCandidate>> {
        let request = self.build_request(text, near)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Provider rejected search request");
            return Err(GeocodeError::Status(status));
        }

        let body = response.text().await?;
        let candidates: Vec<RawCandidate> = serde_json::from_str(&body)?;
        debug!(count = candidates.len(), "Decoded provider candidates");
        Ok(candidates)
    }
}

impl Geocoder for NominatimClient {
    fn search<'a>(
        &'a self,
        text: &'a str,
        near: Option<Coordinate>,
    ) -> BoxFuture<'a, Result<Vec<RawCandidate>>> {
        Box::pin(Self::search(self, text, near))
    }
}
