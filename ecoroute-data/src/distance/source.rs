//! Transport seam between the batching provider and the mapping service.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ecoroute_core::{DistanceMatrixError, Location};
use log::debug;
use reqwest::Client;
use url::Url;

use super::google::MatrixResponse;
use super::provider::{HttpDistanceMatrixProviderConfig, ProviderBuildError};

/// Placeholder substituted for credentials in logged and reported URLs.
const REDACTED: &str = "REDACTED";

/// Fetch one origins × destinations block from a distance service.
#[async_trait(?Send)]
pub trait MatrixSource {
    /// Request costs from every origin to every destination.
    ///
    /// Implementations report transport failures as errors and hand back the
    /// decoded body untouched, service-level statuses included.
    async fn fetch(
        &self,
        origins: &[Location],
        destinations: &[Location],
    ) -> Result<MatrixResponse, DistanceMatrixError>;
}

/// HTTP implementation of [`MatrixSource`] for the Google Distance Matrix API.
pub struct HttpMatrixSource {
    client: Client,
    base_url: Url,
    api_key: String,
    units: String,
    timeout: Duration,
}

impl fmt::Debug for HttpMatrixSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMatrixSource")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &REDACTED)
            .field("units", &self.units)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpMatrixSource {
    /// Build an HTTP source from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is empty, the base URL does not
    /// parse, or the HTTP client fails to build.
    pub fn new(config: &HttpDistanceMatrixProviderConfig) -> Result<Self, ProviderBuildError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderBuildError::MissingApiKey);
        }
        let base_url =
            Url::parse(&config.base_url).map_err(|source| ProviderBuildError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            units: config.units.clone(),
            timeout: config.timeout,
        })
    }

    /// Build the request URL: `units`, pipe-joined `origins` and
    /// `destinations`, then `key`.
    fn request_url(&self, origins: &[Location], destinations: &[Location]) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("units", &self.units)
            .append_pair("origins", &join_waypoints(origins))
            .append_pair("destinations", &join_waypoints(destinations))
            .append_pair("key", &self.api_key);
        url
    }

    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> DistanceMatrixError {
        // reqwest embeds the request URL, key included, in its messages.
        let error = error.without_url();
        if error.is_timeout() {
            return DistanceMatrixError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return DistanceMatrixError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        DistanceMatrixError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl MatrixSource for HttpMatrixSource {
    async fn fetch(
        &self,
        origins: &[Location],
        destinations: &[Location],
    ) -> Result<MatrixResponse, DistanceMatrixError> {
        let url = self.request_url(origins, destinations);
        let shown = redact(&url);
        debug!(
            "requesting {}x{} elements from {shown}",
            origins.len(),
            destinations.len()
        );
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &shown))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &shown))?;
        response
            .json::<MatrixResponse>()
            .await
            .map_err(|err| DistanceMatrixError::ParseError {
                message: err.without_url().to_string(),
            })
    }
}

fn join_waypoints(locations: &[Location]) -> String {
    locations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Render `url` with the `key` parameter masked.
pub(crate) fn redact(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let shown = if name == "key" {
                REDACTED.to_owned()
            } else {
                value.into_owned()
            };
            (name.into_owned(), shown)
        })
        .collect();
    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.into()
}
