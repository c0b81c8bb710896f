//! Batched, retrying `DistanceMatrixProvider` over a [`MatrixSource`].

use std::fmt;
use std::time::Duration;

use ecoroute_core::{
    Cost, DistanceMatrixError, DistanceMatrixProvider, DistanceMatrixRows, Location,
};
use futures_util::{StreamExt, stream};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::batch::{Backoff, Batch, plan_batches};
use super::google::convert_response;
use super::source::{HttpMatrixSource, MatrixSource};

/// Error type for [`HttpDistanceMatrixProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The configured service URL does not parse.
    #[error("invalid distance service URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// No API key was configured.
    #[error("an API key is required for the distance service")]
    MissingApiKey,
}

/// Google Distance Matrix API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Default user agent for distance requests.
pub const DEFAULT_USER_AGENT: &str = "ecoroute-distance/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Elements (origins × destinations) the service accepts per request.
const DEFAULT_MAX_ELEMENTS: usize = 100;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);
const DEFAULT_CONCURRENCY: usize = 4;

/// Which measure of each element becomes the matrix cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostMetric {
    /// Road distance in metres.
    #[default]
    Distance,
    /// Travel time in seconds.
    Duration,
}

impl fmt::Display for CostMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Distance => "distance",
            Self::Duration => "duration",
        })
    }
}

/// Configuration for [`HttpDistanceMatrixProvider`].
#[derive(Clone)]
pub struct HttpDistanceMatrixProviderConfig {
    /// Distance Matrix endpoint.
    pub base_url: String,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Unit system requested from the service (`"imperial"` or `"metric"`).
    /// Element values are metres and seconds either way.
    pub units: String,
    /// Measure used as the matrix cost.
    pub metric: CostMetric,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Maximum elements per request.
    pub max_elements: usize,
    /// Retries per batch after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub initial_backoff: Duration,
    /// Ceiling on the retry delay.
    pub max_backoff: Duration,
    /// Batches in flight at once.
    pub concurrency: usize,
}

impl fmt::Debug for HttpDistanceMatrixProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDistanceMatrixProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"REDACTED")
            .field("units", &self.units)
            .field("metric", &self.metric)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("max_elements", &self.max_elements)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff", &self.initial_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Default for HttpDistanceMatrixProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            units: "imperial".to_owned(),
            metric: CostMetric::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_elements: DEFAULT_MAX_ELEMENTS,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl HttpDistanceMatrixProviderConfig {
    /// Create a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point requests at another endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the unit system requested from the service.
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Choose the measure used as the matrix cost.
    #[must_use]
    pub fn with_metric(mut self, metric: CostMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request element ceiling.
    #[must_use]
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    /// Set the retry count per batch.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first retry delay and its ceiling.
    #[must_use]
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Set how many batches may be in flight at once.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Distance-matrix provider that batches origin rows under the service's
/// element ceiling.
///
/// This provider implements the synchronous [`DistanceMatrixProvider`] trait
/// by internally blocking on asynchronous requests. It owns a Tokio runtime
/// that is reused across calls.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the provider
/// falls back to using its own internal runtime, which may deadlock if the
/// caller's runtime is driving IO this request depends on.
///
/// # Failure handling
///
/// Transient failures (see [`DistanceMatrixError::is_transient`]) are retried
/// per batch with exponential backoff. Once a batch exhausts its retries, or
/// fails permanently, the whole call fails and outstanding batches are
/// dropped.
pub struct HttpDistanceMatrixProvider<S = HttpMatrixSource> {
    source: S,
    config: HttpDistanceMatrixProviderConfig,
    runtime: Runtime,
}

impl<S: fmt::Debug> fmt::Debug for HttpDistanceMatrixProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDistanceMatrixProvider")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpDistanceMatrixProvider {
    /// Create a provider for the Google endpoint with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpDistanceMatrixProviderConfig::new(api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, the base URL is malformed, or
    /// the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpDistanceMatrixProviderConfig) -> Result<Self, ProviderBuildError> {
        let source = HttpMatrixSource::new(&config)?;
        Self::with_source(source, config)
    }
}

impl<S: MatrixSource> HttpDistanceMatrixProvider<S> {
    /// Create a provider issuing its requests through `source`.
    ///
    /// Only the batching, retry and metric settings of `config` apply; the
    /// transport settings belong to the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tokio runtime fails to build.
    pub fn with_source(
        source: S,
        config: HttpDistanceMatrixProviderConfig,
    ) -> Result<Self, ProviderBuildError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            source,
            config,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &HttpDistanceMatrixProviderConfig {
        &self.config
    }

    /// Underlying request source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch all batches, at most `concurrency` at a time, and assemble the
    /// rows by offset.
    async fn fetch_matrix_async(
        &self,
        locations: &[Location],
    ) -> Result<DistanceMatrixRows, DistanceMatrixError> {
        let batches = plan_batches(locations.len(), self.config.max_elements);
        debug!(
            "fetching {n}x{n} matrix in {} batches",
            batches.len(),
            n = locations.len()
        );

        let mut pending = stream::iter(batches)
            .map(|batch| self.fetch_batch(batch, locations))
            .buffer_unordered(self.config.concurrency.max(1));
        let mut rows: Vec<Option<Vec<Cost>>> = vec![None; locations.len()];
        while let Some(result) = pending.next().await {
            let (batch, batch_rows) = result?;
            for (slot, row) in rows.iter_mut().skip(batch.offset).zip(batch_rows) {
                *slot = Some(row);
            }
        }

        rows.into_iter()
            .collect::<Option<DistanceMatrixRows>>()
            .ok_or_else(|| DistanceMatrixError::ParseError {
                message: "distance service left matrix rows unfilled".to_owned(),
            })
    }

    /// Fetch one batch, retrying transient failures with backoff.
    async fn fetch_batch(
        &self,
        batch: Batch,
        locations: &[Location],
    ) -> Result<(Batch, DistanceMatrixRows), DistanceMatrixError> {
        let origins = locations.get(batch.origins()).unwrap_or_default();
        let backoff = Backoff::new(self.config.initial_backoff, self.config.max_backoff);
        let mut retry = 0;
        loop {
            let attempt = self
                .source
                .fetch(origins, locations)
                .await
                .and_then(|response| {
                    convert_response(response, origins.len(), locations.len(), self.config.metric)
                });
            match attempt {
                Ok(rows) => return Ok((batch, rows)),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) if retry >= self.config.max_retries => {
                    warn!(
                        "batch at row {} failed after {} attempts: {err}",
                        batch.offset,
                        retry + 1
                    );
                    return Err(DistanceMatrixError::RetriesExhausted {
                        attempts: retry + 1,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = backoff.delay(retry);
                    retry += 1;
                    warn!(
                        "batch at row {} failed: {err}; retry {retry} of {} in {delay:?}",
                        batch.offset, self.config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl<S: MatrixSource> DistanceMatrixProvider for HttpDistanceMatrixProvider<S> {
    /// Fetch the cost matrix for the given locations.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded (`flavor = "multi_thread"`); otherwise the provider's
    /// own runtime blocks the caller's thread.
    fn distance_matrix(
        &self,
        locations: &[Location],
    ) -> Result<DistanceMatrixRows, DistanceMatrixError> {
        if locations.is_empty() {
            return Err(DistanceMatrixError::EmptyInput);
        }

        let future = self.fetch_matrix_async(locations);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
