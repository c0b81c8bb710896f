//! Test utilities for distance-matrix providers.
//!
//! This module provides [`StubMatrixSource`], a deterministic test double for
//! [`MatrixSource`] that answers from an in-memory matrix without making HTTP
//! requests, and records every request it receives.

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use ecoroute_core::{DistanceMatrixError, DistanceMatrixRows, Location};

use super::google::{MatrixElement, MatrixResponse, MatrixRow, Measure};
use super::source::MatrixSource;

/// A request observed by [`StubMatrixSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct StubRequest {
    /// Origins of the request, in order.
    pub origins: Vec<Location>,
    /// Number of destinations requested.
    pub destinations: usize,
}

/// Stub [`MatrixSource`] backed by a known matrix.
///
/// Locations are looked up by equality in the stub's location list; unknown
/// locations produce a `NOT_FOUND` element, as the real service does for
/// addresses it cannot geocode.
///
/// # Example
///
/// ```
/// use ecoroute_core::{DistanceMatrixProvider, Location};
/// use ecoroute_data::HttpDistanceMatrixProvider;
/// use ecoroute_data::HttpDistanceMatrixProviderConfig;
/// use ecoroute_data::distance::test_support::StubMatrixSource;
///
/// let locations = vec![Location::address("Depot"), Location::address("Shop")];
/// let stub = StubMatrixSource::with_matrix(locations.clone(), vec![vec![0, 5], vec![6, 0]]);
/// let provider = HttpDistanceMatrixProvider::with_source(
///     stub,
///     HttpDistanceMatrixProviderConfig::new("unused"),
/// )?;
///
/// assert_eq!(provider.distance_matrix(&locations)?, vec![vec![0, 5], vec![6, 0]]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct StubMatrixSource {
    locations: Vec<Location>,
    distances: DistanceMatrixRows,
    durations: Option<DistanceMatrixRows>,
    status: Option<(String, String)>,
    failures: RefCell<VecDeque<DistanceMatrixError>>,
    requests: RefCell<Vec<StubRequest>>,
}

impl StubMatrixSource {
    /// Create a source answering with `distances` for `locations`.
    ///
    /// Durations equal distances unless set with
    /// [`with_durations`](Self::with_durations).
    #[must_use]
    pub fn with_matrix(locations: Vec<Location>, distances: DistanceMatrixRows) -> Self {
        Self {
            locations,
            distances,
            ..Self::default()
        }
    }

    /// Create a source with zero on the diagonal and one elsewhere.
    #[must_use]
    pub fn with_unit_matrix(locations: Vec<Location>) -> Self {
        let size = locations.len();
        let distances = (0..size)
            .map(|i| (0..size).map(|j| i64::from(i != j)).collect())
            .collect();
        Self::with_matrix(locations, distances)
    }

    /// Answer duration requests from a separate matrix.
    #[must_use]
    pub fn with_durations(mut self, durations: DistanceMatrixRows) -> Self {
        self.durations = Some(durations);
        self
    }

    /// Fail the next requests with `failures`, in order, before answering
    /// normally.
    #[must_use]
    pub fn with_failures(mut self, failures: impl IntoIterator<Item = DistanceMatrixError>) -> Self {
        self.failures = RefCell::new(failures.into_iter().collect());
        self
    }

    /// Answer every request with a top-level service status instead of rows.
    #[must_use]
    pub fn with_status(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.status = Some((code.into(), message.into()));
        self
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.borrow().clone()
    }

    fn index_of(&self, location: &Location) -> Option<usize> {
        self.locations.iter().position(|known| known == location)
    }

    fn element(&self, origin: Option<usize>, destination: Option<usize>) -> MatrixElement {
        let lookup = |matrix: &DistanceMatrixRows| {
            origin
                .zip(destination)
                .and_then(|(i, j)| matrix.get(i).and_then(|row| row.get(j)).copied())
                .map(|value| Measure {
                    value,
                    text: String::new(),
                })
        };
        let distance = lookup(&self.distances);
        let duration = lookup(self.durations.as_ref().unwrap_or(&self.distances));
        let status = if distance.is_some() { "OK" } else { "NOT_FOUND" };
        MatrixElement {
            status: status.to_owned(),
            distance,
            duration,
        }
    }
}

#[async_trait(?Send)]
impl MatrixSource for StubMatrixSource {
    async fn fetch(
        &self,
        origins: &[Location],
        destinations: &[Location],
    ) -> Result<MatrixResponse, DistanceMatrixError> {
        self.requests.borrow_mut().push(StubRequest {
            origins: origins.to_vec(),
            destinations: destinations.len(),
        });
        if let Some(failure) = self.failures.borrow_mut().pop_front() {
            return Err(failure);
        }
        if let Some((code, message)) = &self.status {
            return Ok(MatrixResponse {
                status: code.clone(),
                error_message: Some(message.clone()),
                rows: Vec::new(),
            });
        }

        let columns: Vec<Option<usize>> = destinations.iter().map(|d| self.index_of(d)).collect();
        let rows = origins
            .iter()
            .map(|origin| {
                let i = self.index_of(origin);
                MatrixRow {
                    elements: columns.iter().map(|&j| self.element(i, j)).collect(),
                }
            })
            .collect();
        Ok(MatrixResponse {
            status: "OK".to_owned(),
            error_message: None,
            rows,
        })
    }
}
