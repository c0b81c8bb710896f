//! HTTP-based distance-matrix providers.
//!
//! This module provides [`HttpDistanceMatrixProvider`], an implementation of
//! [`ecoroute_core::DistanceMatrixProvider`] backed by the Google Distance
//! Matrix API.
//!
//! # Architecture
//!
//! Requests go through a [`MatrixSource`]: [`HttpMatrixSource`] talks to the
//! service over HTTP, and tests substitute an in-memory source.
//!
//! The service caps the number of elements (origins × destinations) per
//! request, so the provider splits the origin rows into batches, requests
//! the batches concurrently and reassembles the rows by offset. Transient
//! failures are retried with exponential backoff. The synchronous
//! [`DistanceMatrixProvider`] trait is implemented by blocking on the async
//! HTTP calls internally, keeping the core library embeddable in synchronous
//! contexts.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use ecoroute_core::{DistanceMatrixProvider, Location};
//! use ecoroute_data::{HttpDistanceMatrixProvider, HttpDistanceMatrixProviderConfig};
//!
//! let config = HttpDistanceMatrixProviderConfig::new("my-api-key")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_max_retries(5);
//! let provider = HttpDistanceMatrixProvider::with_config(config)?;
//!
//! let locations = vec![
//!     Location::address("3610 Hacks Cross Rd Memphis TN"),
//!     Location::address("1921 Elvis Presley Blvd Memphis TN"),
//! ];
//! let matrix = provider.distance_matrix(&locations)?;
//! assert_eq!(matrix.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`DistanceMatrixProvider`]: ecoroute_core::DistanceMatrixProvider

mod batch;
pub mod google;
mod provider;
mod source;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    CostMetric, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpDistanceMatrixProvider,
    HttpDistanceMatrixProviderConfig, ProviderBuildError,
};
pub use source::{HttpMatrixSource, MatrixSource};
