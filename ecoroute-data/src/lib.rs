//! Data acquisition for the Ecoroute engine.
//!
//! Responsibilities:
//! - Fetch pairwise travel costs from external mapping services.
//! - Translate service responses and failures into core domain types.
//!
//! Boundaries:
//! - Do not encode routing rules (live in `ecoroute-core` and
//!   `ecoroute-solver`).
//! - Keep blocking I/O off async executors; the synchronous provider trait is
//!   bridged onto a Tokio runtime internally.
//!
//! Invariants:
//! - A provider either returns a complete matrix or an error.
//! - Credentials never appear in error messages or logs.

pub mod distance;

pub use distance::{
    CostMetric, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpDistanceMatrixProvider,
    HttpDistanceMatrixProviderConfig, HttpMatrixSource, MatrixSource, ProviderBuildError,
};
