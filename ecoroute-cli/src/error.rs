//! Error types emitted by the Ecoroute CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use ecoroute_core::SolveError;
use ecoroute_data::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the Ecoroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command line could not be parsed.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Merging config files, environment and flags failed.
    #[error("could not merge solve configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// No layer supplied a required option.
    #[error("{field} is required: pass --{field} or set {env}")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option holds a value outside its accepted set.
    #[error("invalid {field} {value:?}: expected {expected}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The plan path points at nothing.
    #[error("no {field} found at {path:?}")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The plan path points at a directory or other non-file.
    #[error("{field} at {path:?} is not a regular file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The plan path could not be checked.
    #[error("could not check {field} at {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the delivery plan failed.
    #[error("failed to open delivery plan at {path:?}: {source}")]
    OpenDeliveryPlan {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Delivery plan JSON could not be decoded.
    #[error("failed to parse delivery plan JSON at {path:?}: {source}")]
    ParseDeliveryPlan {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The plan gives neither a distance matrix nor locations.
    #[error("delivery plan {path:?} needs a distance_matrix or a list of locations")]
    MissingPlanCosts { path: Utf8PathBuf },
    /// The plan gives both a distance matrix and locations.
    #[error("delivery plan {path:?} gives both a distance_matrix and locations; keep one")]
    AmbiguousPlanCosts { path: Utf8PathBuf },
    /// The plan lists a different number of locations than demands.
    #[error("delivery plan {path:?} lists {locations} locations but {demands} demands")]
    LocationCountMismatch {
        path: Utf8PathBuf,
        locations: usize,
        demands: usize,
    },
    /// Constructing the distance-matrix provider failed.
    #[error("failed to build distance provider for {base_url:?}: {source}")]
    BuildDistanceProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Fetching the matrix or solving the plan failed.
    #[error("could not plan routes: {source}")]
    Solve { source: SolveError },
    /// Serialising the solve response failed.
    #[error("failed to serialise solve response: {0}")]
    SerialiseSolveResponse(#[source] serde_json::Error),
    /// Creating the output file failed.
    #[error("failed to create output file {path:?}: {source}")]
    CreateSolveOutput {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing the routes failed.
    #[error("failed to write routes: {0}")]
    WriteSolveOutput(#[source] std::io::Error),
}

impl CliError {
    /// Whether re-running the same command may succeed.
    ///
    /// Only distance-service failures qualify; every other error fails the
    /// same way on every attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Solve { source } if source.is_retryable())
    }
}
