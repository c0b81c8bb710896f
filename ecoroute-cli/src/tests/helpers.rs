//! Test helpers for composing delivery plans on disk and solving them
//! without network access.

use crate::CliError;
use crate::solve::{SolveComponents, SolveConfig};
use camino::{Utf8Path, Utf8PathBuf};
use ecoroute_core::test_support::FixedDistanceMatrixProvider;
use ecoroute_core::{
    Cost, DistanceMatrixError, DistanceMatrixProvider, DistanceMatrixRows, Location, SolveError,
    SolveRequest, SolveResponse, Solver,
};
use ecoroute_solver::LocalSearchSolver;
use serde_json::{Value, json};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Write `contents` to `path`, creating parent directories.
pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, contents).expect("write test file");
}

/// Temporary directory with its UTF-8 path.
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Two stops either side of the depot on a line; the best two-vehicle plan
/// costs 32.
pub(super) fn zigzag_matrix() -> DistanceMatrixRows {
    let positions: [Cost; 5] = [0, 3, -3, 8, -8];
    positions
        .iter()
        .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
        .collect()
}

/// Addresses standing in for the zigzag stops.
pub(super) fn zigzag_addresses() -> Vec<&'static str> {
    vec![
        "3610 Hacks Cross Rd Memphis TN",
        "1921 Elvis Presley Blvd Memphis TN",
        "149 Union Avenue Memphis TN",
        "1034 Audubon Drive Memphis TN",
        "1532 Madison Ave Memphis TN",
    ]
}

/// Plan JSON for the zigzag instance with the given cost source.
pub(super) fn zigzag_plan(costs: (&str, Value)) -> Value {
    let (key, value) = costs;
    let mut plan = json!({
        "demands": [0, 1, 2, 3, 1],
        "vehicle_capacities": [5, 5],
        "parameters": {
            "time_limit_ms": 30000,
            "local_search_metaheuristic": "GREEDY_DESCENT"
        }
    });
    plan[key] = value;
    plan
}

/// Write `plan` as pretty JSON to `path`.
pub(super) fn write_plan(path: &Utf8Path, plan: &Value) {
    let payload = serde_json::to_string_pretty(plan).expect("serialise plan");
    write_utf8(path, payload.as_bytes());
}

/// Solve collaborators that never leave the process.
///
/// Location plans are costed from `matrix`, or fail with `failure` when set.
pub(super) struct StubSolveComponents {
    pub(super) matrix: DistanceMatrixRows,
    pub(super) failure: Option<DistanceMatrixError>,
    pub(super) seen: Arc<Mutex<Vec<SolveRequest>>>,
}

impl StubSolveComponents {
    pub(super) fn zigzag() -> Self {
        Self {
            matrix: zigzag_matrix(),
            failure: None,
            seen: Arc::default(),
        }
    }

    pub(super) fn failing(failure: DistanceMatrixError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::zigzag()
        }
    }

    /// Requests handed to the solver so far.
    pub(super) fn requests(&self) -> Vec<SolveRequest> {
        self.seen.lock().expect("requests lock").clone()
    }
}

impl SolveComponents for StubSolveComponents {
    fn solver(&self, _config: &SolveConfig) -> Box<dyn Solver> {
        Box::new(RecordingSolver {
            inner: LocalSearchSolver::new(),
            seen: Arc::clone(&self.seen),
        })
    }

    fn distance_provider(
        &self,
        _config: &SolveConfig,
        _api_key: &str,
    ) -> Result<Box<dyn DistanceMatrixProvider>, CliError> {
        match &self.failure {
            Some(failure) => Ok(Box::new(FailingProvider(failure.clone()))),
            None => Ok(Box::new(FixedDistanceMatrixProvider::new(self.matrix.clone()))),
        }
    }
}

/// Local search that keeps a copy of every request it solves.
struct RecordingSolver {
    inner: LocalSearchSolver,
    seen: Arc<Mutex<Vec<SolveRequest>>>,
}

impl Solver for RecordingSolver {
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        self.seen
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.inner.solve(request)
    }
}

struct FailingProvider(DistanceMatrixError);

impl DistanceMatrixProvider for FailingProvider {
    fn distance_matrix(
        &self,
        _locations: &[Location],
    ) -> Result<DistanceMatrixRows, DistanceMatrixError> {
        Err(self.0.clone())
    }
}
