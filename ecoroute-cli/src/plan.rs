//! Delivery-plan documents accepted by `ecoroute solve`.

use camino::Utf8Path;
use ecoroute_core::{Demand, DistanceMatrixRows, Location, SearchParameters, SolveRequest};
use ecoroute_fs::open_utf8_file;
use serde::{Deserialize, Serialize};
use std::io::BufReader;

use crate::CliError;

/// A delivery plan: the fleet, the demand at each location and either the
/// pairwise costs or the locations to fetch them for.
///
/// Index 0 of `demands` (and of `locations` or `distance_matrix`) is the
/// depot unless `depot` says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DeliveryPlan {
    /// Precomputed costs, one row per location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) distance_matrix: Option<DistanceMatrixRows>,
    /// Addresses or coordinates to fetch costs for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) locations: Option<Vec<Location>>,
    /// Demand per location; the depot's entry is ignored.
    pub(crate) demands: Vec<Demand>,
    /// Capacity per vehicle.
    pub(crate) vehicle_capacities: Vec<Demand>,
    /// Number of vehicles; defaults to the number of capacities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) vehicle_count: Option<usize>,
    /// Index of the depot.
    #[serde(default)]
    pub(crate) depot: usize,
    /// Search tuning.
    #[serde(default)]
    pub(crate) parameters: SearchParameters,
}

/// Where a plan's costs come from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlanCosts {
    /// Costs given inline.
    Matrix(DistanceMatrixRows),
    /// Costs to be fetched for these locations.
    Locations(Vec<Location>),
}

impl DeliveryPlan {
    /// Split the plan into its cost source and the request skeleton awaiting
    /// a matrix.
    pub(crate) fn into_parts(self, path: &Utf8Path) -> Result<(PlanCosts, PlanSkeleton), CliError> {
        let costs = match (self.distance_matrix, self.locations) {
            (Some(matrix), None) => PlanCosts::Matrix(matrix),
            (None, Some(locations)) => {
                if locations.len() != self.demands.len() {
                    return Err(CliError::LocationCountMismatch {
                        path: path.to_path_buf(),
                        locations: locations.len(),
                        demands: self.demands.len(),
                    });
                }
                PlanCosts::Locations(locations)
            }
            (Some(_), Some(_)) => {
                return Err(CliError::AmbiguousPlanCosts {
                    path: path.to_path_buf(),
                });
            }
            (None, None) => {
                return Err(CliError::MissingPlanCosts {
                    path: path.to_path_buf(),
                });
            }
        };
        let skeleton = PlanSkeleton {
            demands: self.demands,
            vehicle_capacities: self.vehicle_capacities,
            vehicle_count: self.vehicle_count,
            depot: self.depot,
            parameters: self.parameters,
        };
        Ok((costs, skeleton))
    }
}

/// Everything a [`SolveRequest`] needs apart from the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanSkeleton {
    demands: Vec<Demand>,
    vehicle_capacities: Vec<Demand>,
    vehicle_count: Option<usize>,
    depot: usize,
    parameters: SearchParameters,
}

impl PlanSkeleton {
    /// Complete the request with `distance_matrix`.
    pub(crate) fn into_request(self, distance_matrix: DistanceMatrixRows) -> SolveRequest {
        let request = SolveRequest::new(distance_matrix, self.demands, self.vehicle_capacities)
            .with_depot(self.depot)
            .with_parameters(self.parameters);
        match self.vehicle_count {
            Some(count) => request.with_vehicle_count(count),
            None => request,
        }
    }
}

/// Loads a JSON-encoded [`DeliveryPlan`] from disk.
pub(crate) fn load_delivery_plan(path: &Utf8Path) -> Result<DeliveryPlan, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenDeliveryPlan {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseDeliveryPlan {
        path: path.to_path_buf(),
        source,
    })
}
