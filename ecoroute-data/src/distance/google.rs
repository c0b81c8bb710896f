//! Google Distance Matrix API response types.
//!
//! This module provides deserialisation types for the Distance Matrix API's
//! JSON output and the conversion into core matrix rows. Each response
//! carries a top-level `status`, and one element per origin/destination pair
//! with its own `status`.
//!
//! See: <https://developers.google.com/maps/documentation/distance-matrix/distance-matrix>

use ecoroute_core::{Cost, DistanceMatrixError, DistanceMatrixRows};
use serde::Deserialize;

use super::provider::CostMetric;

/// Status reported by successful responses and elements.
const OK: &str = "OK";

/// Distance Matrix API response.
#[derive(Debug, Deserialize)]
pub struct MatrixResponse {
    /// Top-level status, e.g. `"OK"`, `"OVER_QUERY_LIMIT"` or
    /// `"REQUEST_DENIED"`.
    pub status: String,

    /// Explanation accompanying a non-`OK` status.
    #[serde(default)]
    pub error_message: Option<String>,

    /// One row per origin, in request order.
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

impl MatrixResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == OK
    }
}

/// Elements for one origin.
#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    /// One element per destination, in request order.
    pub elements: Vec<MatrixElement>,
}

/// Travel between one origin and one destination.
#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    /// Element status, e.g. `"OK"`, `"NOT_FOUND"` or `"ZERO_RESULTS"`.
    pub status: String,
    /// Road distance in metres.
    #[serde(default)]
    pub distance: Option<Measure>,
    /// Travel time in seconds.
    #[serde(default)]
    pub duration: Option<Measure>,
}

/// A value with its human-readable rendering.
#[derive(Debug, Deserialize)]
pub struct Measure {
    /// Value in base units.
    pub value: Cost,
    /// Localised text, unused beyond debugging.
    #[serde(default)]
    pub text: String,
}

/// Convert a response for `origins` rows and `destinations` columns into
/// matrix rows.
///
/// Every element must be `OK` and carry the requested measure; a partial
/// matrix is never returned.
pub fn convert_response(
    response: MatrixResponse,
    origins: usize,
    destinations: usize,
    metric: CostMetric,
) -> Result<DistanceMatrixRows, DistanceMatrixError> {
    if !response.is_ok() {
        return Err(DistanceMatrixError::ServiceError {
            message: response.error_message.unwrap_or_default(),
            code: response.status,
        });
    }
    if response.rows.len() != origins {
        return Err(DistanceMatrixError::ParseError {
            message: format!("expected {origins} rows, response holds {}", response.rows.len()),
        });
    }

    response
        .rows
        .into_iter()
        .enumerate()
        .map(|(origin, row)| convert_row(row, origin, destinations, metric))
        .collect()
}

fn convert_row(
    row: MatrixRow,
    origin: usize,
    destinations: usize,
    metric: CostMetric,
) -> Result<Vec<Cost>, DistanceMatrixError> {
    if row.elements.len() != destinations {
        return Err(DistanceMatrixError::ParseError {
            message: format!(
                "row {origin}: expected {destinations} elements, response holds {}",
                row.elements.len()
            ),
        });
    }
    row.elements
        .into_iter()
        .enumerate()
        .map(|(destination, element)| {
            if element.status != OK {
                return Err(DistanceMatrixError::ServiceError {
                    code: element.status,
                    message: format!("no route from origin {origin} to destination {destination}"),
                });
            }
            let measure = match metric {
                CostMetric::Distance => element.distance,
                CostMetric::Duration => element.duration,
            };
            measure
                .map(|measure| measure.value)
                .filter(|value| *value >= 0)
                .ok_or_else(|| DistanceMatrixError::ParseError {
                    message: format!(
                        "row {origin}: element {destination} has no valid {metric} value"
                    ),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(json: &str) -> MatrixResponse {
        serde_json::from_str(json).expect("should deserialise")
    }

    const TWO_BY_TWO: &str = r#"{
        "destination_addresses": ["A", "B"],
        "origin_addresses": ["A", "B"],
        "rows": [
            {"elements": [
                {"distance": {"text": "1 ft", "value": 0}, "duration": {"text": "1 min", "value": 0}, "status": "OK"},
                {"distance": {"text": "3.1 mi", "value": 5012}, "duration": {"text": "9 mins", "value": 540}, "status": "OK"}
            ]},
            {"elements": [
                {"distance": {"text": "3.0 mi", "value": 4870}, "duration": {"text": "8 mins", "value": 480}, "status": "OK"},
                {"distance": {"text": "1 ft", "value": 0}, "duration": {"text": "1 min", "value": 0}, "status": "OK"}
            ]}
        ],
        "status": "OK"
    }"#;

    #[rstest]
    #[case(CostMetric::Distance, vec![vec![0, 5012], vec![4870, 0]])]
    #[case(CostMetric::Duration, vec![vec![0, 540], vec![480, 0]])]
    fn converts_the_requested_measure(
        #[case] metric: CostMetric,
        #[case] expected: DistanceMatrixRows,
    ) {
        let rows = convert_response(parse(TWO_BY_TWO), 2, 2, metric).expect("should convert");
        assert_eq!(rows, expected);
    }

    #[rstest]
    fn top_level_failure_is_a_service_error() {
        let response = parse(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "rows": []}"#,
        );
        let err = convert_response(response, 2, 2, CostMetric::Distance).expect_err("should fail");
        assert_eq!(
            err,
            DistanceMatrixError::ServiceError {
                code: "REQUEST_DENIED".to_owned(),
                message: "The provided API key is invalid.".to_owned(),
            }
        );
        assert!(!err.is_transient());
    }

    #[rstest]
    fn rate_limiting_is_transient() {
        let response = parse(r#"{"status": "OVER_QUERY_LIMIT"}"#);
        let err = convert_response(response, 1, 1, CostMetric::Distance).expect_err("should fail");
        assert!(err.is_transient());
    }

    #[rstest]
    fn unroutable_element_fails_the_whole_matrix() {
        let response = parse(
            r#"{"status": "OK", "rows": [{"elements": [
                {"status": "OK", "distance": {"value": 0}},
                {"status": "ZERO_RESULTS"}
            ]}]}"#,
        );
        let err = convert_response(response, 1, 2, CostMetric::Distance).expect_err("should fail");
        assert_eq!(
            err,
            DistanceMatrixError::ServiceError {
                code: "ZERO_RESULTS".to_owned(),
                message: "no route from origin 0 to destination 1".to_owned(),
            }
        );
    }

    #[rstest]
    #[case(r#"{"status": "OK", "rows": [{"elements": [{"status": "OK", "distance": {"value": 0}}]}]}"#, 2, 1)]
    #[case(r#"{"status": "OK", "rows": [{"elements": [{"status": "OK", "distance": {"value": 0}}]}]}"#, 1, 2)]
    #[case(r#"{"status": "OK", "rows": [{"elements": [{"status": "OK"}]}]}"#, 1, 1)]
    #[case(r#"{"status": "OK", "rows": [{"elements": [{"status": "OK", "distance": {"value": -4}}]}]}"#, 1, 1)]
    fn malformed_shapes_are_parse_errors(
        #[case] json: &str,
        #[case] origins: usize,
        #[case] destinations: usize,
    ) {
        let err = convert_response(parse(json), origins, destinations, CostMetric::Distance)
            .expect_err("should fail");
        assert!(matches!(err, DistanceMatrixError::ParseError { .. }));
    }
}
