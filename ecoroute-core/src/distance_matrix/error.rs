use thiserror::Error;

/// Errors from [`crate::DistanceMatrixProvider::distance_matrix`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceMatrixError {
    /// No locations were provided.
    ///
    /// Providers require at least one location to compute a matrix.
    #[error("at least one location is required")]
    EmptyInput,

    /// The request could not be delivered.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// Request URL with credentials redacted.
        url: String,
        /// Underlying transport error.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL with credentials redacted.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Request URL with credentials redacted.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },

    /// The service reported an application-level failure.
    #[error("distance service returned {code}: {message}")]
    ServiceError {
        /// Status code reported by the service, e.g. `OVER_QUERY_LIMIT`.
        code: String,
        /// Optional explanation from the service.
        message: String,
    },

    /// The response body could not be interpreted as a matrix.
    #[error("failed to parse distance service response: {message}")]
    ParseError {
        /// Description of the malformed content.
        message: String,
    },

    /// Every attempt at a batch failed with a transient error.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made, the first included.
        attempts: u32,
        /// Error returned by the final attempt.
        #[source]
        last: Box<DistanceMatrixError>,
    },
}

/// Service status codes worth retrying.
const TRANSIENT_SERVICE_CODES: [&str; 2] = ["OVER_QUERY_LIMIT", "UNKNOWN_ERROR"];

impl DistanceMatrixError {
    /// Whether repeating the same request may succeed.
    ///
    /// Network failures, timeouts, HTTP 429 and 5xx responses and the
    /// service's rate-limit codes are transient; everything else fails the
    /// same way on every attempt.
    ///
    /// # Examples
    /// ```
    /// use ecoroute_core::DistanceMatrixError;
    ///
    /// let err = DistanceMatrixError::HttpError {
    ///     url: "https://maps.example.com".into(),
    ///     status: 503,
    ///     message: "unavailable".into(),
    /// };
    /// assert!(err.is_transient());
    /// assert!(!DistanceMatrixError::EmptyInput.is_transient());
    /// ```
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError { .. } | Self::Timeout { .. } => true,
            Self::HttpError { status, .. } => *status == 429 || (500..600).contains(status),
            Self::ServiceError { code, .. } => TRANSIENT_SERVICE_CODES.contains(&code.as_str()),
            Self::EmptyInput | Self::ParseError { .. } | Self::RetriesExhausted { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn http(status: u16) -> DistanceMatrixError {
        DistanceMatrixError::HttpError {
            url: "https://maps.example.com".to_owned(),
            status,
            message: String::new(),
        }
    }

    fn service(code: &str) -> DistanceMatrixError {
        DistanceMatrixError::ServiceError {
            code: code.to_owned(),
            message: String::new(),
        }
    }

    #[rstest]
    #[case(http(429), true)]
    #[case(http(500), true)]
    #[case(http(503), true)]
    #[case(http(400), false)]
    #[case(http(403), false)]
    #[case(service("OVER_QUERY_LIMIT"), true)]
    #[case(service("UNKNOWN_ERROR"), true)]
    #[case(service("REQUEST_DENIED"), false)]
    #[case(service("MAX_ELEMENTS_EXCEEDED"), false)]
    #[case(DistanceMatrixError::Timeout { url: String::new(), timeout_secs: 5 }, true)]
    #[case(DistanceMatrixError::NetworkError { url: String::new(), message: String::new() }, true)]
    #[case(DistanceMatrixError::ParseError { message: String::new() }, false)]
    #[case(DistanceMatrixError::EmptyInput, false)]
    fn classifies_transient_failures(#[case] err: DistanceMatrixError, #[case] transient: bool) {
        assert_eq!(err.is_transient(), transient);
    }

    #[rstest]
    fn exhausted_retries_are_final_and_keep_the_cause() {
        let err = DistanceMatrixError::RetriesExhausted {
            attempts: 4,
            last: Box::new(http(503)),
        };
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "gave up after 4 attempts: HTTP 503 from https://maps.example.com: "
        );
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), http(503).to_string());
    }
}
