//! Error types for the source adapter crate.

use thiserror::Error;

/// Errors raised while fetching data from an upstream provider.
///
/// Every variant means the same thing to the rest of the system: the source
/// is unavailable and the current refresh cannot proceed. The variants exist
/// so logs can tell a timeout apart from a decode failure.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request did not complete within the adapter's timeout.
    #[error("{provider}: request timed out")]
    Timeout {
        /// The provider that timed out
        provider: &'static str,
    },

    /// The request failed at the transport level (DNS, TLS, connect, ...).
    #[error("{provider}: request failed: {message}")]
    Network {
        /// The provider that was being called
        provider: &'static str,
        /// The underlying transport error message
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider}: unexpected status {status}")]
    Status {
        /// The provider that returned the status
        provider: &'static str,
        /// The HTTP status code received
        status: u16,
    },

    /// The response body did not match the provider's documented shape.
    #[error("{provider}: invalid response body: {message}")]
    Decode {
        /// The provider whose body failed to decode
        provider: &'static str,
        /// Description of the decode failure
        message: String,
    },

    /// The provider reported an application-level error in its payload.
    #[error("{provider}: upstream error: {message}")]
    Upstream {
        /// The provider that reported the error
        provider: &'static str,
        /// The provider's own error message
        message: String,
    },
}

impl SourceError {
    /// Classify a `reqwest` error into the matching variant.
    pub(crate) fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { provider }
        } else if err.is_decode() {
            Self::Decode {
                provider,
                message: err.to_string(),
            }
        } else {
            Self::Network {
                provider,
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SourceError::Timeout {
            provider: "RESTCOUNTRIES",
        };
        assert_eq!(format!("{}", error), "RESTCOUNTRIES: request timed out");

        let error = SourceError::Status {
            provider: "OPEN_ER_API",
            status: 502,
        };
        assert_eq!(format!("{}", error), "OPEN_ER_API: unexpected status 502");
    }
}
