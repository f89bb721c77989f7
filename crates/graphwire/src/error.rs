//! Error types for GraphQL execution.

use thiserror::Error;

use crate::response::GraphQLError;

/// Errors produced while building or executing a GraphQL operation.
///
/// Every failure of [`Client::execute`](crate::Client::execute) is returned
/// to the caller as one of these variants; nothing is retried or swallowed
/// internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Serializing the outgoing request body (or a variable value) failed.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The endpoint URL could not be parsed.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// A header name or value was not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The HTTP exchange itself failed: connection refused, DNS failure,
    /// TLS failure, or the body stream breaking mid-transfer.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request deadline elapsed before the exchange completed.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-200 status and a body that did not
    /// parse as a response envelope. Carries the numeric status code; the
    /// body is presumed non-JSON and is discarded.
    #[error("server returned a non-200 status code: {0}")]
    Status(u16),

    /// The server answered 200 but the body did not parse as a response
    /// envelope.
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The envelope parsed but carried neither data nor errors.
    #[error("response contained no data")]
    MissingData,

    /// The server executed the operation and reported at least one error.
    /// Only the first is surfaced here; [`Client::execute_raw`] exposes the
    /// full list.
    ///
    /// [`Client::execute_raw`]: crate::Client::execute_raw
    #[error(transparent)]
    Operation(#[from] GraphQLError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}

/// A specialized Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_code() {
        let err = Error::Status(502);
        assert_eq!(err.to_string(), "server returned a non-200 status code: 502");
    }

    #[test]
    fn operation_error_is_transparent() {
        let graph_err = GraphQLError {
            message: "field not found".into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        };
        let err = Error::from(graph_err);
        assert_eq!(err.to_string(), "field not found");
        assert!(matches!(err, Error::Operation(_)));
    }

    #[test]
    fn encode_error_wraps_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::Encode(serde_err);
        assert!(err.to_string().starts_with("failed to encode request body"));
    }
}
