// Error taxonomy and shared type aliases

use serde_json::{Map, Value};

/// One raw result entry as returned by the search API.
pub type Record = Map<String, Value>;

/// Why a paginated fetch could not continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationFault {
    /// The last response carried no `next` link.
    MissingNextLink,
    /// A follow-up page contained no entries.
    EmptyPage,
}

impl std::fmt::Display for PaginationFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaginationFault::MissingNextLink => write!(f, "response has no `next` link"),
            PaginationFault::EmptyPage => write!(f, "follow-up page contained no entries"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search state not ready: `{0}` read before execute")]
    StateNotReady(&'static str),

    #[error("Pagination stopped at {retrieved} of {total} results: {fault}")]
    PaginationProtocol {
        retrieved: usize,
        total: u64,
        fault: PaginationFault,
    },

    #[error("Search execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

/// Underlying cause of a failed `execute`.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("request failed: {0}")]
    Client(#[from] ClientError),

    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("`{field}` is not a valid result count: {value}")]
    InvalidTotal { field: &'static str, value: String },

    #[error("`{field}` has an unexpected shape: {value}")]
    MalformedField { field: String, value: String },

    #[error("cannot convert `{field}` value {value}: {reason}")]
    Conversion {
        field: String,
        value: String,
        reason: String,
    },
}

/// Failures raised by an [`ApiClient`](crate::client::ApiClient) implementation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_wraps_cause() {
        let err: SearchError = ExecutionError::MissingField("search-results").into();
        assert!(matches!(err, SearchError::Execution(ExecutionError::MissingField(_))));
        assert_eq!(
            err.to_string(),
            "Search execution failed: response is missing `search-results`"
        );
    }

    #[test]
    fn test_pagination_message() {
        let err = SearchError::PaginationProtocol {
            retrieved: 25,
            total: 40,
            fault: PaginationFault::MissingNextLink,
        };
        assert_eq!(
            err.to_string(),
            "Pagination stopped at 25 of 40 results: response has no `next` link"
        );
    }
}
