//! Reactive adapter error types.

use std::time::Duration;

use thiserror::Error;

use crate::GraphQLResponseError;

/// Result type for reactive operations, generic over the client's error type.
pub type Result<T, E> = std::result::Result<T, ReactiveError<E>>;

/// Errors surfaced through a reactive result.
///
/// `E` is the error type of the wrapped [`CallbackClient`](crate::CallbackClient);
/// client failures are carried unchanged.
#[derive(Debug, Clone, Error)]
pub enum ReactiveError<E> {
    /// The client reported a failure (transport, cache, decoding, ...).
    #[error("Client error: {0}")]
    Client(E),

    /// The response carried operation-level errors; only the first is kept.
    #[error("GraphQL error: {0}")]
    GraphQL(GraphQLResponseError),

    /// The client dropped the completion callback without invoking it.
    #[error("Operation was abandoned before producing a result")]
    Abandoned,

    /// No result arrived within the configured timeout.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

impl<E> ReactiveError<E> {
    /// Check if this error came from the client itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Client(_))
    }

    /// Check if this is a GraphQL error (server-side).
    pub fn is_graphql_error(&self) -> bool {
        matches!(self, Self::GraphQL(_))
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Get the GraphQL error if this is a GraphQL error.
    pub fn graphql_error(&self) -> Option<&GraphQLResponseError> {
        match self {
            Self::GraphQL(error) => Some(error),
            _ => None,
        }
    }

    /// Take the client error out, if this is one.
    pub fn into_client_error(self) -> Option<E> {
        match self {
            Self::Client(error) => Some(error),
            _ => None,
        }
    }
}
