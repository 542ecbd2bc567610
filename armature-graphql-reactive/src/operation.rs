//! Operation descriptors and per-operation options.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of a GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// A read-only query.
    Query,
    /// A mutation.
    Mutation,
    /// A long-lived subscription.
    Subscription,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Mutation => write!(f, "mutation"),
            Self::Subscription => write!(f, "subscription"),
        }
    }
}

/// A typed GraphQL operation.
///
/// The adapter reads a descriptor only for logging and hands it to the
/// client as-is. [`document`](Self::document) and
/// [`variables`](Self::variables) are what a
/// [`CallbackClient`](crate::CallbackClient) implementation sends over the
/// wire.
pub trait GraphQLOperation: Send + 'static {
    /// The payload type the operation resolves to.
    type Data: Send + 'static;

    /// Operation name, as declared in the document.
    const OPERATION_NAME: &'static str;

    /// Operation kind.
    const OPERATION_KIND: OperationKind;

    /// The GraphQL document.
    fn document(&self) -> &str;

    /// Variables for the operation.
    fn variables(&self) -> Option<Value> {
        None
    }
}

/// Marker for query operations.
pub trait GraphQLQuery: GraphQLOperation {}

/// Marker for mutation operations.
pub trait GraphQLMutation: GraphQLOperation {}

/// Marker for subscription operations.
pub trait GraphQLSubscription: GraphQLOperation {}

/// How a query interacts with the client's cache.
///
/// The adapter passes this through to the client uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Return cached data if available, otherwise fetch.
    #[default]
    ReturnCacheDataElseFetch,
    /// Always fetch, then write the result to the cache.
    FetchIgnoringCacheData,
    /// Always fetch and leave the cache untouched.
    FetchIgnoringCacheCompletely,
    /// Only read from the cache.
    ReturnCacheDataDontFetch,
    /// Return cached data, then fetch and return again.
    ReturnCacheDataAndFetch,
}

impl std::fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ReturnCacheDataElseFetch => "return_cache_data_else_fetch",
            Self::FetchIgnoringCacheData => "fetch_ignoring_cache_data",
            Self::FetchIgnoringCacheCompletely => "fetch_ignoring_cache_completely",
            Self::ReturnCacheDataDontFetch => "return_cache_data_dont_fetch",
            Self::ReturnCacheDataAndFetch => "return_cache_data_and_fetch",
        };
        f.write_str(name)
    }
}
