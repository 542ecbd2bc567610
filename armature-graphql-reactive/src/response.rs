//! GraphQL response envelope types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope handed to a client callback.
///
/// `data` and `errors` are independent: a response may carry neither, either, or both.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphQLResponse<T = Value> {
    /// The data returned by the operation.
    #[serde(default)]
    pub data: Option<T>,
    /// Errors returned by the server, in order.
    #[serde(default)]
    pub errors: Option<Vec<GraphQLResponseError>>,
    /// Extensions (for tracing, caching info, etc.).
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl<T> GraphQLResponse<T> {
    /// A response carrying only data.
    pub fn from_data(data: T) -> Self {
        Self {
            data: Some(data),
            errors: None,
            extensions: None,
        }
    }

    /// A response carrying only errors.
    pub fn from_errors(errors: Vec<GraphQLResponseError>) -> Self {
        Self {
            data: None,
            errors: Some(errors),
            extensions: None,
        }
    }

    /// A response carrying neither data nor errors.
    pub fn empty() -> Self {
        Self {
            data: None,
            errors: None,
            extensions: None,
        }
    }

    /// Check if the response has errors.
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// The first error, if any.
    pub fn first_error(&self) -> Option<&GraphQLResponseError> {
        self.errors.as_ref().and_then(|e| e.first())
    }

    /// Get the data, ignoring any errors.
    pub fn data(self) -> Option<T> {
        self.data
    }

    /// Get the errors.
    pub fn errors(&self) -> Option<&[GraphQLResponseError]> {
        self.errors.as_deref()
    }
}

impl<T> From<graphql_client::Response<T>> for GraphQLResponse<T> {
    fn from(response: graphql_client::Response<T>) -> Self {
        Self {
            data: response.data,
            errors: response
                .errors
                .map(|errors| errors.into_iter().map(Into::into).collect()),
            extensions: response
                .extensions
                .map(|ext| Value::Object(ext.into_iter().collect())),
        }
    }
}

/// A GraphQL error from the server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GraphQLResponseError {
    /// Error message.
    pub message: String,
    /// Locations in the query where the error occurred.
    #[serde(default)]
    pub locations: Option<Vec<ErrorLocation>>,
    /// Path to the field that caused the error.
    #[serde(default)]
    pub path: Option<Vec<PathSegment>>,
    /// Additional error extensions.
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQLResponseError {
    /// An error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }

    /// The dotted field path, if the server reported one.
    pub fn path_string(&self) -> Option<String> {
        self.path.as_deref().map(format_path)
    }
}

impl std::fmt::Display for GraphQLResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(locations) = &self.locations
            && !locations.is_empty() {
                write!(f, " at ")?;
                for (i, loc) in locations.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}:{}", loc.line, loc.column)?;
                }
            }
        Ok(())
    }
}

impl std::error::Error for GraphQLResponseError {}

impl From<graphql_client::Error> for GraphQLResponseError {
    fn from(error: graphql_client::Error) -> Self {
        Self {
            message: error.message,
            locations: error.locations.map(|locations| {
                locations
                    .into_iter()
                    .map(|loc| ErrorLocation {
                        line: u32::try_from(loc.line).unwrap_or_default(),
                        column: u32::try_from(loc.column).unwrap_or_default(),
                    })
                    .collect()
            }),
            path: error.path.map(|path| {
                path.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(key) => PathSegment::Field(key),
                        graphql_client::PathFragment::Index(idx) => {
                            PathSegment::Index(usize::try_from(idx).unwrap_or_default())
                        }
                    })
                    .collect()
            }),
            extensions: error
                .extensions
                .map(|ext| Value::Object(ext.into_iter().collect())),
        }
    }
}

/// Location in the GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// Path segment in a GraphQL error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Field name.
    Field(String),
    /// Array index.
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{}", name),
            Self::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// Format a path as a string.
pub fn format_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_errors_and_null_data() {
        let response: GraphQLResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [
                { "message": "field X not found", "locations": [{ "line": 2, "column": 3 }] },
                { "message": "field Y deprecated" }
            ]
        }))
        .unwrap();

        assert!(response.data.is_none());
        assert!(response.has_errors());
        assert_eq!(response.errors().map(<[_]>::len), Some(2));
        let first = response.first_error().unwrap();
        assert_eq!(first.to_string(), "field X not found at 2:3");
    }

    #[test]
    fn test_empty_error_list_is_not_an_error() {
        let response: GraphQLResponse = serde_json::from_value(json!({
            "data": { "name": "Ada" },
            "errors": []
        }))
        .unwrap();

        assert!(!response.has_errors());
        assert!(response.first_error().is_none());
        assert_eq!(response.data(), Some(json!({ "name": "Ada" })));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let response: GraphQLResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.data.is_none());
        assert!(response.errors.is_none());
        assert!(response.extensions.is_none());
    }

    #[test]
    fn test_format_path() {
        let error = GraphQLResponseError {
            path: Some(vec![
                PathSegment::Field("users".into()),
                PathSegment::Index(2),
                PathSegment::Field("name".into()),
            ]),
            ..GraphQLResponseError::new("bad name")
        };
        assert_eq!(error.path_string().as_deref(), Some("users.[2].name"));
    }

    #[test]
    fn test_from_graphql_client_response() {
        let raw: graphql_client::Response<serde_json::Value> = serde_json::from_value(json!({
            "data": { "name": "Ada" },
            "errors": [{
                "message": "partial",
                "locations": [{ "line": 1, "column": 9 }],
                "path": ["user", 0]
            }]
        }))
        .unwrap();

        let response: GraphQLResponse = raw.into();
        assert_eq!(response.data, Some(json!({ "name": "Ada" })));
        let first = response.first_error().unwrap();
        assert_eq!(first.message, "partial");
        assert_eq!(first.locations.as_deref(), Some(&[ErrorLocation { line: 1, column: 9 }][..]));
        assert_eq!(first.path_string().as_deref(), Some("user.[0]"));
    }
}
