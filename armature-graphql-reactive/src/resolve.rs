//! Turning a client result into a reactive outcome.

use crate::{ClientResult, GraphQLResponse, ReactiveError};

/// Resolve a client result against a mapping function.
///
/// A client failure wins outright. Otherwise the first operation-level error
/// wins and the rest are dropped. Only an error-free response reaches `data`,
/// and `data` returning `None` is still a success.
pub fn resolve<D, U, E, F>(result: ClientResult<D, E>, data: F) -> crate::Result<Option<U>, E>
where
    F: FnOnce(Option<D>) -> Option<U>,
{
    let GraphQLResponse {
        data: payload,
        errors,
        ..
    } = result.map_err(ReactiveError::Client)?;

    if let Some(first) = errors.and_then(|errors| errors.into_iter().next()) {
        return Err(ReactiveError::GraphQL(first));
    }

    Ok(data(payload))
}
