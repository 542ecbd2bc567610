//! # Armature GraphQL Reactive
//!
//! Futures and streams over a callback-style GraphQL client.
//!
//! A [`CallbackClient`] starts an operation and reports the outcome through a
//! completion callback. [`ReactiveClient`] wraps such a client and returns a
//! [`SingleResult`] future (or a [`SubscriptionStream`]) instead, so results
//! compose with ordinary async code.
//!
//! ## Features
//!
//! - **Four operations**: `fetch`, `perform`, `upload` and `subscribe`
//! - **Error precedence**: client failures first, then the first GraphQL error
//! - **Mapping**: a caller-supplied function shapes the payload of every success
//! - **Cancellation**: dropping an unsettled result cancels the client operation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armature_graphql_reactive::{CachePolicy, ReactiveClient, ReactiveGraphQL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = MyCallbackClient::connect("https://api.example.com/graphql");
//!     let client = ReactiveClient::new(transport);
//!
//!     let name = client
//!         .fetch(GetUser { id: "123".into() }, CachePolicy::FetchIgnoringCacheData, |data| {
//!             data.map(|d| d.user.name)
//!         })
//!         .await?;
//!
//!     println!("User: {:?}", name);
//!     Ok(())
//! }
//! ```
//!
//! ## Subscriptions
//!
//! ```rust,ignore
//! use armature_graphql_reactive::{ReactiveClient, ReactiveGraphQL};
//! use futures::StreamExt;
//!
//! let mut messages = client.subscribe(MessageAdded, |data| data.map(|d| d.message));
//!
//! while let Some(result) = messages.next().await {
//!     match result {
//!         Ok(message) => println!("Received: {:?}", message),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```

mod adapter;
mod client;
mod config;
mod error;
mod operation;
mod resolve;
mod response;
mod settle;
mod subscription;
mod upload;

pub use adapter::{ReactiveClient, ReactiveGraphQL};
pub use client::{
    CallbackClient, Cancellable, ClientResult, OperationHandle, ResultCallback,
    SubscriptionCallback,
};
pub use config::{ReactiveConfig, ReactiveConfigBuilder};
pub use error::{ReactiveError, Result};
pub use operation::{
    CachePolicy, GraphQLMutation, GraphQLOperation, GraphQLQuery, GraphQLSubscription,
    OperationKind,
};
pub use resolve::resolve;
pub use response::{ErrorLocation, GraphQLResponse, GraphQLResponseError, PathSegment, format_path};
pub use settle::{SettlementCell, SingleResult};
pub use subscription::SubscriptionStream;
pub use upload::{DEFAULT_MIME_TYPE, FileContent, GraphQLFile};

// Re-export common types
pub use serde_json::Value as JsonValue;
