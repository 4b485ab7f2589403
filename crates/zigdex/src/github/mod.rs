//! GitHub GraphQL API integration.

pub mod client;
pub mod error;
pub mod queries;
pub mod search;
pub mod types;

pub use client::{GRAPHQL_ENDPOINT, GithubClient};
pub use error::GithubError;
pub use search::discover;
pub use types::{DiscoveredRepo, DiscoveryOrigin, RepoDetails};
