pub mod client;
pub mod graphql;
pub mod mapper;

pub use client::GitHubPlatform;
