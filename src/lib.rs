pub mod config;
pub mod error;
pub mod output;
pub mod platform;
pub mod workflow;
pub mod workspace;
