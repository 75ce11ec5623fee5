pub mod approve;
pub mod create;
pub mod types;

pub use approve::approve_pull_request;
pub use create::create_pull_request;
