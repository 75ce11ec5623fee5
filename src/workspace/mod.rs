pub mod git;
pub mod manager;
pub mod remote;

pub use manager::Workspace;
pub use remote::extract_repo_path;
