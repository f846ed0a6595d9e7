pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infra;

// Re-exports for convenience
pub use domain::pattern::{PathPattern, SubConfigParser, SubConfigPattern, SubConfigType};
pub use domain::subconfig::{DiscoveryContext, SubConfig, SubConfigKind};
pub use infra::discover::discover;
pub use infra::file_pattern::resolve;
