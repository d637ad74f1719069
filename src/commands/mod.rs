//! CLI commands for releaser
//!
//! - **versions**: print the release train registry
//! - **update**: propagate the registry through a project and check for snapshots
//! - **bump**: move every module of a project to a new version

pub mod bump;
pub mod update;
pub mod versions;

pub use bump::run_bump;
pub use update::run_update;
pub use versions::run_versions;
