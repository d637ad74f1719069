//! Core building blocks shared by the commands
//!
//! - **config**: releaser.toml parsing and command line overrides
//! - **error**: error types with contextual help messages
//! - **vcs**: reading release train files through the system git

pub mod config;
pub mod error;
pub mod vcs;
