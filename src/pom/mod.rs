//! Maven descriptors and the versions propagated through them
//!
//! - **versions**: the release train registry (`Versions`)
//! - **descriptor**: lossless reading and editing of `pom.xml` files
//! - **release_train**: building the registry from a release train checkout
//! - **updater**: walking a project tree and applying the registry

pub mod descriptor;
pub mod release_train;
pub mod updater;
pub mod versions;
