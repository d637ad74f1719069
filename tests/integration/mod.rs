//! Integration tests running the releaser binary against scratch projects

mod helpers;
mod test_bump;
mod test_update;
