use crate::commands::update::print_report;
use crate::core::config::ReleaserConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::pom::updater::ProjectPomUpdater;
use std::path::PathBuf;

/// Run the bump command
pub fn run_bump(config: &ReleaserConfig, project_dir: PathBuf, version: String) -> ReleaseResult<()> {
  if version.trim().is_empty() {
    return Err(ReleaseError::with_help(
      "Version to bump to is empty",
      "Pass the new version, e.g. `releaser bump . 1.2.1.BUILD-SNAPSHOT`.",
    ));
  }

  println!("🔖 Bumping {} to {}", project_dir.display(), version);
  let report = ProjectPomUpdater::new(config.clone()).bump_versions(&project_dir, version.trim())?;
  print_report(&report);

  Ok(())
}
