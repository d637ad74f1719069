use crate::core::config::ReleaserConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::pom::updater::ProjectPomUpdater;
use crate::pom::versions::Versions;

/// Run the versions command
pub fn run_versions(config: &ReleaserConfig, json: bool) -> ReleaseResult<()> {
  let versions = ProjectPomUpdater::new(config.clone()).retrieve_versions_from_release_train()?;

  if json {
    println!(
      "{}",
      serde_json::to_string_pretty(&versions.to_project_versions())
        .map_err(|e| ReleaseError::message(format!("Serialization error: {}", e)))?
    );
  } else {
    print_versions_table(&versions);
  }

  Ok(())
}

fn print_versions_table(versions: &Versions) {
  println!("\n📦 Release Train\n");
  println!("  Spring Boot:        {}", display_or_dash(&versions.boot_version));
  println!("  Spring Cloud Build: {}", display_or_dash(&versions.build_version));
  println!();

  println!("{:<45} VERSION", "PROJECT");
  println!("{:-<70}", "");
  for project in versions.projects() {
    let marker = if project.is_snapshot() { " (snapshot)" } else { "" };
    println!("{:<45} {}{}", project.name, project.version, marker);
  }
  println!();
}

fn display_or_dash(version: &str) -> &str {
  if version.is_empty() { "-" } else { version }
}
