use crate::core::config::ReleaserConfig;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::pom::updater::{ProjectPomUpdater, UpdateReport, find_descriptors};
use crate::pom::versions::{Projects, Versions};
use crate::ui::progress::DescriptorProgress;
use std::fs;
use std::path::{Path, PathBuf};

/// Run the update command
pub fn run_update(
  config: &ReleaserConfig,
  project_dir: PathBuf,
  versions_file: Option<PathBuf>,
  json: bool,
) -> ReleaseResult<()> {
  let updater = ProjectPomUpdater::new(config.clone());
  let versions = match versions_file {
    Some(path) => load_versions(&path)?,
    None => updater.retrieve_versions_from_release_train()?,
  };

  let descriptors = find_descriptors(&project_dir)?;
  let report = if json {
    updater.update_descriptors(&project_dir, &descriptors, &versions, |_| {})?
  } else {
    println!("🔄 Updating {} descriptors under {}", descriptors.len(), project_dir.display());
    let mut progress = DescriptorProgress::new(descriptors.len(), "Updating descriptors");
    updater.update_descriptors(&project_dir, &descriptors, &versions, |_| progress.inc())?
  };

  if json {
    println!(
      "{}",
      serde_json::to_string_pretty(&report).map_err(|e| ReleaseError::message(format!("Serialization error: {}", e)))?
    );
  } else {
    print_report(&report);
  }

  Ok(())
}

/// Read a registry exported with `releaser versions --json`
fn load_versions(path: &Path) -> ReleaseResult<Versions> {
  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read versions from {}", path.display()))?;
  let projects: Projects =
    serde_json::from_str(&content).with_context(|| format!("Failed to parse versions from {}", path.display()))?;
  tracing::debug!("Loaded {} versions from {}", projects.0.len(), path.display());
  Versions::from_project_versions(projects)
}

pub(crate) fn print_report(report: &UpdateReport) {
  println!();
  if report.updated.is_empty() {
    println!("✅ All {} descriptors already up to date", report.descriptors);
  } else {
    for update in &report.updated {
      let shown = update.path.strip_prefix(&report.root).unwrap_or(&update.path);
      println!("📝 {}", shown.display());
      for change in &update.changes {
        println!("   {}  (was {})", change.element, change.from);
      }
    }
    println!();
    println!(
      "✅ Applied {} changes to {} of {} descriptors",
      report.changes(),
      report.updated.len(),
      report.descriptors
    );
  }

  if report.validated {
    println!("🔒 No snapshot versions left");
  }
}
