//! Propagating release train versions through a project's descriptors
//!
//! # Invariants
//!
//! 1. Only tracked artifacts and `<tracked>.version` properties are rewritten
//! 2. Descriptors without edits are never written, so they stay byte-identical
//! 3. Running the pass twice with the same versions changes nothing the second time
//! 4. Updating to a release train leaves no snapshot version behind, or fails

use crate::core::config::ReleaserConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::pom::descriptor::{POM_FILE_NAME, PomDescriptor, VersionChange, VersionElement};
use crate::pom::release_train::ReleaseTrainReader;
use crate::pom::versions::Versions;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never searched for descriptors
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// Changes made to one descriptor
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorUpdate {
  pub path: PathBuf,
  pub changes: Vec<VersionChange>,
}

/// Outcome of an update pass
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
  pub root: PathBuf,
  /// Number of descriptors visited
  pub descriptors: usize,
  /// Descriptors that were rewritten
  pub updated: Vec<DescriptorUpdate>,
  /// Whether the snapshot check ran (release trains only)
  pub validated: bool,
}

impl UpdateReport {
  pub fn changes(&self) -> usize {
    self.updated.iter().map(|u| u.changes.len()).sum()
  }
}

/// Updates a project's descriptors from a release train
pub struct ProjectPomUpdater {
  config: ReleaserConfig,
}

impl ProjectPomUpdater {
  pub fn new(config: ReleaserConfig) -> Self {
    Self { config }
  }

  /// Read the release train and pin the configured fixed versions on top
  pub fn retrieve_versions_from_release_train(&self) -> ReleaseResult<Versions> {
    let source = self.config.source()?;
    let mut versions = ReleaseTrainReader::read(&source)?;

    for (name, version) in &self.config.fixed_versions {
      tracing::info!("Fixing version of {} to {}", name, version);
      versions.set_version(name, version.clone());
    }

    tracing::debug!("Retrieved versions:\n{}", versions);
    Ok(versions)
  }

  /// Update every descriptor under `root` and check no snapshot is left
  pub fn update_project_from_release_train(&self, root: &Path, versions: &Versions) -> ReleaseResult<UpdateReport> {
    let descriptors = find_descriptors(root)?;
    self.update_descriptors(root, &descriptors, versions, |_| {})
  }

  /// Update the given descriptors, calling `on_descriptor` after each one
  pub fn update_descriptors(
    &self,
    root: &Path,
    descriptors: &[PathBuf],
    versions: &Versions,
    mut on_descriptor: impl FnMut(&Path),
  ) -> ReleaseResult<UpdateReport> {
    tracing::info!("Updating {} descriptors under {}", descriptors.len(), root.display());

    let mut updated = Vec::new();
    for path in descriptors {
      if let Some(update) = update_descriptor(path, versions)? {
        updated.push(update);
      }
      on_descriptor(path);
    }

    let validated = !versions.is_snapshot();
    if validated {
      check_no_snapshots(root, descriptors)?;
    } else {
      tracing::info!("Release train contains snapshot versions, skipping the snapshot check");
    }

    Ok(UpdateReport {
      root: root.to_path_buf(),
      descriptors: descriptors.len(),
      updated,
      validated,
    })
  }

  /// Set the version of every module of the project
  ///
  /// Declared module versions and parent references to modules of the same
  /// tree move to `version`. No snapshot check is made, bumping to the next
  /// snapshot is the usual case.
  pub fn bump_versions(&self, root: &Path, version: &str) -> ReleaseResult<UpdateReport> {
    let root_path = root.join(POM_FILE_NAME);
    let poms = find_descriptors(root)?
      .iter()
      .map(|path| PomDescriptor::read(path))
      .collect::<ReleaseResult<Vec<_>>>()?;

    match poms.iter().find(|pom| pom.path() == root_path) {
      Some(root_pom) if root_pom.artifact_id().is_some() => {}
      Some(_) => {
        return Err(ReleaseError::descriptor(&root_path, "root descriptor declares no <artifactId>"));
      }
      None => return Err(ReleaseError::descriptor(&root_path, "root descriptor not found")),
    }

    let mut versions = Versions::default();
    for artifact_id in poms.iter().filter_map(PomDescriptor::artifact_id) {
      versions.set_version(artifact_id, version);
    }
    tracing::info!("Bumping {} modules to {}", versions.projects().count(), version);

    let descriptors = poms.len();
    let mut updated = Vec::new();
    for pom in poms {
      if let Some(update) = write_updated(pom, &versions)? {
        updated.push(update);
      }
    }

    Ok(UpdateReport {
      root: root.to_path_buf(),
      descriptors,
      updated,
      validated: false,
    })
  }
}

/// All descriptors under `root`, depth-first in file name order
pub fn find_descriptors(root: &Path) -> ReleaseResult<Vec<PathBuf>> {
  if !root.is_dir() {
    return Err(ReleaseError::descriptor(root, "project directory does not exist"));
  }

  let mut descriptors = Vec::new();
  let walker = WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
  for entry in walker {
    let entry = entry?;
    if entry.file_type().is_file() && entry.file_name() == POM_FILE_NAME {
      descriptors.push(entry.into_path());
    }
  }

  if descriptors.is_empty() {
    return Err(ReleaseError::with_help(
      format!("No {} found under {}", POM_FILE_NAME, root.display()),
      "Point releaser at the root directory of a Maven project.",
    ));
  }
  Ok(descriptors)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
  if !entry.file_type().is_dir() {
    return false;
  }
  let name = entry.file_name().to_string_lossy();
  name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Apply the versions to one descriptor and write it if anything changed
fn update_descriptor(path: &Path, versions: &Versions) -> ReleaseResult<Option<DescriptorUpdate>> {
  write_updated(PomDescriptor::read(path)?, versions)
}

fn write_updated(mut pom: PomDescriptor, versions: &Versions) -> ReleaseResult<Option<DescriptorUpdate>> {
  let path = pom.path().to_path_buf();
  let changes = apply_versions(&mut pom, versions);

  if changes.is_empty() {
    tracing::debug!("{}: nothing to update", path.display());
    return Ok(None);
  }

  for change in &changes {
    tracing::debug!("{}: {} (was {})", path.display(), change.element, change.from);
  }
  pom.write()?;
  Ok(Some(DescriptorUpdate { path, changes }))
}

/// Rewrite project version, parent version and version properties
fn apply_versions(pom: &mut PomDescriptor, versions: &Versions) -> Vec<VersionChange> {
  let mut changes = Vec::new();

  let own = pom
    .artifact_id()
    .filter(|id| versions.should_be_updated(id))
    .map(|id| versions.version_for_project(id));
  if let Some(version) = own.filter(|v| !v.is_empty()) {
    changes.extend(pom.set(&VersionElement::Version, version));
  }

  let parent = pom
    .parent_artifact_id()
    .filter(|id| versions.should_be_updated(id))
    .map(|id| versions.version_for_project(id));
  if let Some(version) = parent.filter(|v| !v.is_empty()) {
    changes.extend(pom.set(&VersionElement::ParentVersion, version));
  }

  let properties = pom.properties();
  if versions.should_set_property(&properties) {
    for key in properties.keys() {
      if let Some(version) = versions.version_for_property(key).filter(|v| !v.is_empty()) {
        changes.extend(pom.set(&VersionElement::Property(key.clone()), version));
      }
    }
  }

  changes
}

/// Re-read every descriptor from disk and fail on leftover snapshots
fn check_no_snapshots(root: &Path, descriptors: &[PathBuf]) -> ReleaseResult<()> {
  let mut offenders = Vec::new();
  for path in descriptors {
    let pom = PomDescriptor::read(path)?;
    let relative = path.strip_prefix(root).unwrap_or(path);
    for element in pom.snapshot_elements() {
      offenders.push(format!("{}: {}", relative.display(), element));
    }
  }

  if offenders.is_empty() {
    return Ok(());
  }
  Err(ReleaseError::UnresolvedVersionAfterUpdate { offenders })
}
