//! Reading versions out of a release train checkout
//!
//! A release train project is laid out like `spring-cloud-release`:
//!
//! ```text
//! pom.xml                                parent: spring-cloud-build  -> build version
//! spring-cloud-starter-parent/pom.xml    parent: spring-boot-starter-parent -> boot version
//! spring-cloud-dependencies/pom.xml      <spring-cloud-sleuth.version>... -> projects
//! ```
//!
//! With a branch configured, descriptors are read from that ref through git
//! and the working tree is never checked out.

use crate::core::error::{ReleaseError, ReleaseResult, SourceError};
use crate::core::vcs::SystemGit;
use crate::pom::descriptor::{POM_FILE_NAME, PomDescriptor};
use crate::pom::versions::{
  BOOT_PROJECT_NAME, BOOT_STARTER_ARTIFACT_ID, BUILD_ARTIFACT_ID, CLOUD_DEPENDENCIES_ARTIFACT_ID, ProjectVersion,
  VERSION_PROPERTY_SUFFIX, Versions, version_property,
};
use crate::utils::is_remote_locator;
use std::path::{Path, PathBuf};

/// Module whose parent pins the platform version
pub const STARTER_PARENT_MODULE: &str = "spring-cloud-starter-parent";
/// Module whose properties pin every project of the train
pub const DEPENDENCIES_MODULE: &str = "spring-cloud-dependencies";

/// Locator of a release train
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTrainSource {
  /// Local checkout of the release train project
  pub path: PathBuf,
  /// Branch or tag to read at; the working tree when `None`
  pub branch: Option<String>,
}

/// Where descriptors are loaded from
enum Descriptors {
  WorkingTree { root: PathBuf },
  Revision { root: PathBuf, git: SystemGit, commit: String },
}

impl Descriptors {
  fn open(source: &ReleaseTrainSource) -> ReleaseResult<Self> {
    let locator = source.path.to_string_lossy();
    if is_remote_locator(&locator) {
      return Err(ReleaseError::SourceNotFound(SourceError::RemoteNotSupported {
        url: locator.into_owned(),
      }));
    }
    if !source.path.is_dir() {
      return Err(ReleaseError::SourceNotFound(SourceError::DirectoryNotFound {
        path: source.path.clone(),
      }));
    }

    let Some(branch) = &source.branch else {
      return Ok(Descriptors::WorkingTree {
        root: source.path.clone(),
      });
    };

    let branch_not_found = || {
      ReleaseError::SourceNotFound(SourceError::BranchNotFound {
        path: source.path.clone(),
        branch: branch.clone(),
      })
    };
    let git = SystemGit::open(&source.path)?.ok_or_else(branch_not_found)?;
    let commit = git.resolve_ref(branch)?.ok_or_else(branch_not_found)?;
    tracing::debug!("Release train branch {} resolved to {}", branch, commit);

    Ok(Descriptors::Revision {
      root: source.path.clone(),
      git,
      commit,
    })
  }

  /// Load a descriptor relative to the train root, `None` if absent
  fn load(&self, relative: &Path) -> ReleaseResult<Option<PomDescriptor>> {
    match self {
      Descriptors::WorkingTree { root } => {
        let path = root.join(relative);
        if !path.is_file() {
          return Ok(None);
        }
        PomDescriptor::read(&path).map(Some)
      }
      Descriptors::Revision { root, git, commit } => match git.read_file_at(commit, relative)? {
        Some(content) => PomDescriptor::parse(&root.join(relative), content).map(Some),
        None => Ok(None),
      },
    }
  }
}

/// Reads release train descriptors into a version registry
pub struct ReleaseTrainReader;

impl ReleaseTrainReader {
  pub fn read(source: &ReleaseTrainSource) -> ReleaseResult<Versions> {
    let descriptors = Descriptors::open(source)?;

    let root_path = Path::new(POM_FILE_NAME);
    let root = descriptors.load(root_path)?.ok_or_else(|| {
      ReleaseError::SourceNotFound(SourceError::DescriptorNotFound {
        path: source.path.join(root_path),
      })
    })?;
    let starter = descriptors.load(&Path::new(STARTER_PARENT_MODULE).join(POM_FILE_NAME))?;
    let dependencies = descriptors.load(&Path::new(DEPENDENCIES_MODULE).join(POM_FILE_NAME))?;

    let build_version = parent_version_of(&root, BUILD_ARTIFACT_ID)
      .or_else(|| property_of([Some(&root), dependencies.as_ref()], BUILD_ARTIFACT_ID))
      .ok_or_else(|| ReleaseError::MissingDistinguishedVersion {
        project: BUILD_ARTIFACT_ID.to_string(),
      })?;
    let boot_version = starter
      .as_ref()
      .and_then(|starter| parent_version_of(starter, BOOT_STARTER_ARTIFACT_ID))
      .or_else(|| property_of([dependencies.as_ref(), Some(&root)], BOOT_PROJECT_NAME));

    let projects = tracked_projects(dependencies.as_ref().unwrap_or(&root));
    tracing::info!(
      "Read release train {} (build {}, boot {}, {} projects)",
      root.version().unwrap_or("?"),
      build_version,
      boot_version.as_deref().unwrap_or("-"),
      projects.len()
    );

    Ok(match boot_version {
      Some(boot_version) => Versions::with_boot_and_build(boot_version, build_version, projects),
      None => Versions::with_build(build_version, projects),
    })
  }
}

fn parent_version_of(pom: &PomDescriptor, parent: &str) -> Option<String> {
  if pom.parent_artifact_id() != Some(parent) {
    return None;
  }
  pom.parent_version().filter(|v| !v.is_empty()).map(str::to_string)
}

fn property_of<'a>(poms: impl IntoIterator<Item = Option<&'a PomDescriptor>>, project: &str) -> Option<String> {
  let key = version_property(project);
  poms
    .into_iter()
    .flatten()
    .find_map(|pom| pom.property(&key).filter(|v| is_literal(v)).map(str::to_string))
}

/// Every `<project>.version` property, minus the distinguished projects
fn tracked_projects(pom: &PomDescriptor) -> Vec<ProjectVersion> {
  pom
    .properties()
    .into_iter()
    .filter_map(|(key, version)| {
      let name = key.strip_suffix(VERSION_PROPERTY_SUFFIX)?.to_string();
      let distinguished = matches!(
        name.as_str(),
        BOOT_PROJECT_NAME | BOOT_STARTER_ARTIFACT_ID | BUILD_ARTIFACT_ID | CLOUD_DEPENDENCIES_ARTIFACT_ID
      );
      (!distinguished && is_literal(&version)).then(|| ProjectVersion::new(name, version))
    })
    .collect()
}

/// Unset values and `${...}` references are not versions
fn is_literal(value: &str) -> bool {
  !value.is_empty() && !value.contains("${")
}
