//! Version registry built from a release train
//!
//! Tracks one version per project name, plus the platform (Spring Boot) and
//! shared-build (Spring Cloud Build) versions. Each of those two is mirrored
//! under two artifact ids, because descriptors refer to the same logical
//! version by either name.

use crate::core::error::{ReleaseError, ReleaseResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Platform project name
pub const BOOT_PROJECT_NAME: &str = "spring-boot";
/// Platform starter parent, always carries the platform version
pub const BOOT_STARTER_ARTIFACT_ID: &str = "spring-boot-starter-parent";
/// Shared build parent project
pub const BUILD_ARTIFACT_ID: &str = "spring-cloud-build";
/// Dependencies bom parent, always carries the shared-build version
pub const CLOUD_DEPENDENCIES_ARTIFACT_ID: &str = "spring-cloud-dependencies-parent";

/// Marker of an unreleased version
pub const SNAPSHOT_SUFFIX: &str = "BUILD-SNAPSHOT";
/// Suffix of a module's parent descriptor artifact id
pub const PARENT_SUFFIX: &str = "-parent";
/// Suffix of a version property key (`<project>.version`)
pub const VERSION_PROPERTY_SUFFIX: &str = ".version";

/// A project name pinned to a version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectVersion {
  #[serde(rename = "projectName")]
  pub name: String,
  pub version: String,
}

impl ProjectVersion {
  pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      version: version.into(),
    }
  }

  pub fn is_snapshot(&self) -> bool {
    is_snapshot(&self.version)
  }
}

impl fmt::Display for ProjectVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "name=[{}], version=[{}]", self.name, self.version)
  }
}

/// Flat, serializable projection of a registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projects(pub BTreeSet<ProjectVersion>);

impl Projects {
  pub fn new(projects: impl IntoIterator<Item = ProjectVersion>) -> Self {
    Self(projects.into_iter().collect())
  }

  /// Version of the project named exactly `name`
  pub fn find(&self, name: &str) -> Option<&ProjectVersion> {
    self.0.iter().find(|p| p.name == name)
  }

}

/// True if `version` denotes an unreleased build
pub fn is_snapshot(version: &str) -> bool {
  version.ends_with(SNAPSHOT_SUFFIX)
}

/// Does a queried artifact id refer to the tracked project `name`?
///
/// Either the names are equal, or the query is the project's parent
/// descriptor, i.e. `name` followed by `-parent`.
pub fn name_matches(query: &str, name: &str) -> bool {
  if query == name {
    return true;
  }
  query.strip_suffix(PARENT_SUFFIX).is_some_and(|base| base == name)
}

/// Which version slot a project name writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectKind {
  Boot,
  Build,
  Other,
}

impl ProjectKind {
  fn of(name: &str) -> Self {
    match name {
      BOOT_PROJECT_NAME | BOOT_STARTER_ARTIFACT_ID => ProjectKind::Boot,
      BUILD_ARTIFACT_ID | CLOUD_DEPENDENCIES_ARTIFACT_ID => ProjectKind::Build,
      _ => ProjectKind::Other,
    }
  }
}

/// Versions taken out of a release train
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Versions {
  pub boot_version: String,
  pub build_version: String,
  projects: BTreeSet<ProjectVersion>,
}

impl Versions {
  /// Registry holding only the platform version
  pub fn with_boot(boot_version: impl Into<String>) -> Self {
    let mut versions = Self::default();
    versions.set_version(BOOT_PROJECT_NAME, boot_version);
    versions
  }

  /// Registry holding the shared-build version and the given projects
  pub fn with_build(build_version: impl Into<String>, projects: impl IntoIterator<Item = ProjectVersion>) -> Self {
    let mut versions = Self::default();
    versions.set_version(BUILD_ARTIFACT_ID, build_version);
    versions.projects.extend(projects);
    versions
  }

  /// Registry holding both distinguished versions and the given projects
  pub fn with_boot_and_build(
    boot_version: impl Into<String>,
    build_version: impl Into<String>,
    projects: impl IntoIterator<Item = ProjectVersion>,
  ) -> Self {
    let mut versions = Self::with_build(build_version, projects);
    let boot_version = boot_version.into();
    versions.boot_version = boot_version.clone();
    versions.projects.insert(ProjectVersion::new(BOOT_PROJECT_NAME, boot_version.clone()));
    versions.projects.insert(ProjectVersion::new(BOOT_STARTER_ARTIFACT_ID, boot_version));
    versions
  }

  /// Registry read back from a flat export
  ///
  /// The export must declare both `spring-boot` and `spring-cloud-build`.
  pub fn from_project_versions(projects: Projects) -> ReleaseResult<Self> {
    let boot_version = projects
      .find(BOOT_PROJECT_NAME)
      .ok_or_else(|| ReleaseError::MissingDistinguishedVersion {
        project: BOOT_PROJECT_NAME.to_string(),
      })?
      .version
      .clone();
    let build_version = projects
      .find(BUILD_ARTIFACT_ID)
      .ok_or_else(|| ReleaseError::MissingDistinguishedVersion {
        project: BUILD_ARTIFACT_ID.to_string(),
      })?
      .version
      .clone();

    Ok(Self {
      boot_version,
      build_version,
      projects: projects.0,
    })
  }

  /// Best matching entry for an artifact id; exact names win over the
  /// `-parent` convention
  fn find_project(&self, name: &str) -> Option<&ProjectVersion> {
    self
      .projects
      .iter()
      .find(|p| p.name == name)
      .or_else(|| self.projects.iter().find(|p| name_matches(name, &p.name)))
  }

  /// Version for the artifact id, or an empty string when untracked
  pub fn version_for_project(&self, name: &str) -> &str {
    self.find_project(name).map(|p| p.version.as_str()).unwrap_or("")
  }

  /// Is the artifact id tracked by this registry?
  pub fn should_be_updated(&self, name: &str) -> bool {
    self.projects.iter().any(|p| name_matches(name, &p.name))
  }

  /// Does the property map declare a version property of any tracked project?
  pub fn should_set_property(&self, properties: &IndexMap<String, String>) -> bool {
    self
      .projects
      .iter()
      .any(|p| properties.contains_key(&version_property(&p.name)))
  }

  /// Version a `<name>.version` property should hold, if it is tracked
  pub fn version_for_property(&self, property: &str) -> Option<&str> {
    let name = property.strip_suffix(VERSION_PROPERTY_SUFFIX)?;
    self
      .projects
      .iter()
      .find(|p| p.name == name)
      .map(|p| p.version.as_str())
  }

  /// Overwrite the version of `name`, keeping aliases in step
  pub fn set_version(&mut self, name: &str, version: impl Into<String>) -> &mut Self {
    let version = version.into();
    match ProjectKind::of(name) {
      ProjectKind::Boot => {
        self.boot_version = version.clone();
        self.replace(&[BOOT_PROJECT_NAME, BOOT_STARTER_ARTIFACT_ID], &version);
      }
      ProjectKind::Build => {
        self.build_version = version.clone();
        self.replace(&[BUILD_ARTIFACT_ID, CLOUD_DEPENDENCIES_ARTIFACT_ID], &version);
      }
      ProjectKind::Other => self.replace(&[name], &version),
    }
    self
  }

  fn replace(&mut self, names: &[&str], version: &str) {
    self.projects.retain(|p| !names.contains(&p.name.as_str()));
    for name in names {
      self.projects.insert(ProjectVersion::new(*name, version));
    }
  }

  /// Does any tracked project still point at a snapshot?
  pub fn is_snapshot(&self) -> bool {
    self.projects.iter().any(ProjectVersion::is_snapshot)
  }

  pub fn to_project_versions(&self) -> Projects {
    Projects(self.projects.clone())
  }

  pub fn projects(&self) -> impl Iterator<Item = &ProjectVersion> {
    self.projects.iter()
  }
}

impl fmt::Display for Versions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Spring Boot Version=[{}]", self.boot_version)?;
    writeln!(f, "Spring Cloud Build Version=[{}]", self.build_version)?;
    write!(f, "Projects=")?;
    for project in &self.projects {
      write!(f, "\n\t{}", project)?;
    }
    Ok(())
  }
}

/// Property key holding the version of `project`
pub fn version_property(project: &str) -> String {
  format!("{}{}", project, VERSION_PROPERTY_SUFFIX)
}
