use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::pom::release_train::ReleaseTrainSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for releaser
/// Searched in order: releaser.toml, .releaser.toml, .config/releaser.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaserConfig {
  #[serde(default)]
  pub release_train: ReleaseTrainConfig,

  /// Versions pinned on top of the release train (`name = "version"`)
  #[serde(default)]
  pub fixed_versions: BTreeMap<String, String>,

  /// Directory relative paths are resolved against
  #[serde(skip)]
  pub base_dir: PathBuf,
}

/// Where to read the release train from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseTrainConfig {
  /// Local checkout of the release train project
  #[serde(default)]
  pub path: Option<PathBuf>,

  /// Branch or tag to read the descriptors at (default: working tree)
  #[serde(default)]
  pub branch: Option<String>,
}

impl ReleaserConfig {
  /// Find config file in search order: releaser.toml, .releaser.toml, .config/releaser.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("releaser.toml"),
      path.join(".releaser.toml"),
      path.join(".config").join("releaser.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from releaser.toml (searches multiple locations)
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ReleaseError::Config(ConfigError::NotFound {
        workspace_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let mut config: ReleaserConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;
    config.base_dir = path.to_path_buf();

    tracing::debug!("Loaded configuration from {}", config_path.display());
    Ok(config)
  }

  /// Load config if one exists, otherwise start from an empty one
  pub fn load_or_default(path: &Path) -> ReleaseResult<Self> {
    if Self::find_config_path(path).is_some() {
      return Self::load(path);
    }
    Ok(Self {
      base_dir: path.to_path_buf(),
      ..Default::default()
    })
  }

  /// Apply command line overrides on top of the file
  pub fn with_overrides(mut self, train: Option<PathBuf>, branch: Option<String>, fixed: &[String]) -> ReleaseResult<Self> {
    if let Some(train) = train {
      self.release_train.path = Some(train);
    }
    if let Some(branch) = branch {
      self.release_train.branch = Some(branch);
    }
    for raw in fixed {
      let (name, version) = parse_fixed_version(raw)?;
      self.fixed_versions.insert(name, version);
    }
    Ok(self)
  }

  /// Validate configuration
  pub fn validate(&self) -> ReleaseResult<()> {
    if let Some(branch) = &self.release_train.branch
      && branch.trim().is_empty()
    {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "release_train.branch".to_string(),
      }));
    }

    for (name, version) in &self.fixed_versions {
      if name.trim().is_empty() || version.trim().is_empty() {
        return Err(ReleaseError::Config(ConfigError::InvalidFixedVersion {
          raw: format!("{}={}", name, version),
        }));
      }
    }

    Ok(())
  }

  /// Release train source this configuration points at
  pub fn source(&self) -> ReleaseResult<ReleaseTrainSource> {
    self.validate()?;

    let path = match &self.release_train.path {
      Some(path) if !path.as_os_str().is_empty() => path,
      Some(_) => {
        return Err(ReleaseError::Config(ConfigError::MissingField {
          field: "release_train.path".to_string(),
        }));
      }
      None => {
        return Err(ReleaseError::Config(ConfigError::NotFound {
          workspace_root: self.base_dir.clone(),
        }));
      }
    };

    Ok(ReleaseTrainSource {
      path: self.base_dir.join(path),
      branch: self.release_train.branch.clone(),
    })
  }
}

/// Split a `name=version` pin
pub fn parse_fixed_version(raw: &str) -> ReleaseResult<(String, String)> {
  match raw.split_once('=') {
    Some((name, version)) if !name.trim().is_empty() && !version.trim().is_empty() => {
      Ok((name.trim().to_string(), version.trim().to_string()))
    }
    _ => Err(ReleaseError::Config(ConfigError::InvalidFixedVersion { raw: raw.to_string() })),
  }
}
