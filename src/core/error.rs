//! Error types for releaser with contextual messages and exit codes
//!
//! Every error that reaches the user names the project, property, branch or
//! path at fault and, where one exists, carries a suggestion for fixing it.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for releaser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing release train)
  User = 1,
  /// System error (git, I/O, unreadable descriptors)
  System = 2,
  /// Validation failure (snapshot versions left after an update)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for releaser
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// The release train could not be located or read
  SourceNotFound(SourceError),

  /// A flat version import lacks the platform or shared-build project
  MissingDistinguishedVersion { project: String },

  /// Descriptors still carry snapshot versions after the update pass
  UnresolvedVersionAfterUpdate { offenders: Vec<String> },

  /// A descriptor could not be parsed or persisted
  Descriptor { path: PathBuf, reason: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Create a descriptor read/write failure for `path`
  pub fn descriptor(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
    ReleaseError::Descriptor {
      path: path.into(),
      reason: reason.to_string(),
    }
  }

  /// Add context to an existing error
  ///
  /// Config, source, version and validation errors already name what failed
  /// and keep their own message so their help text and exit code survive.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: ctx_str,
        context: Some(err.to_string()),
        help: None,
      },
      ReleaseError::Descriptor { path, reason } => ReleaseError::Descriptor {
        path,
        reason: format!("{}: {}", ctx_str, reason),
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::SourceNotFound(_) => ExitCode::User,
      ReleaseError::MissingDistinguishedVersion { .. } => ExitCode::User,
      ReleaseError::UnresolvedVersionAfterUpdate { .. } => ExitCode::Validation,
      ReleaseError::Descriptor { .. } => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::SourceNotFound(e) => e.help_message(),
      ReleaseError::MissingDistinguishedVersion { project } => Some(format!(
        "The imported versions must declare '{}'. Re-export them with `releaser versions --json`.",
        project
      )),
      ReleaseError::UnresolvedVersionAfterUpdate { .. } => Some(
        "Add the project to the release train, pin it with `--fixed name=version`, or fix the descriptor by hand."
          .to_string(),
      ),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::SourceNotFound(e) => write!(f, "{}", e),
      ReleaseError::MissingDistinguishedVersion { project } => {
        write!(f, "Version of '{}' is missing from the imported versions", project)
      }
      ReleaseError::UnresolvedVersionAfterUpdate { offenders } => {
        write!(
          f,
          "Snapshot versions remain after updating to a release version:\n  {}",
          offenders.join("\n  ")
        )
      }
      ReleaseError::Descriptor { path, reason } => {
        write!(f, "Failed to process descriptor {}: {}", path.display(), reason)
      }
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<walkdir::Error> for ReleaseError {
  fn from(err: walkdir::Error) -> Self {
    ReleaseError::message(format!("Directory traversal error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Neither releaser.toml nor --train were given
  NotFound { workspace_root: PathBuf },

  /// Missing or blank required field
  MissingField { field: String },

  /// A `--fixed` argument that is not `name=version`
  InvalidFixedVersion { raw: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some(
        "Pass `--train <path>` or create releaser.toml with a [release_train] section.".to_string(),
      ),
      ConfigError::InvalidFixedVersion { .. } => {
        Some("Fixed versions are written as `name=version`, e.g. `checkstyle=100.0.0.RELEASE`.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No releaser configuration found.\nExpected file: {}/releaser.toml",
          workspace_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::InvalidFixedVersion { raw } => {
        write!(f, "Invalid fixed version '{}'", raw)
      }
    }
  }
}

/// Release train lookup errors
#[derive(Debug)]
pub enum SourceError {
  /// The release train directory does not exist
  DirectoryNotFound { path: PathBuf },

  /// The path looks like a remote URL
  RemoteNotSupported { url: String },

  /// The branch or tag does not exist in the release train repository
  BranchNotFound { path: PathBuf, branch: String },

  /// The release train has no descriptor at the expected location
  DescriptorNotFound { path: PathBuf },
}

impl SourceError {
  fn help_message(&self) -> Option<String> {
    match self {
      SourceError::RemoteNotSupported { url } => Some(format!(
        "Clone the release train first (`git clone {}`) and pass the local checkout.",
        url
      )),
      SourceError::BranchNotFound { path, .. } => Some(format!(
        "List the available branches with `git -C {} branch -a`.",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for SourceError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SourceError::DirectoryNotFound { path } => {
        write!(f, "Release train not found at: {}", path.display())
      }
      SourceError::RemoteNotSupported { url } => {
        write!(f, "Release train must be a local checkout, got: {}", url)
      }
      SourceError::BranchNotFound { path, branch } => {
        write!(f, "No such branch [{}] in release train at {}", branch, path.display())
      }
      SourceError::DescriptorNotFound { path } => {
        write!(f, "Release train descriptor not found: {}", path.display())
      }
    }
  }
}

/// Result type alias for releaser
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
