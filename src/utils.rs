//! Path helpers for release train locators

use std::path::Path;

/// Does the locator name a remote repository rather than a local checkout?
///
/// Remote forms: `scheme://...`, scp-like `user@host:path`, and `file://`
/// URLs are treated as remote too, since they are not plain paths.
pub fn is_remote_locator(locator: &str) -> bool {
  if locator.contains("://") {
    return true;
  }

  // Windows drive letters (C:\ or C:/) contain ':' but are local
  let bytes = locator.as_bytes();
  if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/')
  {
    return false;
  }

  // scp-like syntax: git@github.com:spring-cloud/spring-cloud-release.git
  match (locator.find('@'), locator.find(':')) {
    (Some(at), Some(colon)) => at < colon && !locator[..at].contains('/'),
    _ => false,
  }
}

/// Convert a path to the form git expects in `<rev>:<path>` specs
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
