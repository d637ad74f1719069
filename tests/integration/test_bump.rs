//! Tests for the `bump` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_bump_moves_every_module() -> Result<()> {
  let setup = TestSetup::new()?;

  let output = run_releaser(&setup.path, &["bump", &setup.project_arg(), "1.2.1.BUILD-SNAPSHOT"])?;
  assert!(stdout(&output).contains("Applied 2 changes to 2 of 2 descriptors"));

  let root = setup.read_project_file("pom.xml")?;
  assert!(root.contains("<version>1.2.1.BUILD-SNAPSHOT</version>"));
  // the build parent is not part of the project
  assert!(root.contains("<version>1.3.1.BUILD-SNAPSHOT</version>"));

  let core = setup.read_project_file("spring-cloud-sleuth-core/pom.xml")?;
  assert!(core.contains("<version>1.2.1.BUILD-SNAPSHOT</version>"));

  Ok(())
}

#[test]
fn test_bump_needs_no_release_train() -> Result<()> {
  let setup = TestSetup::new()?;
  std::fs::remove_dir_all(&setup.train)?;

  run_releaser(&setup.path, &["bump", "spring-cloud-sleuth", "1.2.0.RELEASE"])?;
  assert!(
    setup
      .read_project_file("spring-cloud-sleuth-core/pom.xml")?
      .contains("<version>1.2.0.RELEASE</version>")
  );

  Ok(())
}

#[test]
fn test_bump_missing_project_fails() -> Result<()> {
  let setup = TestSetup::new()?;

  let output = run_releaser_unchecked(&setup.path, &["bump", "does-not-exist", "1.0.0"])?;
  assert_eq!(output.status.code(), Some(2));

  Ok(())
}
