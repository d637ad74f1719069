//! Tests for the `update` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_update_from_release_train() -> Result<()> {
  let setup = TestSetup::new()?;
  let core_before = setup.read_project_file("spring-cloud-sleuth-core/pom.xml")?;

  let output = run_releaser(
    &setup.path,
    &["--train", &setup.train_arg(), "update", &setup.project_arg()],
  )?;
  let out = stdout(&output);
  assert!(out.contains("Applied 4 changes to 2 of 2 descriptors"), "{}", out);
  assert!(out.contains("No snapshot versions left"), "{}", out);

  let root = setup.read_project_file("pom.xml")?;
  assert!(root.contains("<version>1.2.0.RELEASE</version>"));
  assert!(root.contains("<version>1.3.1.RELEASE</version>"));
  assert!(root.contains("<spring-cloud-commons.version>1.2.0.RELEASE</spring-cloud-commons.version>"));
  assert!(root.contains("<checkstyle.version>7.1</checkstyle.version>"));
  assert!(!root.contains("BUILD-SNAPSHOT"));

  let core = setup.read_project_file("spring-cloud-sleuth-core/pom.xml")?;
  assert_eq!(core, core_before.replace("1.2.0.BUILD-SNAPSHOT", "1.2.0.RELEASE"));

  Ok(())
}

#[test]
fn test_update_twice_reports_nothing_to_do() -> Result<()> {
  let setup = TestSetup::new()?;
  let train = setup.train_arg();
  let project = setup.project_arg();
  let args = ["--train", train.as_str(), "update", project.as_str()];

  run_releaser(&setup.path, &args)?;
  let root = setup.read_project_file("pom.xml")?;

  let output = run_releaser(&setup.path, &args)?;
  assert!(stdout(&output).contains("already up to date"));
  assert_eq!(setup.read_project_file("pom.xml")?, root);

  Ok(())
}

#[test]
fn test_leftover_snapshot_fails_with_validation_exit_code() -> Result<()> {
  let setup = TestSetup::new()?;
  setup.write_project_file(
    "pom.xml",
    &PROJECT_ROOT.replace(
      "<checkstyle.version>7.1</checkstyle.version>",
      "<spring-cloud-unmatched.version>1.0.0.BUILD-SNAPSHOT</spring-cloud-unmatched.version>",
    ),
  )?;

  let output = run_releaser_unchecked(
    &setup.path,
    &["--train", &setup.train_arg(), "update", &setup.project_arg()],
  )?;

  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(
    err.contains("<spring-cloud-unmatched.version>1.0.0.BUILD-SNAPSHOT</spring-cloud-unmatched.version>"),
    "{}",
    err
  );
  assert!(err.contains("Help:"));

  Ok(())
}

#[test]
fn test_fixed_version_from_config_file() -> Result<()> {
  let setup = TestSetup::new()?;
  write(
    &setup.path,
    "releaser.toml",
    r#"[release_train]
path = "spring-cloud-release"

[fixed_versions]
checkstyle = "100.0.0.RELEASE"
"#,
  )?;

  run_releaser(&setup.path, &["update", "spring-cloud-sleuth"])?;

  let root = setup.read_project_file("pom.xml")?;
  assert!(root.contains("<checkstyle.version>100.0.0.RELEASE</checkstyle.version>"));
  assert!(root.contains("<spring-cloud-commons.version>1.2.0.RELEASE</spring-cloud-commons.version>"));

  Ok(())
}

#[test]
fn test_fixed_version_flag_overrides_config_file() -> Result<()> {
  let setup = TestSetup::new()?;
  write(
    &setup.path,
    ".releaser.toml",
    r#"[release_train]
path = "spring-cloud-release"

[fixed_versions]
spring-cloud-commons = "1.2.1.RELEASE"
"#,
  )?;

  run_releaser(
    &setup.path,
    &["--fixed", "spring-cloud-commons=1.2.2.RELEASE", "update", "spring-cloud-sleuth"],
  )?;

  let root = setup.read_project_file("pom.xml")?;
  assert!(root.contains("<spring-cloud-commons.version>1.2.2.RELEASE</spring-cloud-commons.version>"));

  Ok(())
}

#[test]
fn test_update_from_train_branch() -> Result<()> {
  let setup = TestSetup::new()?.with_train_branch("vCamden.SR4", "1.1.3.RELEASE", "1.1.9.RELEASE")?;

  run_releaser(
    &setup.path,
    &[
      "--train",
      &setup.train_arg(),
      "--branch",
      "vCamden.SR4",
      "update",
      &setup.project_arg(),
    ],
  )?;

  let root = setup.read_project_file("pom.xml")?;
  assert!(root.contains("<version>1.1.3.RELEASE</version>"));
  assert!(root.contains("<spring-cloud-commons.version>1.1.9.RELEASE</spring-cloud-commons.version>"));

  // the train's working tree stays on main
  let dependencies = std::fs::read_to_string(setup.train.join("spring-cloud-dependencies/pom.xml"))?;
  assert!(dependencies.contains("1.2.0.RELEASE"));

  Ok(())
}

#[test]
fn test_unknown_train_branch_is_reported() -> Result<()> {
  let setup = TestSetup::new()?.with_train_branch("vCamden.SR4", "1.1.3.RELEASE", "1.1.9.RELEASE")?;
  let before = setup.read_project_file("pom.xml")?;

  let output = run_releaser_unchecked(
    &setup.path,
    &["--train", &setup.train_arg(), "--branch", "vNope", "update", &setup.project_arg()],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("No such branch [vNope]"));
  assert_eq!(setup.read_project_file("pom.xml")?, before);

  Ok(())
}

#[test]
fn test_update_without_train_fails() -> Result<()> {
  let setup = TestSetup::new()?;

  let output = run_releaser_unchecked(&setup.path, &["update", &setup.project_arg()])?;

  assert_eq!(output.status.code(), Some(1));
  assert_eq!(setup.read_project_file("pom.xml")?, PROJECT_ROOT);

  Ok(())
}

#[test]
fn test_update_json_report() -> Result<()> {
  let setup = TestSetup::new()?;

  let output = run_releaser(
    &setup.path,
    &["--train", &setup.train_arg(), "update", &setup.project_arg(), "--json"],
  )?;

  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(report["descriptors"], 2);
  assert_eq!(report["validated"], true);
  let updated = report["updated"].as_array().expect("updated descriptors");
  assert_eq!(updated.len(), 2);
  assert!(
    updated[0]["changes"]
      .as_array()
      .expect("changes")
      .iter()
      .any(|c| c["to"] == "1.3.1.RELEASE")
  );

  Ok(())
}
