//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const TRAIN_ROOT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
	<modelVersion>4.0.0</modelVersion>
	<parent>
		<groupId>org.springframework.cloud</groupId>
		<artifactId>spring-cloud-build</artifactId>
		<version>1.3.1.RELEASE</version>
	</parent>
	<artifactId>spring-cloud-release</artifactId>
	<version>Dalston.RELEASE</version>
	<packaging>pom</packaging>
	<modules>
		<module>spring-cloud-starter-parent</module>
		<module>spring-cloud-dependencies</module>
	</modules>
</project>
"#;

pub const TRAIN_STARTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
	<modelVersion>4.0.0</modelVersion>
	<parent>
		<groupId>org.springframework.boot</groupId>
		<artifactId>spring-boot-starter-parent</artifactId>
		<version>1.5.2.RELEASE</version>
	</parent>
	<artifactId>spring-cloud-starter-parent</artifactId>
	<version>Dalston.RELEASE</version>
</project>
"#;

pub const PROJECT_ROOT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
	<modelVersion>4.0.0</modelVersion>
	<artifactId>spring-cloud-sleuth</artifactId>
	<version>1.2.0.BUILD-SNAPSHOT</version>
	<packaging>pom</packaging>
	<parent>
		<groupId>org.springframework.cloud</groupId>
		<artifactId>spring-cloud-build</artifactId>
		<version>1.3.1.BUILD-SNAPSHOT</version>
		<relativePath/>
	</parent>
	<modules>
		<module>spring-cloud-sleuth-core</module>
	</modules>
	<properties>
		<spring-cloud-commons.version>1.2.0.BUILD-SNAPSHOT</spring-cloud-commons.version>
		<checkstyle.version>7.1</checkstyle.version>
	</properties>
</project>
"#;

pub const PROJECT_CORE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
	<modelVersion>4.0.0</modelVersion>
	<artifactId>spring-cloud-sleuth-core</artifactId>
	<parent>
		<groupId>org.springframework.cloud</groupId>
		<artifactId>spring-cloud-sleuth</artifactId>
		<version>1.2.0.BUILD-SNAPSHOT</version>
		<relativePath>..</relativePath>
	</parent>
</project>
"#;

/// Dependencies descriptor of the train pinning sleuth and commons
pub fn train_dependencies(sleuth: &str, commons: &str) -> String {
  format!(
    r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
	<modelVersion>4.0.0</modelVersion>
	<parent>
		<artifactId>spring-cloud-dependencies-parent</artifactId>
		<groupId>org.springframework.cloud</groupId>
		<version>1.3.1.RELEASE</version>
		<relativePath/>
	</parent>
	<artifactId>spring-cloud-dependencies</artifactId>
	<version>Dalston.RELEASE</version>
	<properties>
		<spring-cloud-sleuth.version>{sleuth}</spring-cloud-sleuth.version>
		<spring-cloud-commons.version>{commons}</spring-cloud-commons.version>
	</properties>
</project>
"#
  )
}

/// A release train checkout next to a project to update
pub struct TestSetup {
  _root: TempDir,
  pub path: PathBuf,
  pub train: PathBuf,
  pub project: PathBuf,
}

impl TestSetup {
  /// Create a Dalston-like release train and a sleuth project on snapshots
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    let train = path.join("spring-cloud-release");
    let project = path.join("spring-cloud-sleuth");

    write(&train, "pom.xml", TRAIN_ROOT)?;
    write(&train, "spring-cloud-starter-parent/pom.xml", TRAIN_STARTER)?;
    write(
      &train,
      "spring-cloud-dependencies/pom.xml",
      &train_dependencies("1.2.0.RELEASE", "1.2.0.RELEASE"),
    )?;

    write(&project, "pom.xml", PROJECT_ROOT)?;
    write(&project, "spring-cloud-sleuth-core/pom.xml", PROJECT_CORE)?;

    Ok(Self {
      _root: root,
      path,
      train,
      project,
    })
  }

  /// Put the train under git on `main` and add `branch` with older versions
  pub fn with_train_branch(self, branch: &str, sleuth: &str, commons: &str) -> Result<Self> {
    git(&self.train, &["init", "--initial-branch=main"])?;
    git(&self.train, &["config", "user.name", "Test User"])?;
    git(&self.train, &["config", "user.email", "test@example.com"])?;
    git(&self.train, &["add", "."])?;
    git(&self.train, &["commit", "-m", "Dalston release train"])?;

    git(&self.train, &["checkout", "-b", branch])?;
    write(
      &self.train,
      "spring-cloud-dependencies/pom.xml",
      &train_dependencies(sleuth, commons),
    )?;
    git(&self.train, &["commit", "-am", "Older release train"])?;
    git(&self.train, &["checkout", "main"])?;

    Ok(self)
  }

  /// Read a project file
  pub fn read_project_file(&self, relative: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.project.join(relative))?)
  }

  /// Write a project file
  pub fn write_project_file(&self, relative: &str, content: &str) -> Result<()> {
    write(&self.project, relative, content)
  }

  pub fn train_arg(&self) -> String {
    self.train.to_string_lossy().into_owned()
  }

  pub fn project_arg(&self) -> String {
    self.project.to_string_lossy().into_owned()
  }
}

/// Write a file, creating parent directories
pub fn write(root: &Path, relative: &str, content: &str) -> Result<()> {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run releaser and return its output whatever the exit status
pub fn run_releaser_unchecked(cwd: &Path, args: &[&str]) -> Result<Output> {
  let releaser_bin = env!("CARGO_BIN_EXE_releaser");

  Command::new(releaser_bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run releaser")
}

/// Run releaser, failing on a non-zero exit status
pub fn run_releaser(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_releaser_unchecked(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "releaser command failed: releaser {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
