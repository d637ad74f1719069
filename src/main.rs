mod commands;
mod core;
mod pom;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use crate::core::config::ReleaserConfig;
use crate::core::error::{ReleaseError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Propagate release train versions through Maven projects
#[derive(Parser)]
#[command(name = "releaser")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Local checkout of the release train (overrides releaser.toml)
  #[arg(long, global = true)]
  train: Option<PathBuf>,

  /// Branch or tag of the release train to read (default: working tree)
  #[arg(long, global = true)]
  branch: Option<String>,

  /// Pin a project version on top of the release train (name=version, repeatable)
  #[arg(long = "fixed", value_name = "NAME=VERSION", global = true)]
  fixed: Vec<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the versions of the release train
  Versions {
    /// Output the versions in JSON format (readable by `update --versions`)
    #[arg(long)]
    json: bool,
  },

  /// Update a project's descriptors to the release train versions
  Update {
    /// Root directory of the project
    project_dir: PathBuf,
    /// Read versions from a JSON export instead of the release train
    #[arg(long)]
    versions: Option<PathBuf>,
    /// Output the update report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Set every module of a project to a new version
  Bump {
    /// Root directory of the project
    project_dir: PathBuf,
    /// Version to set
    #[arg(id = "new_version", value_name = "VERSION")]
    version: String,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let working_dir = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let config = match ReleaserConfig::load_or_default(&working_dir)
    .and_then(|config| config.with_overrides(cli.train, cli.branch, &cli.fixed))
  {
    Ok(config) => config,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Versions { json } => commands::run_versions(&config, json),
    Commands::Update {
      project_dir,
      versions,
      json,
    } => commands::run_update(&config, project_dir, versions, json),
    Commands::Bump { project_dir, version } => commands::run_bump(&config, project_dir, version),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
