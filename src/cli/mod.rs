//! Command-line interface definitions.

pub mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Mantis-to-GitHub issue migrator.
#[derive(Debug, Parser)]
#[command(name = "m2g", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase log verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write JSON logs to this file.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Migrate a Mantis CSV export to GitHub issues.
    Migrate(MigrateArgs),
    /// Convert BBCode text to GitHub-flavored Markdown.
    Convert(ConvertArgs),
    /// Generate SQL that inserts migration notes back into Mantis.
    Backlink(BacklinkArgs),
}

/// Arguments for the migrate command.
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Path to the Mantis CSV export.
    pub csv: PathBuf,

    /// Destination repository owner.
    #[arg(long, env = "M2G_OWNER")]
    pub owner: Option<String>,

    /// Destination repository name.
    #[arg(long, env = "M2G_REPO")]
    pub repo: Option<String>,

    /// Base URL of the source tracker, for provenance links.
    #[arg(long, env = "M2G_TRACKER_URL", value_name = "URL")]
    pub tracker_url: Option<String>,

    /// Credentials JSON file (defaults to github.json).
    #[arg(long, env = "M2G_CREDENTIALS", value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Settings YAML file (defaults to m2g.yaml).
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Username map YAML file (Mantis handle to GitHub handle).
    #[arg(long, value_name = "PATH")]
    pub user_map: Option<PathBuf>,

    /// Label map YAML file (Mantis project to GitHub label).
    #[arg(long, value_name = "PATH")]
    pub label_map: Option<PathBuf>,

    /// Skip rows until this issue id is seen (resume a partial run).
    #[arg(long, value_name = "ID")]
    pub start_at: Option<u64>,

    /// Append a `mantis_id,github_id` line per migrated issue to this file.
    #[arg(long, value_name = "PATH")]
    pub id_map: Option<PathBuf>,

    /// Render payloads without talking to the network.
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the full issue payloads as JSON.
    #[arg(long, requires = "dry_run")]
    pub json: bool,
}

/// Arguments for the convert command.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input file; reads stdin when omitted.
    pub input: Option<PathBuf>,

    /// Username map YAML file consulted for quote attributions.
    #[arg(long, value_name = "PATH")]
    pub user_map: Option<PathBuf>,

    /// Convert a built-in exercise document instead of reading input.
    #[arg(long, conflicts_with = "input")]
    pub selftest: bool,
}

/// Arguments for the backlink command.
#[derive(Debug, Args)]
pub struct BacklinkArgs {
    /// CSV map of `mantis_id,github_id` pairs written by migrate --id-map.
    pub id_map: PathBuf,

    /// Destination repository owner.
    #[arg(long, env = "M2G_OWNER")]
    pub owner: Option<String>,

    /// Destination repository name.
    #[arg(long, env = "M2G_REPO")]
    pub repo: Option<String>,

    /// Settings YAML file (defaults to m2g.yaml).
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Numeric Mantis user id to attribute the notes to.
    #[arg(long, value_name = "ID")]
    pub reporter_id: u64,

    /// Write the SQL script here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
