//! Command line surface
//!
//! Argument structs live here rather than in `main.rs` so the mapping from
//! flags to pipeline options can be tested.

pub mod orchestration;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "vtrelease", about = "Vitess release process controller")]
pub struct Cli {
    #[arg(long, env = "REPO_PATH", global = true, help = "Path to the vitessio/vitess repo")]
    pub repo: Option<PathBuf>,

    #[arg(
        long,
        default_value = "info",
        global = true,
        help = "The logging verbosity: error, warn, info, debug or trace"
    )]
    pub log_level: String,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the staging phase of the vitess release
    Stage(StageArgs),

    /// Build command set
    #[command(subcommand)]
    Build(BuildCommand),
}

#[derive(Debug, Clone, Args, PartialEq)]
pub struct StageArgs {
    #[arg(short, long, help = "Branch to cut the release from, eg release-12.0")]
    pub branch: String,

    #[arg(long, help = "Also tag the release commit with this version for godoc/go modules")]
    pub godoc_version: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum BuildCommand {
    /// Build vitess container images
    Image(ImageArgs),
}

#[derive(Debug, Clone, Args, PartialEq)]
pub struct ImageArgs {
    /// Name of the image to build, one at a time
    pub name: String,

    #[arg(long, env = "VT_BASE_VER", help = "Version tag to build")]
    pub version: String,

    #[arg(long, help = "Registry where images are staged")]
    pub staging_registry: Option<String>,

    #[arg(short, long, help = "Release branch the version belongs to, eg release-12.0")]
    pub branch: Option<String>,

    #[arg(long = "distribution", help = "Distribution to build on (repeatable)")]
    pub distributions: Vec<String>,
}
