//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Live test harness for command modules
#[derive(Parser, Debug)]
#[command(
    name = "livetest",
    version = env!("CARGO_PKG_VERSION"),
    about = "JSON-RPC live test server for command modules",
    long_about = "Serves operations of a command module over a Content-Length framed \
                  JSON-RPC stream on stdio, so a test client can drive them live.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Operation manifests, overriding `[server]` in settings.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ManifestArgs {
    /// Operation manifest introspected from the module
    #[arg(short, long, value_name = "PATH")]
    pub module: Option<PathBuf>,

    /// Operation manifest declared by the service specification
    #[arg(short, long, value_name = "PATH")]
    pub specification: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .livetest directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Serve JSON-RPC requests on stdin/stdout
    #[command(about = "Start the live test server on stdio")]
    Serve {
        #[command(flatten)]
        manifests: ManifestArgs,
    },

    /// Load the manifests and list the merged operations
    #[command(about = "Validate manifests and show operations")]
    Check {
        #[command(flatten)]
        manifests: ManifestArgs,
    },

    /// Show current configuration
    #[command(about = "Display active settings")]
    Config,
}
