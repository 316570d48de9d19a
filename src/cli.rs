//! Server command-line interface.

use clap::Parser;
use std::path::PathBuf;

/// Real-time No-Limit Hold'em coordinator.
#[derive(Parser, Debug, Clone)]
#[command(name = "holdem-coordinator", version, about = "Multi-table NLHE session coordinator")]
pub struct ServerCli {
    /// Path to config file.
    #[arg(long, default_value = "holdem-coordinator.toml")]
    pub config: PathBuf,

    /// Override the bind address from the config file.
    #[arg(long)]
    pub bind_addr: Option<String>,

    /// Persist CLI overrides back to the config file.
    #[arg(long, default_value_t = false)]
    pub persist: bool,

    /// Enable verbose debug logging.
    #[arg(long, short, default_value_t = false)]
    pub debug: bool,
}
