use std::path::PathBuf;

use clap::Parser;

/// Muse generation gateway
#[derive(Debug, Parser)]
#[command(name = "muse", about = "Quota-gated gateway for AI text and image generation")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "muse.toml", env = "MUSE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "MUSE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
