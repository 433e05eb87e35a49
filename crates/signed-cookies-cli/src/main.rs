//! cookie-sig - 签名 Cookie 运维工具
//!
//! ```text
//! cookie-sig --key new --key old sign --name jt --value myCookie
//! cookie-sig --config cookies.toml verify --name jt --cookie-header "jt=myCookie; jt.sig=..."
//! cookie-sig keygen --bytes 32
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Cli;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(cli, &mut out)
}
