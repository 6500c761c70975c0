//! bunstore - storage zone client
//!
//! A command-line interface for BunnyCDN-style HTTP storage zones.

use bunstore_cli::commands::{self, Cli};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --debug wins over RUST_LOG; logs go to stderr so stdout stays clean for `cat`.
    let filter = if cli.debug {
        EnvFilter::new("bunstore_cli=debug,bunstore_core=debug,bunstore_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
