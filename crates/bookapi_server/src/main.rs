//! `bookapi` executable entry point.

use bookapi_server::{run, ServerConfig};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();
    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Logging may not be up yet, so report on stderr as well.
            log::error!("event=server_exit module=server status=error error={err}");
            eprintln!("bookapi: {err}");
            ExitCode::FAILURE
        }
    }
}
