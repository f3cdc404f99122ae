//! TCP/IPv6 Client Test - Main CLI Application
//!
//! Connects to a test server over IPv6, sends a fixed number of payloads
//! and reports each socket lifecycle event as a pass/fail assertion.

use clap::Parser;
use tcp6_client_test::{
    app::App,
    cli::Cli,
    error::{AppError, Result},
};
use std::{process, error::Error};

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(AppError::internal("panic").exit_code());
    }));

    // Parse command line arguments
    let cli = Cli::parse();
    let use_color = cli.use_colors();

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        // Print suggestions for common errors
        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    cli.validate().map_err(AppError::validation)?;

    App::new(cli)?.run().await
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file and TCP6_* variables");
            eprintln!("  - Hosts must be IPv6 addresses, e.g. 2001:db8::2");
            eprintln!("  - Delays are seconds and may be fractional");
        }
        AppError::Network(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check that the host has IPv6 enabled");
            eprintln!("  - Run with --show-setup for routing instructions");
        }
        AppError::TestExecution(_) => {
            eprintln!();
            eprintln!("Execution troubleshooting:");
            eprintln!("  - Make sure the server is listening on the remote address");
            eprintln!("  - Increase --deadline on slow links");
            eprintln!("  - Run with --verbose to see socket events");
        }
        _ => {}
    }
}
