//! Main application orchestration and execution

use crate::{
    assertion::{AssertionReport, ConsoleAssertionSink},
    cli::Cli,
    config::{load_config, validate_config, display_config_summary, EnvManager},
    driver::ConnectionTestDriver,
    error::{AppError, Result},
    logging::LoggerFactory,
    models::Config,
    platform::{setup_instructions, StaticBoard},
    socket::{event_channel, TcpSocketService},
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        if let Some(path) = &self.cli.create_env {
            EnvManager::save_example_env_file(path)?;
            println!("Wrote example configuration to {}", path.display());
            return Ok(());
        }

        let config = load_config(self.cli.clone())?;

        if self.cli.show_setup {
            println!("{}", setup_instructions(config.options.remote_host));
            return Ok(());
        }

        let warnings = validate_config(&config)?;

        if config.debug {
            eprintln!("{} v{} ({})", crate::PKG_NAME, crate::VERSION, crate::GIT_COMMIT);
            eprintln!("\nConfiguration Summary:");
            eprintln!("{}", display_config_summary(&config));
        }

        if !warnings.is_empty() && (config.verbose || config.debug) {
            eprintln!("\nConfiguration Warnings:");
            for warning in &warnings {
                eprintln!("  {}", warning.format(config.enable_color));
            }
        }

        let report = run_driver(&config).await?;

        if config.json_output {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        if !report.completed() {
            return Err(AppError::test_execution("Test finished without a result"));
        }
        if report.failed > 0 {
            return Err(AppError::test_execution(format!(
                "{} of {} assertions failed",
                report.failed,
                report.total()
            )));
        }

        Ok(())
    }
}

/// Wire the real socket, board and console sink into a driver and run it
pub async fn run_driver(config: &Config) -> Result<AssertionReport> {
    let loggers = LoggerFactory::new(config.clone());

    let (events_tx, events_rx) = event_channel();
    let socket = TcpSocketService::new(
        events_tx,
        config.timing.network_poll,
        loggers.create_logger("SOCKET").await,
    );

    let sink = if config.json_output {
        ConsoleAssertionSink::new(false).to_stderr()
    } else {
        ConsoleAssertionSink::new(config.enable_color)
    };

    let board = StaticBoard::new(config.board.clone());
    let driver = ConnectionTestDriver::new(config, &board, socket, events_rx, sink)
        .with_logger(loggers.create_logger("DRIVER").await);

    tokio::spawn(driver.run())
        .await
        .map_err(|e| AppError::internal(format!("Driver task failed: {}", e)))
}
