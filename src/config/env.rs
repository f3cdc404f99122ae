//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// `TCP6_*` variables: name, description, example value
const SUPPORTED_VARS: &[(&str, &str, &str)] = &[
    ("TCP6_REMOTE_HOST", "Server IPv6 address", "2001:db8::2"),
    ("TCP6_REMOTE_PORT", "Server TCP port", "9876"),
    ("TCP6_LOCAL_HOST", "Local IPv6 address to bind", "2001:db8::1"),
    ("TCP6_LOCAL_PORT", "Local TCP port to bind (0 lets the stack choose)", "8484"),
    ("TCP6_BOARD", "Board name; frdm_k64f connects without waiting for the network", "frdm_k64f"),
    ("TCP6_STARTUP_DELAY", "Seconds before the first connect", "30"),
    ("TCP6_TICK_PERIOD", "Seconds between payloads", "3"),
    ("TCP6_RETRY_DELAY", "Seconds before reconnecting after NotFoundError", "5"),
    ("TCP6_SEND_COUNT", "Hello payloads before close", "7"),
    ("TCP6_NETWORK_POLL", "Seconds between checks for the local address", "1"),
    ("TCP6_DEADLINE", "Overall deadline in seconds", "600"),
    ("ENABLE_COLOR", "Enable colored output (true/false)", "true"),
];

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; process variables win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Supported environment variables with descriptions and example values
    pub fn get_supported_env_vars() -> &'static [(&'static str, &'static str, &'static str)] {
        SUPPORTED_VARS
    }

    /// Commented-out `.env` template listing every supported variable
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# TCP/IPv6 Client Test Configuration\n\
             #\n\
             # Uncomment to override defaults; command-line arguments win over these.\n",
        );

        for (name, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("\n# {}\n# {}={}\n", description, name, example));
        }

        content
    }

    /// Write the `.env` template, refusing to clobber an existing file
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(AppError::config(format!("{} already exists", path.display())));
        }

        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::io(format!("Failed to write {}: {}", path.display(), e)))
    }
}
