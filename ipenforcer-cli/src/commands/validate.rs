//! Command to validate an ipenforcer configuration file.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use ipenforcer::config::{ConfigLoader, ConfigValidator};
use std::path::PathBuf;

/// Validate an ipenforcer configuration file.
#[derive(Args)]
pub struct ValidateCommand {
    /// Configuration file to validate
    #[arg(value_name = "CONFIG_PATH")]
    pub config_path: PathBuf,
}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if !self.config_path.exists() {
            return Err(CliError::InvalidArguments(format!(
                "File not found: {}",
                self.config_path.display()
            )));
        }

        let config = match ConfigLoader::load_file(&self.config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Parse error: {e}");
                return Err(CliError::SemanticFailure(
                    "Configuration file is invalid".to_string(),
                ));
            }
        };

        match ConfigValidator::validate(&config) {
            Ok(()) => {
                if !global.quiet {
                    println!(
                        "Configuration is valid ({} host profile(s))",
                        config.hosts.len()
                    );
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("Validation error: {e}");
                Err(CliError::SemanticFailure(
                    "Configuration validation failed".to_string(),
                ))
            }
        }
    }
}
