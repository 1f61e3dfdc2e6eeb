// CLI module for argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// Broom - sweep through a folder entry by entry
///
/// Every entry is either kept, set aside for deletion, or left where it is.
#[derive(Parser, Debug, Clone)]
#[command(name = "broom")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to broom
    ///
    /// If not specified, defaults to the current directory.
    #[arg(default_value = ".")]
    pub directory: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.directory.exists() {
            return Err(format!(
                "Directory does not exist: {}",
                self.directory.display()
            ));
        }

        if !self.directory.is_dir() {
            return Err(format!(
                "Path is not a directory: {}",
                self.directory.display()
            ));
        }

        Ok(())
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub directory: PathBuf,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            directory: args.directory,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            directory: PathBuf::from("."),
        }
    }
}
