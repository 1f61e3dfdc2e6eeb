use broom::cli::{AppConfig, Args};
use broom::config::UserConfig;
use broom::logging::init_logger;
use broom::{BroomSession, SystemOpener, TerminalPreviewer};

use std::io;
use tracing::{info, warn};

fn main() {
    init_logger();

    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let config: AppConfig = args.into();

    if let Err(e) = run_app_with_config(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Loads user preferences, writing the defaults on first run
fn load_user_config() -> UserConfig {
    let first_run = UserConfig::config_path().is_some_and(|path| !path.exists());

    let user_config = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load user config: {}", e);
        UserConfig::default()
    });

    if first_run {
        if let Err(e) = user_config.save() {
            warn!(error = %e, "failed to save default user config");
        }
    }

    user_config
}

/// Runs brooming sessions in the configured directory until the operator stops
pub fn run_app_with_config(config: &AppConfig) -> broom::Result<()> {
    let user_config = load_user_config();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = BroomSession::new(
        &config.directory,
        user_config.preview.clone(),
        stdin.lock(),
        stdout.lock(),
        TerminalPreviewer::new(user_config.preview),
        SystemOpener,
    );

    let reports = session.run()?;
    info!(sessions = reports.len(), "done brooming");
    Ok(())
}
