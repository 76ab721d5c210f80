use clap::Parser;
use fiken_cli::AppError;
use fiken_cli::cli::dispatcher::{Dispatcher, GlobalOptions};
use fiken_cli::cli::main_types::Cli;
use fiken_cli::storage::config::Config;
use fiken_cli::storage::credentials::{Credentials, open_store};
use fiken_cli::utils::logging::init_logging;
use std::path::PathBuf;

fn report(error: &AppError) {
    eprintln!("{} {}", error.severity().emoji(), error.display_friendly());
    if let Some(hint) = error.troubleshooting_hint() {
        eprintln!("   Try: {}", hint);
    }
}

fn build_dispatcher(cli: &Cli) -> Result<Dispatcher, AppError> {
    let config_dir = Config::config_dir(cli.config_dir.as_ref().map(PathBuf::from).as_deref())?;
    let config = Config::load(Some(Config::config_file_path(Some(&config_dir))?))?;
    let backend = config.effective_keyring_backend(cli.keyring_backend.as_deref())?;

    if cli.verbose {
        eprintln!("Verbose mode is enabled");
        eprintln!("Using config directory: {}", config_dir.display());
        eprintln!("Using secret storage: {}", backend);
        if cli.token.as_ref().is_some_and(|token| !token.is_empty()) {
            eprintln!("Using API token provided via env or command line");
        }
    }

    let credentials = Credentials::new(open_store(backend, &config_dir), config_dir.clone());
    Ok(Dispatcher::new(
        GlobalOptions::from_cli(cli),
        config,
        config_dir,
        backend,
        credentials,
    ))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let dispatcher = match build_dispatcher(&cli) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    };

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        log::debug!("command failed: {:?}", e);
        report(&e);
        std::process::exit(1);
    }
}
