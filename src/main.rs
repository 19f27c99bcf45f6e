use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;

use worklog::cli::{self, Cli, Commands};
use worklog::logging::init_logging;
use worklog::store::{DocumentStore, FirestoreStore, LocalStore, StoreError};
use worklog::summary::{GeminiModel, SummaryGenerator};
use worklog::sync::SyncHandle;
use worklog::{utils, Backend, Board, Config, Profile};

fn open_store(config: &Config) -> Result<Box<dyn DocumentStore>, StoreError> {
    match config.backend {
        Backend::Firestore => Ok(Box::new(FirestoreStore::new(&config.firestore)?)),
        Backend::Local => {
            let path = config.get_database_path();
            let path = path
                .to_str()
                .ok_or_else(|| StoreError::Config("database path contains invalid UTF-8".to_string()))?;
            Ok(Box::new(LocalStore::open(path)?))
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(&utils::expand_path(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    let log_dir = utils::get_data_dir(profile)
        .map(|dir| dir.join("logs"))
        .ok_or_else(|| eyre!("Could not determine data directory"))?;
    let _logger = init_logging(&config.log_level, &log_dir)?;

    let generator = SummaryGenerator::new(Box::new(GeminiModel::from_config(&config.gemini)));
    let store = open_store(&config);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let store = match store {
                Ok(store) => store,
                Err(e) => {
                    log::error!("event=store_open status=error backend={:?} error={}", config.backend, e);
                    worklog::tui::run_startup_error(&e.to_string())?;
                    return Ok(());
                }
            };
            let sync = SyncHandle::spawn(store, generator)?;
            let board = Board::new(sync, utils::today());
            let app = worklog::tui::App::new(config, board)?;
            worklog::tui::run_event_loop(app)?;
        }
        Commands::Add { title, date, status, notes, links } => {
            cli::handle_add(&title, date.as_deref(), &status, notes, &links, &*store?)?;
        }
        Commands::List { date } => {
            cli::handle_list(date.as_deref(), &*store?)?;
        }
        Commands::Status { id, status } => {
            cli::handle_status(&id, &status, &*store?)?;
        }
        Commands::Delete { id, yes } => {
            let mut input = std::io::stdin().lock();
            cli::handle_delete(&id, yes, &mut input, &*store?)?;
        }
        Commands::Report { date, regenerate } => {
            cli::handle_report(date.as_deref(), regenerate, &*store?, &generator)?;
        }
    }

    Ok(())
}
