use anyhow::Result;
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

use mdreader::command_processor::CommandProcessor;
use mdreader::config::Config;
use mdreader::preferences::PreferenceStore;
use mdreader::shell::{console_collaborators, run_shell, spawn_stdin_reader, PathAnswers};
use mdreader::workspace::Workspace;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger with debug fallback for development
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("mdreader", LevelFilter::Debug);
    }
    logger.init();

    let config = match Config::load().await {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    };

    let prefs = match PreferenceStore::default_path() {
        Ok(path) => PreferenceStore::load(path).await,
        Err(e) => {
            log::warn!("Preferences will not be persisted: {}", e);
            PreferenceStore::in_memory()
        }
    };

    let input = spawn_stdin_reader();
    let answers = Arc::new(PathAnswers::new());
    let io = console_collaborators(answers.clone(), input.clone());
    let mut workspace = Workspace::new(&config, prefs, io);
    let processor = CommandProcessor::new(answers);

    workspace.on_editor_ready();
    log::info!("Workspace initialized");

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if args.is_empty() {
        log::info!("No file specified, starting with no tabs");
    }
    for path in &args {
        if workspace.open_path(path).await.is_none() {
            log::error!("Failed to load file '{}'", path.display());
        }
    }

    if let Err(err) = run_shell(&mut workspace, &processor, input).await {
        eprintln!("Error while running: {}", err);
        log::error!("Application error: {}", err);
    }

    log::info!("Application loop ended successfully");
    Ok(())
}
