//! Polyglot - English-to-many text translation
//!
//! Entry point for the command line, interactive prompt and HTTP service.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use polyglot::cli::{Args, Commands, ConfigAction};
use polyglot::config::Config;
use polyglot::engine::HttpEngineFactory;
use polyglot::error::PolyglotError;
use polyglot::interactive::Prompt;
use polyglot::server;
use polyglot::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Polyglot");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("polyglot.toml").exists() {
                info!("Found polyglot.toml in current directory, loading...");
                Config::from_file("polyglot.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Configuration commands do not need the language table
    if let Commands::Config { action } = &args.command {
        return run_config_action(action, &config);
    }

    let factory = Arc::new(HttpEngineFactory::new(&config.engine));
    let session = Arc::new(Session::new(&config, factory)?);

    match args.command {
        Commands::Languages => {
            println!("\n{:<30} {:<12}", "Language", "Code");
            println!("{}", "-".repeat(43));
            for (name, code) in session.languages().entries() {
                println!("{:<30} {:<12}", name, code);
            }
        }
        Commands::Translate { text, to, small_model } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")?);
            spinner.set_message("Translating...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let result = session.translate(&text, &to, small_model).await;
            spinner.finish_and_clear();

            match result {
                Ok(outcome) => {
                    println!("\nTranslated text");
                    println!("{}", "-".repeat(15));
                    println!("{}", outcome);
                }
                Err(e @ PolyglotError::UnknownLanguage(_)) => eprintln!("{}", e),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Interactive { to, small_model } => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let mut prompt = Prompt::new(&session, to, small_model);
            prompt.run(stdin.lock(), stdout.lock()).await?;
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            server::run_server(session.clone(), &bind).await?;
        }
        Commands::Config { .. } => unreachable!("handled before session creation"),
    }

    session.shutdown();
    info!("Polyglot finished");
    Ok(())
}

fn run_config_action(action: &ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                return Err(PolyglotError::Config(format!(
                    "{} already exists; use --force to overwrite",
                    path.display()
                ))
                .into());
            }
            Config::default().save_to_file(path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        ConfigAction::Show => {
            let content = toml::to_string_pretty(config)
                .map_err(|e| PolyglotError::Config(format!("Failed to serialize config: {}", e)))?;
            println!("{}", content);
        }
    }
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".polyglot").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "polyglot.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so translations on stdout stay clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("polyglot.log").display());

    Ok(())
}
