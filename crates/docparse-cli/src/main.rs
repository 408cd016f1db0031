use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docparse_config::ParserConfig;
use docparse_core::{CapabilityRegistry, Dispatcher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod errors;

#[derive(Parser)]
#[command(name = "docparse", version, about = "docparse - normalized content from document files")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one or more files and print their content
    Parse {
        /// Files to parse, in order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print each result as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Show which optional extraction backends are available
    Backends,
    /// Show effective configuration
    Config,
}

fn find_config() -> Option<PathBuf> {
    // 1. DOCPARSE_CONFIG environment variable
    if let Ok(path) = std::env::var("DOCPARSE_CONFIG") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. docparse.yaml in current directory
    let cwd_config = PathBuf::from("docparse.yaml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. ~/.config/docparse/config.yaml
    if let Some(home) = dirs_next::home_dir() {
        let home_config = home.join(".config/docparse/config.yaml");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

fn load_config(explicit: Option<PathBuf>) -> Result<ParserConfig, Box<dyn std::error::Error>> {
    match explicit.or_else(find_config) {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            let config = ParserConfig::from_file(&path)?;
            config.validate_or_err()?;
            Ok(config)
        }
        None => Ok(ParserConfig::default()),
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config)?;

    let registry = CapabilityRegistry::initialize(&config.backends);
    for backend in registry.missing() {
        tracing::warn!(
            "{} backend is not available; {} files cannot be parsed",
            backend,
            backend.description()
        );
    }

    match cli.command {
        Commands::Parse { paths, json } => {
            let dispatcher = Dispatcher::new(&config)?;
            commands::parse::run(&dispatcher, &paths, json)?;
        }
        Commands::Backends => {
            commands::backends::run(registry)?;
        }
        Commands::Config => {
            commands::config::run(&config)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = err.exit_code().clamp(0, 255) as u8;
            return ExitCode::from(code);
        }
    };

    init_logging();

    if let Err(e) = run(cli) {
        errors::print_error(e.as_ref());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
