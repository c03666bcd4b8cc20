//! semfora-search CLI entry point
//!
//! # Usage
//!
//! ```bash
//! semfora-search symbols Widget --catalog repos.toml --limit 20
//! semfora-search --format json text "TODO" --catalog repos.toml --repo github.com/acme/app@v2
//! semfora-search list --catalog repos.toml --repo github.com/acme/app --query '^New'
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use semfora_search::commands::{run_list, run_suggest, run_symbols, run_text, CommandContext};
use semfora_search::{Cli, Commands, SearchConfig};

const DEFAULT_CONFIG_FILE: &str = "semfora-search.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_logging(&config, cli.verbose) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(2);
    }

    let ctx = CommandContext::new(cli.format, cli.verbose, config);

    // Ctrl-C cancels in-flight searches; whatever was collected is still printed
    let token = ctx.token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling search");
            token.cancel();
        }
    });

    let result = match &cli.command {
        Commands::Symbols(args) => run_symbols(args, &ctx).await,
        Commands::Text(args) => run_text(args, &ctx).await,
        Commands::List(args) => run_list(args, &ctx).await,
        Commands::Suggest(args) => run_suggest(args, &ctx).await,
    };

    match result {
        Ok(output) => {
            print!("{}", output.text);
            match output.error {
                Some(e) => {
                    eprintln!("Error: {}", e);
                    e.exit_code()
                }
                None => ExitCode::SUCCESS,
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// Load the explicit config file, or the default one from the working directory
fn load_config(path: Option<PathBuf>) -> anyhow::Result<SearchConfig> {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if explicit && !path.exists() {
        anyhow::bail!("config file not found: {}", path.display());
    }
    let config = SearchConfig::load_from(&path)?;
    Ok(config)
}

/// Log to stderr so stdout stays machine-readable
fn init_logging(config: &SearchConfig, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("semfora_search={}", level).parse()?),
        )
        .init();
    Ok(())
}
