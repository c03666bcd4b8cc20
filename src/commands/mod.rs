//! Command modules for the semfora-search CLI
//!
//! ## Architecture
//!
//! Each command module implements one or more top-level commands:
//! - `search` - `symbols` and `text`, fanned out across repositories
//! - `list` - symbols of a single repository revision
//! - `suggest` - ranked symbol suggestions
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for output format, configuration and the
//! cancellation token.

pub mod list;
pub mod search;
pub mod suggest;

pub use list::run_list;
pub use search::{run_symbols, run_text};
pub use suggest::run_suggest;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::catalog::Catalog;
use crate::cli::OutputFormat;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::orchestrator::SearchOrchestrator;

/// Shared context passed to all command handlers
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Output format (text or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
    pub config: SearchConfig,
    /// Cancelled on Ctrl-C
    pub token: CancellationToken,
}

impl Default for CommandContext {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            verbose: false,
            config: SearchConfig::default(),
            token: CancellationToken::new(),
        }
    }
}

impl CommandContext {
    pub fn new(format: OutputFormat, verbose: bool, config: SearchConfig) -> Self {
        Self {
            format,
            verbose,
            config,
            token: CancellationToken::new(),
        }
    }
}

/// What a command prints, plus an error to report after printing it
///
/// Searches can fail in one repository while succeeding in others; the
/// results are still printed and the error decides the exit status.
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub text: String,
    pub error: Option<SearchError>,
}

impl From<String> for CommandOutput {
    fn from(text: String) -> Self {
        Self { text, error: None }
    }
}

/// Load a catalog and wrap it for sharing between collaborator roles
pub fn open_catalog(path: &Path) -> Result<Arc<Catalog>> {
    Ok(Arc::new(Catalog::load(path)?))
}

/// Orchestrator backed entirely by `catalog`
pub fn catalog_orchestrator(catalog: &Arc<Catalog>, config: &SearchConfig) -> SearchOrchestrator {
    SearchOrchestrator::new(catalog.clone(), catalog.clone(), config.clone())
        .with_text_searcher(catalog.clone())
        .with_index(catalog.clone())
}

/// Pretty-print `value` as JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| SearchError::Io {
        message: format!("JSON serialization failed: {}", e),
    })
}
