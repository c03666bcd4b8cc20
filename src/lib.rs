//! semfora-search: multi-repository symbol and text search
//!
//! This library fans a single search out across many repositories at once,
//! with a bounded number of repositories in flight, and folds every
//! repository's results and status into one mergeable [`ResultAggregate`].
//!
//! # Repository status
//!
//! Each repository ends a search in exactly one state: searched, cloning,
//! missing, timed out, or silently skipped (an empty repository, or a search
//! that was cancelled once enough results were collected). Unexpected
//! failures are returned next to the results rather than instead of them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use semfora_search::{Catalog, PatternInfo, SearchConfig, SearchOrchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! let catalog = Arc::new(Catalog::load("catalog.toml".as_ref())?);
//! let orchestrator = SearchOrchestrator::new(catalog.clone(), catalog.clone(), SearchConfig::default())
//!     .with_index(catalog.clone());
//!
//! let repos = catalog.select(&[])?;
//! let outcome = orchestrator
//!     .search_symbols(&CancellationToken::new(), &repos, &PatternInfo::new("Widget"), 50)
//!     .await;
//! println!("{} files, limit hit: {}", outcome.results.len(), outcome.aggregate.limit_hit());
//! ```

pub mod aggregate;
pub mod backend;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod compute;
pub mod config;
pub mod error;
pub mod fanout;
pub mod grouper;
pub mod invoker;
pub mod orchestrator;
pub mod pagination;
pub mod partial;
pub mod repo;
pub mod suggestion;
pub mod symbol;

// Re-export commonly used types
pub use aggregate::ResultAggregate;
pub use backend::{
    IndexStatus, PatternInfo, RevisionResolver, SymbolLister, SymbolQuery, TextQuery,
    TextSearchResults, TextSearcher,
};
pub use catalog::{Catalog, CatalogFile, CatalogRepo, CatalogSymbol, RepoState};
pub use cli::{Cli, Commands, OutputFormat};
pub use compute::{compute_symbols, SymbolConnection};
pub use config::SearchConfig;
pub use error::{ErrorKind, Result, SearchError};
pub use fanout::{BoundedFanOut, ErrorReporter, Slot};
pub use grouper::{FileMatch, LineMatch, RawFileMatch};
pub use invoker::{RepoMatches, RepoOutcome, RepoSearch, SymbolRepoSearch, TextRepoSearch};
pub use orchestrator::{SearchOrchestrator, SearchOutcome};
pub use pagination::{Page, PaginationWindow};
pub use partial::PartialResults;
pub use repo::{CommitId, RepoId, RepoRevisionSet, RepositoryRef, RepositoryRevisions, RevisionSpec};
pub use suggestion::{symbol_suggestions, SearchSuggestion};
pub use symbol::{Position, Range, RawSymbol, Symbol, SymbolKind};
