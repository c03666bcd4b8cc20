//! Symbol listing for a single repository commit

use std::time::Duration;

use serde::Serialize;

use crate::backend::{PatternInfo, SymbolLister, SymbolQuery};
use crate::error::{ErrorKind, Result, SearchError};
use crate::pagination::{Page, PaginationWindow};
use crate::repo::{CommitId, RepositoryRef};
use crate::symbol::Symbol;

/// Message returned when symbol extraction outlives its time budget
pub const SLOW_SYMBOLS_MESSAGE: &str =
    "processing symbols is taking longer than expected. Try again in a while";

/// A page of symbols from one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolConnection {
    #[serde(flatten)]
    page: Page<Symbol>,
}

impl SymbolConnection {
    fn new(symbols: Vec<Symbol>, window: PaginationWindow) -> Self {
        Self {
            page: window.paginate(symbols),
        }
    }

    pub fn nodes(&self) -> &[Symbol] {
        &self.page.items
    }

    pub fn has_next_page(&self) -> bool {
        self.page.has_next_page
    }

    pub fn into_page(self) -> Page<Symbol> {
        self.page
    }
}

/// List the symbols of `repo` at `commit`
///
/// `query` is a literal, case-insensitive substring of symbol names (everything
/// matches when it is absent). One symbol more than the page size is requested
/// so the connection can tell whether a further page exists.
pub async fn compute_symbols(
    lister: &dyn SymbolLister,
    repo: &RepositoryRef,
    commit: &CommitId,
    query: Option<&str>,
    first: Option<i32>,
    include_patterns: &[String],
    timeout: Duration,
) -> Result<SymbolConnection> {
    let window = PaginationWindow::new(first);

    let mut pattern = PatternInfo::new(query.unwrap_or_default());
    pattern.include_patterns = include_patterns.to_vec();

    let request = SymbolQuery {
        repo: repo.clone(),
        commit: commit.clone(),
        pattern,
        first: window.request_size(),
    };

    let raw = match tokio::time::timeout(timeout, lister.list_symbols(&request)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) if e.kind() == ErrorKind::Timeout => {
            tracing::warn!("Symbol listing for {}@{} timed out: {}", repo, commit, e);
            return Err(slow_symbols());
        }
        Ok(Err(e)) => return Err(e),
        Err(_) => {
            tracing::warn!(
                "Symbol listing for {}@{} exceeded {}ms",
                repo,
                commit,
                timeout.as_millis()
            );
            return Err(slow_symbols());
        }
    };

    let symbols = raw
        .into_iter()
        .map(|s| Symbol::from_raw(s, repo, commit))
        .collect();
    Ok(SymbolConnection::new(symbols, window))
}

fn slow_symbols() -> SearchError {
    SearchError::Timeout {
        message: SLOW_SYMBOLS_MESSAGE.to_string(),
    }
}
