//! Multi-repository search orchestration
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       SearchOrchestrator                         │
//! │                                                                  │
//! │  RepoRevisionSet ──► BoundedFanOut (ceiling, child token)        │
//! │                        │  one task per repository entry          │
//! │                        ▼                                         │
//! │                  invoke(RepoSearch) ──► RepoOutcome              │
//! │                        │                                         │
//! │                        ▼                                         │
//! │      Mutex<Collected { results, ResultAggregate }>               │
//! │        record_outcome + append + limit check (one section)       │
//! │                        │  count > limit ──► cancel_all()         │
//! │                        ▼                                         │
//! │                  SearchOutcome { results, aggregate, error }     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Partial failure
//!
//! Per-repository failures are absorbed into the aggregate. Only the first
//! fatal error is returned, and it comes back next to whatever results the
//! other repositories produced.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::aggregate::ResultAggregate;
use crate::backend::{IndexStatus, PatternInfo, RevisionResolver, SymbolLister, TextSearcher};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::fanout::BoundedFanOut;
use crate::grouper::FileMatch;
use crate::invoker::{invoke, record_outcome, RepoSearch, SymbolRepoSearch, TextRepoSearch};
use crate::repo::{RepoId, RepoRevisionSet};

/// Results of one orchestrated search
///
/// `error` may be set while `results` is non-empty; callers should present
/// both rather than discarding the results.
#[derive(Debug, Default, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<FileMatch>,
    pub aggregate: ResultAggregate,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<SearchError>,
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<SearchError>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}

impl SearchOutcome {
    /// Outcome carrying only an error
    pub fn failed(error: SearchError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Everything mutated by completing repository searches
#[derive(Default)]
struct Collected {
    results: Vec<FileMatch>,
    aggregate: ResultAggregate,
}

/// Fans a search out over many repositories
pub struct SearchOrchestrator {
    resolver: Arc<dyn RevisionResolver>,
    symbols: Arc<dyn SymbolLister>,
    text: Option<Arc<dyn TextSearcher>>,
    index: Option<Arc<dyn IndexStatus>>,
    config: SearchConfig,
}

impl SearchOrchestrator {
    pub fn new(
        resolver: Arc<dyn RevisionResolver>,
        symbols: Arc<dyn SymbolLister>,
        config: SearchConfig,
    ) -> Self {
        Self {
            resolver,
            symbols,
            text: None,
            index: None,
            config,
        }
    }

    /// Enable text search
    pub fn with_text_searcher(mut self, text: Arc<dyn TextSearcher>) -> Self {
        self.text = Some(text);
        self
    }

    /// Consult an index backend to report which repositories were indexed
    pub fn with_index(mut self, index: Arc<dyn IndexStatus>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn resolver(&self) -> Arc<dyn RevisionResolver> {
        Arc::clone(&self.resolver)
    }

    pub fn symbol_lister(&self) -> Arc<dyn SymbolLister> {
        Arc::clone(&self.symbols)
    }

    /// Search `repos` in parallel for symbols matching `pattern`
    ///
    /// An empty pattern is a no-op, not an error. At most `limit` file matches
    /// are returned.
    pub async fn search_symbols(
        &self,
        token: &CancellationToken,
        repos: &RepoRevisionSet,
        pattern: &PatternInfo,
        limit: usize,
    ) -> SearchOutcome {
        if pattern.is_empty() {
            return SearchOutcome::default();
        }
        let search = Arc::new(SymbolRepoSearch::new(
            Arc::clone(&self.resolver),
            Arc::clone(&self.symbols),
            pattern.clone(),
            limit,
        ));
        self.fan_out(search, token, repos, pattern, limit).await
    }

    /// Search `repos` in parallel for file contents matching `pattern`
    pub async fn search_text(
        &self,
        token: &CancellationToken,
        repos: &RepoRevisionSet,
        pattern: &PatternInfo,
        limit: usize,
    ) -> SearchOutcome {
        if pattern.is_empty() {
            return SearchOutcome::default();
        }
        let Some(text) = &self.text else {
            return SearchOutcome::failed(SearchError::Backend {
                message: "no text searcher configured".to_string(),
            });
        };
        let search = Arc::new(TextRepoSearch::new(
            Arc::clone(&self.resolver),
            Arc::clone(text),
            pattern.clone(),
            limit,
        ));
        self.fan_out(search, token, repos, pattern, limit).await
    }

    async fn fan_out(
        &self,
        search: Arc<dyn RepoSearch>,
        token: &CancellationToken,
        repos: &RepoRevisionSet,
        pattern: &PatternInfo,
        limit: usize,
    ) -> SearchOutcome {
        tracing::info!(
            "Starting {} search for {:?} over {} repositories (ceiling {}, limit {})",
            search.name(),
            pattern.pattern,
            repos.len(),
            self.config.concurrency_ceiling,
            limit
        );

        let max_results = i32::try_from(limit).unwrap_or(i32::MAX);
        let mut aggregate = ResultAggregate::with_max_results(max_results);
        aggregate.add_repos(&repos.repositories());
        let indexed = Arc::new(self.probe_index(repos, &mut aggregate).await);

        let shared = Arc::new(Mutex::new(Collected {
            results: Vec::new(),
            aggregate,
        }));
        let mut run = BoundedFanOut::new(self.config.concurrency_ceiling, token);
        let timeout = self.config.per_repo_timeout;

        for repo_revs in repos {
            if run.is_cancelled() {
                tracing::debug!("Search cancelled, not dispatching remaining repositories");
                break;
            }
            if repo_revs.rev_specs().is_empty() {
                continue;
            }

            let slot = run.acquire().await;
            let repo_revs = repo_revs.clone();
            let search = Arc::clone(&search);
            let shared = Arc::clone(&shared);
            let indexed = Arc::clone(&indexed);
            let reporter = run.reporter();
            let task_token = run.token();

            run.spawn(slot, async move {
                let (matches, outcome) =
                    invoke(search.as_ref(), &repo_revs, &task_token, timeout).await;
                let outcome_name = outcome.as_str();
                let is_indexed = indexed.contains(&repo_revs.repo.id);

                let mut collected = shared.lock();
                let surfaced = record_outcome(
                    &mut collected.aggregate,
                    &repo_revs,
                    outcome,
                    matches.limit_hit,
                    is_indexed,
                );
                if let Some(err) = surfaced {
                    tracing::warn!("Search failed in {}: {}", repo_revs.repo, err);
                    reporter.report(err);
                }
                if !matches.file_matches.is_empty() {
                    collected.aggregate.add_results(matches.file_matches.len());
                    collected.results.extend(matches.file_matches);
                    if collected.results.len() > limit && !task_token.is_cancelled() {
                        tracing::debug!(
                            "Result limit {} exceeded after {}, cancelling remaining work",
                            limit,
                            repo_revs.repo
                        );
                        task_token.cancel();
                    }
                }
                tracing::debug!("Repository {} finished: {}", repo_revs.repo, outcome_name);
            });
        }

        let error = run.wait().await.err();
        let Collected {
            mut results,
            mut aggregate,
        } = std::mem::take(&mut *shared.lock());

        if results.len() > limit {
            aggregate.set_limit_hit();
            results.truncate(limit);
        }

        tracing::info!(
            "Search finished: {} results, {} searched, {} cloning, {} missing, {} timed out, limit hit: {}",
            results.len(),
            aggregate.searched().len(),
            aggregate.cloning().len(),
            aggregate.missing().len(),
            aggregate.timed_out().len(),
            aggregate.limit_hit()
        );

        SearchOutcome {
            results,
            aggregate,
            error,
        }
    }

    /// Ask the index backend which repositories it serves
    ///
    /// An unreachable index only marks the aggregate; the search goes on.
    async fn probe_index(
        &self,
        repos: &RepoRevisionSet,
        aggregate: &mut ResultAggregate,
    ) -> HashSet<RepoId> {
        let Some(index) = &self.index else {
            return HashSet::new();
        };
        let list = repos.repositories();
        match tokio::time::timeout(self.config.per_repo_timeout, index.indexed_repos(&list)).await {
            Ok(Ok(indexed)) => indexed,
            Ok(Err(e)) => {
                tracing::warn!("Index backend unavailable: {}", e);
                aggregate.set_index_unavailable();
                HashSet::new()
            }
            Err(_) => {
                tracing::warn!("Index backend did not answer within {:?}", self.config.per_repo_timeout);
                aggregate.set_index_unavailable();
                HashSet::new()
            }
        }
    }
}
