//! Per-repository search invocation and outcome classification
//!
//! [`invoke`] runs one repository's search under the fan-out's cancellation
//! token and a per-repository time budget, and classifies any failure into a
//! [`RepoOutcome`]. [`record_outcome`] then folds that outcome into the shared
//! [`ResultAggregate`]; only genuinely unexpected failures come back out as
//! errors for the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::aggregate::ResultAggregate;
use crate::backend::{PatternInfo, RevisionResolver, SymbolLister, SymbolQuery, TextQuery, TextSearcher};
use crate::error::{ErrorKind, Result, SearchError};
use crate::grouper::{group_symbols, group_text_matches, FileMatch};
use crate::repo::RepositoryRevisions;
use crate::symbol::Symbol;

/// File matches found in one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMatches {
    pub file_matches: Vec<FileMatch>,
    /// The repository had more matches than the per-repository limit allowed
    pub limit_hit: bool,
}

/// One kind of per-repository search
#[async_trait]
pub trait RepoSearch: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn search_repo(&self, repo_revs: &RepositoryRevisions) -> Result<RepoMatches>;
}

// ============================================================================
// Symbol search
// ============================================================================

/// Lists symbols at the first requested revision of a repository
pub struct SymbolRepoSearch {
    resolver: Arc<dyn RevisionResolver>,
    lister: Arc<dyn SymbolLister>,
    pattern: PatternInfo,
    limit: usize,
}

impl SymbolRepoSearch {
    pub fn new(
        resolver: Arc<dyn RevisionResolver>,
        lister: Arc<dyn SymbolLister>,
        pattern: PatternInfo,
        limit: usize,
    ) -> Self {
        Self {
            resolver,
            lister,
            pattern,
            limit,
        }
    }
}

#[async_trait]
impl RepoSearch for SymbolRepoSearch {
    fn name(&self) -> &'static str {
        "symbols"
    }

    async fn search_repo(&self, repo_revs: &RepositoryRevisions) -> Result<RepoMatches> {
        let Some(input_rev) = repo_revs.rev_specs().first() else {
            return Ok(RepoMatches::default());
        };
        let repo = &repo_revs.repo;

        let commit = self
            .resolver
            .resolve_revision(repo, input_rev.as_str())
            .await?;

        let query = SymbolQuery {
            repo: repo.clone(),
            commit: commit.clone(),
            pattern: self.pattern.clone(),
            first: self.limit,
        };
        let raw = self.lister.list_symbols(&query).await?;
        let symbols: Vec<Symbol> = raw
            .into_iter()
            .map(|s| Symbol::from_raw(s, repo, &commit))
            .collect();

        Ok(RepoMatches {
            file_matches: group_symbols(repo, &commit, input_rev.as_str(), symbols),
            limit_hit: false,
        })
    }
}

// ============================================================================
// Text search
// ============================================================================

/// Searches file contents at every requested revision of a repository
pub struct TextRepoSearch {
    resolver: Arc<dyn RevisionResolver>,
    searcher: Arc<dyn TextSearcher>,
    pattern: PatternInfo,
    file_match_limit: usize,
}

impl TextRepoSearch {
    pub fn new(
        resolver: Arc<dyn RevisionResolver>,
        searcher: Arc<dyn TextSearcher>,
        pattern: PatternInfo,
        file_match_limit: usize,
    ) -> Self {
        Self {
            resolver,
            searcher,
            pattern,
            file_match_limit,
        }
    }
}

#[async_trait]
impl RepoSearch for TextRepoSearch {
    fn name(&self) -> &'static str {
        "text"
    }

    async fn search_repo(&self, repo_revs: &RepositoryRevisions) -> Result<RepoMatches> {
        let repo = &repo_revs.repo;
        let mut matches = RepoMatches::default();

        for rev in repo_revs.rev_specs() {
            let commit = self.resolver.resolve_revision(repo, rev.as_str()).await?;
            let query = TextQuery {
                repo: repo.clone(),
                commit: commit.clone(),
                pattern: self.pattern.clone(),
                file_match_limit: self.file_match_limit,
            };
            let results = self.searcher.search_text(&query).await?;
            matches.limit_hit |= results.limit_hit;
            matches.file_matches.extend(group_text_matches(
                repo,
                &commit,
                rev.as_str(),
                results.file_matches,
            ));
        }

        Ok(matches)
    }
}

// ============================================================================
// Invocation and classification
// ============================================================================

/// How one repository's search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// Searched successfully (possibly with zero matches)
    Searched,
    /// Still being cloned
    Cloning,
    /// Does not exist
    Missing,
    /// Default branch does not resolve: the repository has no commits
    EmptyRepository,
    /// Exceeded its time budget or hit a transient backend failure
    TimedOut,
    /// Abandoned because the search was cancelled
    Cancelled,
    /// Anything else; surfaced to the caller
    Fatal(SearchError),
}

impl RepoOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Searched => "searched",
            Self::Cloning => "cloning",
            Self::Missing => "missing",
            Self::EmptyRepository => "empty",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
            Self::Fatal(_) => "fatal",
        }
    }
}

/// Classify a per-repository failure
///
/// A cancellation error only counts as noise when the search's own token was
/// cancelled; otherwise a collaborator gave up on its own and that is fatal.
pub fn classify(
    repo_revs: &RepositoryRevisions,
    err: SearchError,
    token: &CancellationToken,
) -> RepoOutcome {
    match err.kind() {
        ErrorKind::Cloning => RepoOutcome::Cloning,
        ErrorKind::Missing => RepoOutcome::Missing,
        ErrorKind::RevisionNotFound if repo_revs.only_default_branch() => {
            RepoOutcome::EmptyRepository
        }
        ErrorKind::Timeout | ErrorKind::Temporary => RepoOutcome::TimedOut,
        ErrorKind::Cancelled if token.is_cancelled() => RepoOutcome::Cancelled,
        _ => RepoOutcome::Fatal(err),
    }
}

/// Run one repository's search, bounded by `timeout` and `token`
pub async fn invoke(
    search: &dyn RepoSearch,
    repo_revs: &RepositoryRevisions,
    token: &CancellationToken,
    timeout: Duration,
) -> (RepoMatches, RepoOutcome) {
    if token.is_cancelled() {
        return (RepoMatches::default(), RepoOutcome::Cancelled);
    }

    let result = tokio::select! {
        biased;
        _ = token.cancelled() => Err(SearchError::Cancelled),
        timed = tokio::time::timeout(timeout, search.search_repo(repo_revs)) => match timed {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout {
                message: format!(
                    "{} search in {} exceeded {}ms",
                    search.name(),
                    repo_revs.repo,
                    timeout.as_millis()
                ),
            }),
        },
    };

    match result {
        Ok(matches) => {
            tracing::debug!(
                "Searched {} ({}): {} file matches",
                repo_revs.repo,
                search.name(),
                matches.file_matches.len()
            );
            (matches, RepoOutcome::Searched)
        }
        Err(err) => {
            tracing::debug!(
                "Repository {} failed: {} (timeout: {}, temporary: {})",
                repo_revs.repo,
                err,
                err.is_timeout(),
                err.is_temporary()
            );
            let outcome = classify(repo_revs, err, token);
            (RepoMatches::default(), outcome)
        }
    }
}

/// Fold one repository's outcome into the aggregate
///
/// Returns the error to surface to the caller, if any.
pub fn record_outcome(
    aggregate: &mut ResultAggregate,
    repo_revs: &RepositoryRevisions,
    outcome: RepoOutcome,
    repo_limit_hit: bool,
    indexed: bool,
) -> Option<SearchError> {
    let repo = &repo_revs.repo;
    if repo_limit_hit {
        aggregate.set_limit_hit();
        aggregate.mark_partial(repo);
    }

    match outcome {
        RepoOutcome::Searched => {
            if aggregate.mark_searched(repo) && indexed {
                aggregate.mark_indexed(repo);
            }
            None
        }
        RepoOutcome::Cloning => {
            aggregate.mark_cloning(repo);
            None
        }
        RepoOutcome::Missing => {
            aggregate.mark_missing(repo);
            None
        }
        RepoOutcome::TimedOut => {
            aggregate.mark_timed_out(repo);
            None
        }
        RepoOutcome::EmptyRepository | RepoOutcome::Cancelled => None,
        RepoOutcome::Fatal(err) => Some(err),
    }
}

// ============================================================================
// Tests
// ============================================================================
