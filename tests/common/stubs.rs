//! Scripted collaborators for orchestrator tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use semfora_search::{
    CommitId, IndexStatus, RawSymbol, RepoId, RepoRevisionSet, RepositoryRef,
    RepositoryRevisions, Result, RevisionResolver, SearchConfig, SearchError, SearchOrchestrator,
    SymbolLister, SymbolQuery, TextQuery, TextSearchResults, TextSearcher,
};

/// Repository reference used throughout the tests
pub fn repo(id: i32) -> RepositoryRef {
    RepositoryRef::new(id, format!("github.com/acme/r{}", id))
}

/// Search set with every repository at its default branch
pub fn default_branch_set(ids: &[i32]) -> RepoRevisionSet {
    ids.iter()
        .map(|id| RepositoryRevisions::default_branch(repo(*id)))
        .collect()
}

pub fn ids(list: &[RepositoryRef]) -> Vec<i32> {
    let mut ids: Vec<i32> = list.iter().map(|r| r.id.0).collect();
    ids.sort_unstable();
    ids
}

#[derive(Clone)]
struct Script {
    resolve: Result<CommitId>,
    symbols: Result<Vec<RawSymbol>>,
    text: Result<TextSearchResults>,
    latency: Duration,
}

impl Script {
    fn ready(id: i32) -> Self {
        Self {
            resolve: Ok(CommitId(format!("commit-{}", id))),
            symbols: Ok(Vec::new()),
            text: Ok(TextSearchResults::default()),
            latency: Duration::ZERO,
        }
    }
}

/// Decrements the in-flight counter even when the call is dropped mid-way
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted backend implementing every collaborator interface
#[derive(Default)]
pub struct StubBackend {
    scripts: Mutex<HashMap<RepoId, Script>>,
    index: Mutex<Option<Result<HashSet<RepoId>>>>,
    symbol_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, id: i32) -> Script {
        self.scripts
            .lock()
            .get(&RepoId(id))
            .cloned()
            .unwrap_or_else(|| Script::ready(id))
    }

    fn edit(&self, id: i32, f: impl FnOnce(&mut Script)) {
        let mut scripts = self.scripts.lock();
        f(scripts.entry(RepoId(id)).or_insert_with(|| Script::ready(id)));
    }

    /// Repository `id` lists one function per `(name, path)` pair
    pub fn with_symbols(self, id: i32, symbols: &[(&str, &str)]) -> Self {
        let raw = symbols
            .iter()
            .map(|(name, path)| RawSymbol {
                name: name.to_string(),
                path: path.to_string(),
                line: 1,
                kind: "function".into(),
                language: "Go".into(),
                ..Default::default()
            })
            .collect();
        self.edit(id, |s| s.symbols = Ok(raw));
        self
    }

    /// Revision resolution for `id` fails with `err`
    pub fn with_resolve_error(self, id: i32, err: SearchError) -> Self {
        self.edit(id, |s| s.resolve = Err(err));
        self
    }

    /// Symbol listing for `id` fails with `err`
    pub fn with_symbols_error(self, id: i32, err: SearchError) -> Self {
        self.edit(id, |s| s.symbols = Err(err));
        self
    }

    pub fn with_text(self, id: i32, results: TextSearchResults) -> Self {
        self.edit(id, |s| s.text = Ok(results));
        self
    }

    /// Every backend call for `id` takes `latency`
    pub fn with_latency(self, id: i32, latency: Duration) -> Self {
        self.edit(id, |s| s.latency = latency);
        self
    }

    pub fn with_indexed(self, ids: &[i32]) -> Self {
        *self.index.lock() = Some(Ok(ids.iter().map(|id| RepoId(*id)).collect()));
        self
    }

    pub fn with_index_down(self) -> Self {
        *self.index.lock() = Some(Err(SearchError::Backend {
            message: "index unreachable".into(),
        }));
        self
    }

    pub fn symbol_calls(&self) -> usize {
        self.symbol_calls.load(Ordering::SeqCst)
    }

    /// Highest number of symbol listings observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, latency: Duration) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        guard
    }
}

#[async_trait]
impl RevisionResolver for StubBackend {
    async fn resolve_revision(&self, repo: &RepositoryRef, _rev_spec: &str) -> Result<CommitId> {
        self.script(repo.id.0).resolve
    }
}

#[async_trait]
impl SymbolLister for StubBackend {
    async fn list_symbols(&self, query: &SymbolQuery) -> Result<Vec<RawSymbol>> {
        self.symbol_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script(query.repo.id.0);
        let _guard = self.enter(script.latency).await;
        script
            .symbols
            .map(|symbols| symbols.into_iter().take(query.first).collect())
    }
}

#[async_trait]
impl TextSearcher for StubBackend {
    async fn search_text(&self, query: &TextQuery) -> Result<TextSearchResults> {
        let script = self.script(query.repo.id.0);
        let _guard = self.enter(script.latency).await;
        script.text
    }
}

#[async_trait]
impl IndexStatus for StubBackend {
    async fn indexed_repos(&self, _repos: &[RepositoryRef]) -> Result<HashSet<RepoId>> {
        self.index.lock().clone().unwrap_or_else(|| Ok(HashSet::new()))
    }
}

/// Orchestrator wired to `stub` for every collaborator role
pub fn orchestrator(stub: &Arc<StubBackend>, config: SearchConfig) -> SearchOrchestrator {
    SearchOrchestrator::new(stub.clone(), stub.clone(), config)
        .with_text_searcher(stub.clone())
        .with_index(stub.clone())
}
