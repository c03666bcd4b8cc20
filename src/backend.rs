//! Collaborator interfaces consumed by the search core
//!
//! Revision resolution, symbol extraction, text search and index status all
//! live in other services. Implementations translate whatever those services
//! return into [`SearchError`](crate::SearchError) variants so the core never
//! has to inspect foreign error types.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grouper::RawFileMatch;
use crate::repo::{CommitId, RepoId, RepositoryRef};
use crate::symbol::RawSymbol;

/// What to search for and where
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternInfo {
    pub pattern: String,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default)]
    pub is_case_sensitive: bool,
    /// Path regexes that must all match
    #[serde(default)]
    pub include_patterns: Vec<String>,
    /// Path regex that must not match
    #[serde(default)]
    pub exclude_pattern: Option<String>,
}

impl PatternInfo {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn regex(mut self) -> Self {
        self.is_regex = true;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.is_case_sensitive = true;
        self
    }

    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_pattern = Some(pattern.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}

/// Arguments for one symbol listing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolQuery {
    pub repo: RepositoryRef,
    pub commit: CommitId,
    pub pattern: PatternInfo,
    /// Maximum number of symbols to return
    pub first: usize,
}

/// Arguments for one text search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuery {
    pub repo: RepositoryRef,
    pub commit: CommitId,
    pub pattern: PatternInfo,
    /// Maximum number of file matches to return
    pub file_match_limit: usize,
}

/// Text search output for one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSearchResults {
    pub file_matches: Vec<RawFileMatch>,
    /// More matches exist in this repository than were returned
    pub limit_hit: bool,
}

/// Resolves revision specifiers to commits
#[async_trait]
pub trait RevisionResolver: Send + Sync {
    /// Resolve `rev_spec` (empty = default branch) in `repo`
    ///
    /// Fails with `RepoNotFound`, `RepoCloning`, `RevisionNotFound`, or a
    /// timeout/temporary error.
    async fn resolve_revision(&self, repo: &RepositoryRef, rev_spec: &str) -> Result<CommitId>;
}

/// Lists symbols extracted from one commit
#[async_trait]
pub trait SymbolLister: Send + Sync {
    async fn list_symbols(&self, query: &SymbolQuery) -> Result<Vec<RawSymbol>>;
}

/// Searches file contents at one commit
#[async_trait]
pub trait TextSearcher: Send + Sync {
    async fn search_text(&self, query: &TextQuery) -> Result<TextSearchResults>;
}

/// Reports which repositories are served by an index
#[async_trait]
pub trait IndexStatus: Send + Sync {
    /// Subset of `repos` that the index covers; an error means the index
    /// backend is unreachable
    async fn indexed_repos(&self, repos: &[RepositoryRef]) -> Result<HashSet<RepoId>>;
}
