//! File-backed repository catalog
//!
//! A catalog describes a fixed set of repositories, their revisions and file
//! contents, and serves all four collaborator interfaces from memory. It backs
//! the command-line tool and lets integration tests script repository states.
//!
//! ```toml
//! [[repos]]
//! id = 1
//! name = "github.com/acme/widgets"
//! state = "ready"          # ready | cloning | missing | flaky
//! indexed = true
//! latency_ms = 0
//!
//! [repos.revisions]
//! "" = "3f1c9a0"           # default branch
//! "v1.2" = "77be210"
//!
//! [[repos.files]]
//! path = "src/widget.go"
//! language = "Go"
//! content = "package widget\n\nfunc NewWidget() *Widget {\n"
//!
//! [[repos.files.symbols]]
//! name = "NewWidget"
//! line = 3
//! kind = "func"
//! pattern = "/^func NewWidget() *Widget {$/"
//! ```
//!
//! Every revision of a repository sees the same files. A repository without
//! revisions has no commits, so its default branch does not resolve.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::backend::{
    IndexStatus, PatternInfo, RevisionResolver, SymbolLister, SymbolQuery, TextQuery,
    TextSearchResults, TextSearcher,
};
use crate::error::{Result, SearchError};
use crate::grouper::{LineMatch, RawFileMatch};
use crate::repo::{CommitId, RepoId, RepoRevisionSet, RepositoryRef, RepositoryRevisions};
use crate::symbol::RawSymbol;

/// Provisioning state of a catalog repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoState {
    #[default]
    Ready,
    Cloning,
    Missing,
    /// Every backend call fails with a temporary error
    Flaky,
}

/// Symbol entry inside a catalog file; path and language come from the file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSymbol {
    pub name: String,
    #[serde(default = "first_line")]
    pub line: u32,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub parent_kind: String,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub file_limited: bool,
}

fn first_line() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub path: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub symbols: Vec<CatalogSymbol>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRepo {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub state: RepoState,
    /// Served by the index backend
    #[serde(default)]
    pub indexed: bool,
    /// Artificial delay applied to every backend call
    #[serde(default)]
    pub latency_ms: u64,
    /// Revision spec to commit; `""` is the default branch
    #[serde(default)]
    pub revisions: BTreeMap<String, String>,
    #[serde(default)]
    pub files: Vec<CatalogFile>,
}

impl CatalogRepo {
    pub fn repository_ref(&self) -> RepositoryRef {
        RepositoryRef::new(self.id, self.name.clone())
    }

    fn has_commit(&self, commit: &CommitId) -> bool {
        self.revisions.values().any(|c| c == commit.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    index_offline: bool,
    #[serde(default)]
    repos: Vec<CatalogRepo>,
}

/// In-memory repository catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    repos: Vec<CatalogRepo>,
    by_id: HashMap<RepoId, usize>,
    index_offline: bool,
}

impl Catalog {
    /// Load a catalog file; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SearchError::CatalogError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let catalog = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        tracing::debug!(
            "Loaded catalog {} with {} repositories",
            path.display(),
            catalog.repos.len()
        );
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let doc: CatalogDocument = toml::from_str(content).map_err(|e| SearchError::CatalogError {
            message: format!("Failed to parse catalog: {}", e),
        })?;
        Self::build(doc)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let doc: CatalogDocument =
            serde_json::from_str(content).map_err(|e| SearchError::CatalogError {
                message: format!("Failed to parse catalog: {}", e),
            })?;
        Self::build(doc)
    }

    /// Build a catalog from repositories directly
    pub fn from_repos(repos: Vec<CatalogRepo>) -> Result<Self> {
        Self::build(CatalogDocument {
            index_offline: false,
            repos,
        })
    }

    fn build(doc: CatalogDocument) -> Result<Self> {
        let mut by_id = HashMap::new();
        for (idx, repo) in doc.repos.iter().enumerate() {
            if by_id.insert(RepoId(repo.id), idx).is_some() {
                return Err(SearchError::CatalogError {
                    message: format!("Duplicate repository id {}", repo.id),
                });
            }
        }
        Ok(Self {
            repos: doc.repos,
            by_id,
            index_offline: doc.index_offline,
        })
    }

    /// Make the index backend unreachable
    pub fn with_index_offline(mut self, offline: bool) -> Self {
        self.index_offline = offline;
        self
    }

    pub fn repos(&self) -> &[CatalogRepo] {
        &self.repos
    }

    pub fn repo_by_name(&self, name: &str) -> Option<RepositoryRef> {
        self.repos
            .iter()
            .find(|r| r.name == name)
            .map(CatalogRepo::repository_ref)
    }

    /// Turn `name[@rev]` selectors into a search set
    ///
    /// With no selectors every repository is searched at its default branch.
    pub fn select(&self, selectors: &[String]) -> Result<RepoRevisionSet> {
        if selectors.is_empty() {
            return Ok(self
                .repos
                .iter()
                .map(|r| RepositoryRevisions::default_branch(r.repository_ref()))
                .collect());
        }

        let mut set = RepoRevisionSet::new();
        for selector in selectors {
            let (name, rev) = RepositoryRevisions::parse_selector(selector);
            let repo = self.repo_by_name(name).ok_or_else(|| SearchError::RepoNotFound {
                repo: name.to_string(),
            })?;
            set.push(RepositoryRevisions::new(repo, vec![rev]));
        }
        Ok(set)
    }

    fn entry(&self, repo: &RepositoryRef) -> Result<&CatalogRepo> {
        self.by_id
            .get(&repo.id)
            .map(|&idx| &self.repos[idx])
            .ok_or_else(|| SearchError::RepoNotFound {
                repo: repo.name.clone(),
            })
    }

    /// Look up a repository and apply its latency and provisioning state
    async fn available(&self, repo: &RepositoryRef) -> Result<&CatalogRepo> {
        let entry = self.entry(repo)?;
        if entry.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(entry.latency_ms)).await;
        }
        match entry.state {
            RepoState::Ready => Ok(entry),
            RepoState::Cloning => Err(SearchError::RepoCloning {
                repo: entry.name.clone(),
            }),
            RepoState::Missing => Err(SearchError::RepoNotFound {
                repo: entry.name.clone(),
            }),
            RepoState::Flaky => Err(SearchError::Temporary {
                message: format!("{} is temporarily unavailable", entry.name),
            }),
        }
    }

    fn at_commit<'a>(&'a self, repo: &RepositoryRef, commit: &CommitId) -> Result<&'a CatalogRepo> {
        let entry = self.entry(repo)?;
        if !entry.has_commit(commit) {
            return Err(SearchError::Backend {
                message: format!("unknown commit {} in {}", commit, repo),
            });
        }
        Ok(entry)
    }
}

// ============================================================================
// Pattern matching
// ============================================================================

/// Compiled form of a [`PatternInfo`]
#[derive(Debug)]
struct Matcher {
    pattern: Option<Regex>,
    include: Vec<Regex>,
    exclude: Option<Regex>,
}

impl Matcher {
    fn new(info: &PatternInfo) -> Result<Self> {
        let pattern = if info.pattern.is_empty() {
            None
        } else {
            let source = if info.is_regex {
                info.pattern.clone()
            } else {
                regex::escape(&info.pattern)
            };
            Some(
                RegexBuilder::new(&source)
                    .case_insensitive(!info.is_case_sensitive)
                    .build()?,
            )
        };
        let include = info
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let exclude = info.exclude_pattern.as_deref().map(Regex::new).transpose()?;
        Ok(Self {
            pattern,
            include,
            exclude,
        })
    }

    fn path_matches(&self, path: &str) -> bool {
        self.include.iter().all(|re| re.is_match(path))
            && !self.exclude.as_ref().is_some_and(|re| re.is_match(path))
    }

    fn name_matches(&self, name: &str) -> bool {
        self.pattern.as_ref().map_or(true, |re| re.is_match(name))
    }

    fn line_match(&self, line_number: usize, line: &str) -> Option<LineMatch> {
        let re = self.pattern.as_ref()?;
        let offset_and_lengths: Vec<[i32; 2]> = re
            .find_iter(line)
            .filter(|m| !m.as_str().is_empty())
            .map(|m| {
                [
                    i32::try_from(m.start()).unwrap_or(i32::MAX),
                    i32::try_from(m.len()).unwrap_or(i32::MAX),
                ]
            })
            .collect();
        if offset_and_lengths.is_empty() {
            return None;
        }
        Some(LineMatch {
            preview: line.to_string(),
            line_number: i32::try_from(line_number).unwrap_or(i32::MAX),
            offset_and_lengths,
            limit_hit: false,
        })
    }
}

// ============================================================================
// Collaborator implementations
// ============================================================================

#[async_trait]
impl RevisionResolver for Catalog {
    async fn resolve_revision(&self, repo: &RepositoryRef, rev_spec: &str) -> Result<CommitId> {
        let entry = self.available(repo).await?;
        entry
            .revisions
            .get(rev_spec)
            .map(|c| CommitId(c.clone()))
            .ok_or_else(|| SearchError::RevisionNotFound {
                repo: entry.name.clone(),
                rev: rev_spec.to_string(),
            })
    }
}

#[async_trait]
impl SymbolLister for Catalog {
    async fn list_symbols(&self, query: &SymbolQuery) -> Result<Vec<RawSymbol>> {
        let entry = self.at_commit(&query.repo, &query.commit)?;
        let matcher = Matcher::new(&query.pattern)?;

        let symbols = entry
            .files
            .iter()
            .filter(|f| matcher.path_matches(&f.path))
            .flat_map(|f| {
                f.symbols.iter().map(move |s| RawSymbol {
                    name: s.name.clone(),
                    path: f.path.clone(),
                    line: s.line,
                    kind: s.kind.clone(),
                    language: f.language.clone(),
                    parent: s.parent.clone(),
                    parent_kind: s.parent_kind.clone(),
                    pattern: s.pattern.clone(),
                    file_limited: s.file_limited,
                })
            })
            .filter(|s| matcher.name_matches(&s.name))
            .take(query.first)
            .collect();
        Ok(symbols)
    }
}

#[async_trait]
impl TextSearcher for Catalog {
    async fn search_text(&self, query: &TextQuery) -> Result<TextSearchResults> {
        let entry = self.at_commit(&query.repo, &query.commit)?;
        let matcher = Matcher::new(&query.pattern)?;
        let mut results = TextSearchResults::default();

        for file in entry.files.iter().filter(|f| matcher.path_matches(&f.path)) {
            let line_matches: Vec<LineMatch> = file
                .content
                .lines()
                .enumerate()
                .filter_map(|(n, line)| matcher.line_match(n, line))
                .collect();
            if line_matches.is_empty() {
                continue;
            }
            if results.file_matches.len() >= query.file_match_limit {
                results.limit_hit = true;
                break;
            }
            results.file_matches.push(RawFileMatch {
                path: file.path.clone(),
                line_matches,
                limit_hit: false,
            });
        }

        Ok(results)
    }
}

#[async_trait]
impl IndexStatus for Catalog {
    async fn indexed_repos(&self, repos: &[RepositoryRef]) -> Result<HashSet<RepoId>> {
        if self.index_offline {
            return Err(SearchError::Backend {
                message: "index backend is offline".to_string(),
            });
        }
        Ok(repos
            .iter()
            .filter_map(|r| self.entry(r).ok())
            .filter(|e| e.indexed && e.state == RepoState::Ready)
            .map(|e| RepoId(e.id))
            .collect())
    }
}
