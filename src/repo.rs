//! Repository identities and the repository/revision input set

use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique repository identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(pub i32);

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable repository identity
///
/// Two refs are the same repository when their [`RepoId`]s are equal; the
/// name is for display and URI construction only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub id: RepoId,
    /// Display name, e.g. `github.com/acme/widgets`
    pub name: String,
}

impl RepositoryRef {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id: RepoId(id),
            name: name.into(),
        }
    }

    /// URL path of the repository (`/` + name)
    pub fn url(&self) -> String {
        format!("/{}", self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolved commit identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A revision specifier; the empty string means the default branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionSpec(pub String);

impl RevisionSpec {
    pub fn default_branch() -> Self {
        Self(String::new())
    }

    pub fn is_default_branch(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RevisionSpec {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One repository pinned to zero or more revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRevisions {
    pub repo: RepositoryRef,
    #[serde(default)]
    pub revs: Vec<RevisionSpec>,
}

impl RepositoryRevisions {
    pub fn new(repo: RepositoryRef, revs: Vec<RevisionSpec>) -> Self {
        Self { repo, revs }
    }

    /// Repository at its default branch only
    pub fn default_branch(repo: RepositoryRef) -> Self {
        Self::new(repo, vec![RevisionSpec::default_branch()])
    }

    pub fn rev_specs(&self) -> &[RevisionSpec] {
        &self.revs
    }

    /// True when the only requested revision is the default branch
    pub fn only_default_branch(&self) -> bool {
        self.revs.is_empty() || (self.revs.len() == 1 && self.revs[0].is_default_branch())
    }

    /// Parse a `name[@rev]` selector; a bare name means the default branch
    pub fn parse_selector(selector: &str) -> (&str, RevisionSpec) {
        match selector.split_once('@') {
            Some((name, rev)) => (name, RevisionSpec::from(rev)),
            None => (selector, RevisionSpec::default_branch()),
        }
    }
}

/// Ordered sequence of repository+revision pairs to search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoRevisionSet(Vec<RepositoryRevisions>);

impl RepoRevisionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RepositoryRevisions) {
        self.0.push(entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepositoryRevisions> {
        self.0.iter()
    }

    /// Distinct repositories in first-seen order
    pub fn repositories(&self) -> Vec<RepositoryRef> {
        let mut seen = std::collections::HashSet::new();
        self.0
            .iter()
            .filter(|entry| seen.insert(entry.repo.id))
            .map(|entry| entry.repo.clone())
            .collect()
    }
}

impl FromIterator<RepositoryRevisions> for RepoRevisionSet {
    fn from_iter<I: IntoIterator<Item = RepositoryRevisions>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RepoRevisionSet {
    type Item = &'a RepositoryRevisions;
    type IntoIter = std::slice::Iter<'a, RepositoryRevisions>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
