//! Tracks repositories whose results were cut short by a per-repository limit

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::repo::{RepoId, RepositoryRef};

/// Set of repositories that were searched but have results that were not
/// returned because a per-repository limit was exceeded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialResults {
    repos: BTreeMap<RepoId, RepositoryRef>,
}

impl PartialResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a repository as truncated; the first reference for an id is kept
    pub fn mark(&mut self, repo: &RepositoryRef) {
        self.repos.entry(repo.id).or_insert_with(|| repo.clone());
    }

    pub fn contains(&self, id: RepoId) -> bool {
        self.repos.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Repositories in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &RepositoryRef> {
        self.repos.values()
    }

    /// Union by identifier
    pub fn merge(&mut self, other: &PartialResults) {
        for repo in other.iter() {
            self.mark(repo);
        }
    }
}

impl Serialize for PartialResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.repos.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_idempotent() {
        let mut partial = PartialResults::new();
        let repo = RepositoryRef::new(7, "r7");
        partial.mark(&repo);
        partial.mark(&repo);
        assert_eq!(partial.len(), 1);
        assert!(partial.contains(RepoId(7)));
    }

    #[test]
    fn test_merge_unions_by_id() {
        let mut a = PartialResults::new();
        a.mark(&RepositoryRef::new(1, "one"));
        let mut b = PartialResults::new();
        b.mark(&RepositoryRef::new(1, "one-renamed"));
        b.mark(&RepositoryRef::new(2, "two"));

        a.merge(&b);
        let names: Vec<_> = a.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }
}
