//! Cross-repository search status accumulator
//!
//! A [`ResultAggregate`] collects which repositories were matched, searched,
//! indexed, or could not be searched, plus the running result count, for one
//! orchestrated search. Per-repository contributions are folded together with
//! [`ResultAggregate::update`], which is a monotonic union: flags are OR-ed,
//! counts are added, and repository lists are merged by identifier.
//!
//! # Ordering
//!
//! Every repository list is kept sorted by [`RepoId`] so callers can present
//! "repositories searched" in a stable order.
//!
//! # Duplicates
//!
//! Entries are deduplicated by identifier only. When both sides carry a ref
//! with the same id, the receiver's ref is kept even if the other side's
//! display name differs.

use serde::{Serialize, Serializer};

use crate::partial::PartialResults;
use crate::repo::{RepoId, RepositoryRef};

/// Shared, mergeable accumulator of repository status sets and counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultAggregate {
    limit_hit: bool,
    index_unavailable: bool,
    repos: Vec<RepositoryRef>,
    searched: Vec<RepositoryRef>,
    indexed: Vec<RepositoryRef>,
    cloning: Vec<RepositoryRef>,
    missing: Vec<RepositoryRef>,
    timed_out: Vec<RepositoryRef>,
    partial: PartialResults,
    result_count: i32,
    max_results_count: i32,
}

impl ResultAggregate {
    /// Create an empty aggregate with no result ceiling
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty aggregate with the given result ceiling
    pub fn with_max_results(max_results_count: i32) -> Self {
        Self {
            max_results_count,
            ..Self::default()
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Whether the result limit was hit
    ///
    /// True if any contributor reported truncation, or if the running count
    /// exceeds a configured ceiling.
    pub fn limit_hit(&self) -> bool {
        self.limit_hit || (self.max_results_count > 0 && self.result_count > self.max_results_count)
    }

    /// The stored truncation flag, without the count check
    pub fn limit_hit_flag(&self) -> bool {
        self.limit_hit
    }

    pub fn index_unavailable(&self) -> bool {
        self.index_unavailable
    }

    /// Repositories matched by the repository filters
    pub fn repos(&self) -> &[RepositoryRef] {
        &self.repos
    }

    /// Repositories that were searched successfully
    pub fn searched(&self) -> &[RepositoryRef] {
        &self.searched
    }

    /// Repositories that were searched using an index
    pub fn indexed(&self) -> &[RepositoryRef] {
        &self.indexed
    }

    /// Repositories that could not be searched because they are still cloning
    pub fn cloning(&self) -> &[RepositoryRef] {
        &self.cloning
    }

    /// Repositories that could not be searched because they do not exist
    pub fn missing(&self) -> &[RepositoryRef] {
        &self.missing
    }

    /// Repositories that could not be searched within the time budget
    pub fn timed_out(&self) -> &[RepositoryRef] {
        &self.timed_out
    }

    pub fn partial(&self) -> &PartialResults {
        &self.partial
    }

    pub fn result_count(&self) -> i32 {
        self.result_count
    }

    pub fn max_results_count(&self) -> i32 {
        self.max_results_count
    }

    /// True if the repository is in `cloning`, `missing` or `timed_out`
    pub fn is_unsearchable(&self, id: RepoId) -> bool {
        contains(&self.cloning, id) || contains(&self.missing, id) || contains(&self.timed_out, id)
    }

    // ========================================================================
    // Recording
    // ========================================================================

    pub fn set_limit_hit(&mut self) {
        self.limit_hit = true;
    }

    pub fn set_index_unavailable(&mut self) {
        self.index_unavailable = true;
    }

    pub fn set_max_results_count(&mut self, max_results_count: i32) {
        self.max_results_count = max_results_count;
    }

    /// Add to the running result count, saturating at `i32::MAX`
    pub fn add_results(&mut self, count: usize) {
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        self.result_count = self.result_count.saturating_add(count);
    }

    pub fn add_repos<'a>(&mut self, repos: impl IntoIterator<Item = &'a RepositoryRef>) {
        for repo in repos {
            insert_sorted(&mut self.repos, repo);
        }
    }

    /// Record a successfully searched repository
    ///
    /// Returns false (and records nothing) if the repository is already known
    /// to be unsearchable.
    pub fn mark_searched(&mut self, repo: &RepositoryRef) -> bool {
        if self.is_unsearchable(repo.id) {
            return false;
        }
        insert_sorted(&mut self.searched, repo);
        true
    }

    pub fn mark_indexed(&mut self, repo: &RepositoryRef) {
        insert_sorted(&mut self.indexed, repo);
    }

    pub fn mark_cloning(&mut self, repo: &RepositoryRef) {
        insert_sorted(&mut self.cloning, repo);
        self.enforce_exclusivity();
    }

    pub fn mark_missing(&mut self, repo: &RepositoryRef) {
        insert_sorted(&mut self.missing, repo);
        self.enforce_exclusivity();
    }

    pub fn mark_timed_out(&mut self, repo: &RepositoryRef) {
        insert_sorted(&mut self.timed_out, repo);
        self.enforce_exclusivity();
    }

    pub fn mark_partial(&mut self, repo: &RepositoryRef) {
        self.partial.mark(repo);
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// Fold `other` into `self`, deduplicating repositories by identifier
    ///
    /// `other` is never modified. Booleans are OR-ed and result counts added.
    /// The ceiling is only adopted from `other` when `self` has none.
    pub fn update(&mut self, other: &ResultAggregate) {
        self.limit_hit = self.limit_hit || other.limit_hit;
        self.index_unavailable = self.index_unavailable || other.index_unavailable;

        append_unique(&mut self.repos, &other.repos);
        append_unique(&mut self.searched, &other.searched);
        append_unique(&mut self.indexed, &other.indexed);
        append_unique(&mut self.cloning, &other.cloning);
        append_unique(&mut self.missing, &other.missing);
        append_unique(&mut self.timed_out, &other.timed_out);

        self.result_count = self.result_count.saturating_add(other.result_count);
        if self.max_results_count == 0 {
            self.max_results_count = other.max_results_count;
        }

        self.partial.merge(&other.partial);
        self.enforce_exclusivity();
    }

    /// A repository known to be unsearchable never stays in `searched`
    fn enforce_exclusivity(&mut self) {
        if self.searched.is_empty() {
            return;
        }
        let (cloning, missing, timed_out) = (&self.cloning, &self.missing, &self.timed_out);
        self.searched.retain(|r| {
            !(contains(cloning, r.id) || contains(missing, r.id) || contains(timed_out, r.id))
        });
    }
}

fn contains(list: &[RepositoryRef], id: RepoId) -> bool {
    list.binary_search_by_key(&id, |r| r.id).is_ok()
}

fn insert_sorted(list: &mut Vec<RepositoryRef>, repo: &RepositoryRef) {
    if let Err(pos) = list.binary_search_by_key(&repo.id, |r| r.id) {
        list.insert(pos, repo.clone());
    }
}

/// Sorted merge of `src` into `dst`
///
/// Walks `dst` in id order; for each element, consumes every `src` element
/// whose id is <= the current one, keeping those whose id differs. Leftovers
/// are appended and the result re-sorted. The sort is stable, so on an id tie
/// between pre-existing `dst` entries their relative order is preserved.
fn append_unique(dst: &mut Vec<RepositoryRef>, src: &[RepositoryRef]) {
    if src.is_empty() {
        return;
    }
    dst.sort_by_key(|r| r.id);
    let mut src: Vec<&RepositoryRef> = src.iter().collect();
    src.sort_by_key(|r| r.id);

    let mut rest = src.as_slice();
    let mut appended = Vec::new();
    for current in dst.iter() {
        while let Some((head, tail)) = rest.split_first() {
            if head.id > current.id {
                break;
            }
            if head.id != current.id {
                appended.push((*head).clone());
            }
            rest = tail;
        }
    }
    appended.extend(rest.iter().map(|r| (*r).clone()));

    dst.extend(appended);
    dst.sort_by_key(|r| r.id);
}

/// Serialized view with the derived limit flag
#[derive(Serialize)]
struct AggregateView<'a> {
    limit_hit: bool,
    index_unavailable: bool,
    result_count: i32,
    max_results_count: i32,
    repos: &'a [RepositoryRef],
    searched: &'a [RepositoryRef],
    indexed: &'a [RepositoryRef],
    cloning: &'a [RepositoryRef],
    missing: &'a [RepositoryRef],
    timed_out: &'a [RepositoryRef],
    partial: &'a PartialResults,
}

impl Serialize for ResultAggregate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        AggregateView {
            limit_hit: self.limit_hit(),
            index_unavailable: self.index_unavailable,
            result_count: self.result_count,
            max_results_count: self.max_results_count,
            repos: &self.repos,
            searched: &self.searched,
            indexed: &self.indexed,
            cloning: &self.cloning,
            missing: &self.missing,
            timed_out: &self.timed_out,
            partial: &self.partial,
        }
        .serialize(serializer)
    }
}

// ============================================================================
// Tests
// ============================================================================
