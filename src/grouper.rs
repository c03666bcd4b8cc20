//! Groups per-repository hits into file matches
//!
//! A file match is addressed by a synthetic URI, `git://<repo>[?<rev>]#<path>`.
//! Symbols (or line matches) that land on the same URI share one
//! [`FileMatch`], created the first time the URI is seen.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::repo::{CommitId, RepositoryRef};
use crate::symbol::Symbol;

/// One matching line from a text search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMatch {
    pub preview: String,
    /// 0-based line number
    pub line_number: i32,
    /// `[offset, length]` of each match within the line
    #[serde(default)]
    pub offset_and_lengths: Vec<[i32; 2]>,
    #[serde(default)]
    pub limit_hit: bool,
}

/// All hits within one file at one revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatch {
    pub uri: String,
    pub repo: RepositoryRef,
    pub commit: CommitId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_rev: Option<String>,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<Symbol>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line_matches: Vec<LineMatch>,
    /// Whether this file's own result set was truncated
    pub limit_hit: bool,
}

impl FileMatch {
    pub fn new(repo: &RepositoryRef, commit: &CommitId, input_rev: &str, path: &str) -> Self {
        Self {
            uri: file_match_uri(repo, input_rev, path),
            repo: repo.clone(),
            commit: commit.clone(),
            input_rev: if input_rev.is_empty() {
                None
            } else {
                Some(input_rev.to_string())
            },
            path: path.to_string(),
            symbols: Vec::new(),
            line_matches: Vec::new(),
            limit_hit: false,
        }
    }

    /// Stable key of this match
    pub fn key(&self) -> &str {
        &self.uri
    }

    /// Number of individual hits in this file
    pub fn match_count(&self) -> usize {
        self.symbols.len() + self.line_matches.len()
    }
}

/// Build the `git://repo?rev#path` URI for a file match
pub fn file_match_uri(repo: &RepositoryRef, input_rev: &str, path: &str) -> String {
    let mut uri = format!("git:/{}", repo.url());
    if !input_rev.is_empty() {
        uri.push('?');
        uri.push_str(input_rev);
    }
    uri.push('#');
    uri.push_str(path);
    uri
}

/// Group one repository's symbols by file, in first-seen order
pub fn group_symbols(
    repo: &RepositoryRef,
    commit: &CommitId,
    input_rev: &str,
    symbols: Vec<Symbol>,
) -> Vec<FileMatch> {
    let mut by_uri: HashMap<String, usize> = HashMap::new();
    let mut file_matches: Vec<FileMatch> = Vec::new();

    for symbol in symbols {
        let uri = file_match_uri(repo, input_rev, &symbol.path);
        match by_uri.get(&uri) {
            Some(&idx) => file_matches[idx].symbols.push(symbol),
            None => {
                let mut file_match = FileMatch::new(repo, commit, input_rev, &symbol.path);
                file_match.symbols.push(symbol);
                by_uri.insert(uri, file_matches.len());
                file_matches.push(file_match);
            }
        }
    }

    file_matches
}

/// Raw per-file text search hit as returned by the text searcher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFileMatch {
    pub path: String,
    #[serde(default)]
    pub line_matches: Vec<LineMatch>,
    #[serde(default)]
    pub limit_hit: bool,
}

/// Turn one repository's raw text hits into file matches, merging hits that
/// share a path
pub fn group_text_matches(
    repo: &RepositoryRef,
    commit: &CommitId,
    input_rev: &str,
    raw: Vec<RawFileMatch>,
) -> Vec<FileMatch> {
    let mut by_uri: HashMap<String, usize> = HashMap::new();
    let mut file_matches: Vec<FileMatch> = Vec::new();

    for hit in raw {
        let uri = file_match_uri(repo, input_rev, &hit.path);
        let idx = match by_uri.get(&uri) {
            Some(&idx) => idx,
            None => {
                by_uri.insert(uri, file_matches.len());
                file_matches.push(FileMatch::new(repo, commit, input_rev, &hit.path));
                file_matches.len() - 1
            }
        };
        let file_match = &mut file_matches[idx];
        file_match.line_matches.extend(hit.line_matches);
        file_match.limit_hit |= hit.limit_hit;
    }

    file_matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::RawSymbol;

    fn repo() -> RepositoryRef {
        RepositoryRef::new(1, "github.com/acme/app")
    }

    fn commit() -> CommitId {
        CommitId("c0ffee".into())
    }

    fn symbol(name: &str, path: &str) -> Symbol {
        let raw = RawSymbol {
            name: name.into(),
            path: path.into(),
            line: 1,
            kind: "function".into(),
            ..Default::default()
        };
        Symbol::from_raw(raw, &repo(), &commit())
    }

    #[test]
    fn test_uri_with_and_without_rev() {
        assert_eq!(
            file_match_uri(&repo(), "v2", "src/lib.rs"),
            "git://github.com/acme/app?v2#src/lib.rs"
        );
        assert_eq!(
            file_match_uri(&repo(), "", "src/lib.rs"),
            "git://github.com/acme/app#src/lib.rs"
        );
    }

    #[test]
    fn test_group_symbols_merges_same_file() {
        let grouped = group_symbols(
            &repo(),
            &commit(),
            "main",
            vec![
                symbol("a", "x.go"),
                symbol("b", "y.go"),
                symbol("c", "x.go"),
            ],
        );
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].path, "x.go");
        assert_eq!(grouped[0].symbols.len(), 2);
        assert_eq!(grouped[0].symbols[1].name, "c");
        assert_eq!(grouped[1].path, "y.go");
        assert_eq!(grouped[0].input_rev.as_deref(), Some("main"));
    }

    #[test]
    fn test_group_symbols_preserves_first_seen_order() {
        let grouped = group_symbols(
            &repo(),
            &commit(),
            "",
            vec![symbol("z", "z.go"), symbol("a", "a.go"), symbol("m", "m.go")],
        );
        let paths: Vec<_> = grouped.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["z.go", "a.go", "m.go"]);
        assert!(grouped[0].input_rev.is_none());
    }

    #[test]
    fn test_group_text_matches() {
        let raw = vec![
            RawFileMatch {
                path: "README.md".into(),
                line_matches: vec![LineMatch {
                    preview: "hello".into(),
                    line_number: 0,
                    offset_and_lengths: vec![[0, 5]],
                    limit_hit: false,
                }],
                limit_hit: false,
            },
            RawFileMatch {
                path: "README.md".into(),
                line_matches: vec![LineMatch::default()],
                limit_hit: true,
            },
        ];
        let grouped = group_text_matches(&repo(), &commit(), "", raw);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].line_matches.len(), 2);
        assert!(grouped[0].limit_hit);
        assert_eq!(grouped[0].match_count(), 2);
    }
}
