//! Ranked symbol suggestions
//!
//! Suggestions favour short, top-level type and function names, and names that
//! also appear in the path of the file defining them.

use std::cmp::Ordering;

use serde::Serialize;

use crate::grouper::FileMatch;
use crate::pagination::{Page, PaginationWindow};
use crate::symbol::{Symbol, SymbolKind};

const BASE_SCORE: i32 = 20;

/// A symbol suggested for a search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSuggestion {
    pub label: String,
    pub score: i32,
    /// Length of the label, the first tie breaker
    pub length: usize,
    pub uri: String,
    pub symbol: Symbol,
}

impl SearchSuggestion {
    pub fn new(symbol: Symbol, uri: &str) -> Self {
        let score = score_symbol(&symbol, uri);
        Self {
            label: symbol.name.clone(),
            score,
            length: symbol.name.len(),
            uri: uri.to_string(),
            symbol,
        }
    }
}

/// Relevance score of `symbol`, defined in the file at `uri`
pub fn score_symbol(symbol: &Symbol, uri: &str) -> i32 {
    let mut score = BASE_SCORE;
    if symbol.container_name.is_none() {
        score += 1;
    }
    if symbol.name.len() < 12 {
        score += 1;
    }
    match symbol.kind {
        SymbolKind::Function | SymbolKind::Method => score += 2,
        SymbolKind::Class => score += 3,
        _ => {}
    }
    if symbol.name.len() >= 4 && uri.to_lowercase().contains(&symbol.name.to_lowercase()) {
        score += 1;
    }
    score
}

fn by_rank(a: &SearchSuggestion, b: &SearchSuggestion) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.length.cmp(&b.length))
        .then_with(|| a.label.cmp(&b.label))
}

/// Rank every symbol in `file_matches` and return the first page
pub fn symbol_suggestions(
    file_matches: &[FileMatch],
    first: Option<i32>,
    default_page_size: usize,
) -> Page<SearchSuggestion> {
    let mut suggestions: Vec<SearchSuggestion> = file_matches
        .iter()
        .flat_map(|fm| {
            fm.symbols
                .iter()
                .map(move |s| SearchSuggestion::new(s.clone(), &fm.uri))
        })
        .collect();
    suggestions.sort_by(by_rank);

    PaginationWindow::with_default(first, default_page_size).paginate(suggestions)
}
