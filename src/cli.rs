//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::backend::PatternInfo;

/// Multi-repository symbol and text search
#[derive(Parser, Debug)]
#[command(name = "semfora-search")]
#[command(about = "Search symbols and file contents across many repositories at once")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "SEMFORA_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================
// Main Commands Enum
// ============================================

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search symbol names across repositories
    #[command(visible_alias = "s")]
    Symbols(SearchArgs),

    /// Search file contents across repositories
    #[command(visible_alias = "t")]
    Text(SearchArgs),

    /// List the symbols of one repository revision
    #[command(visible_alias = "l")]
    List(ListArgs),

    /// Suggest the most relevant symbols for a pattern
    Suggest(SuggestArgs),
}

// ============================================
// Command Arguments
// ============================================

/// Arguments shared by the symbol and text searches
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search pattern
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Repository catalog (TOML or JSON)
    #[arg(long, env = "SEMFORA_SEARCH_CATALOG")]
    pub catalog: PathBuf,

    /// Repositories to search as NAME[@REV] (default: every repository)
    #[arg(short, long = "repo", value_name = "NAME[@REV]")]
    pub repos: Vec<String>,

    /// Maximum number of file matches
    #[arg(long, default_value = "30")]
    pub limit: usize,

    /// Treat the pattern as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Match case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Only search paths matching this regex (repeatable, all must match)
    #[arg(long = "include", value_name = "RE")]
    pub include: Vec<String>,

    /// Skip paths matching this regex
    #[arg(long, value_name = "RE")]
    pub exclude: Option<String>,
}

impl SearchArgs {
    /// Pattern description handed to the backends
    pub fn pattern_info(&self) -> PatternInfo {
        PatternInfo {
            pattern: self.pattern.clone(),
            is_regex: self.regex,
            is_case_sensitive: self.case_sensitive,
            include_patterns: self.include.clone(),
            exclude_pattern: self.exclude.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Repository catalog (TOML or JSON)
    #[arg(long, env = "SEMFORA_SEARCH_CATALOG")]
    pub catalog: PathBuf,

    /// Repository as NAME[@REV]
    #[arg(short, long = "repo", value_name = "NAME[@REV]")]
    pub repo: String,

    /// Case-insensitive substring matched against symbol names
    #[arg(short, long)]
    pub query: Option<String>,

    /// Page size
    #[arg(long)]
    pub first: Option<i32>,

    /// Only list symbols in paths matching this regex (repeatable)
    #[arg(long = "include", value_name = "RE")]
    pub include: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SuggestArgs {
    /// Search pattern
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Repository catalog (TOML or JSON)
    #[arg(long, env = "SEMFORA_SEARCH_CATALOG")]
    pub catalog: PathBuf,

    /// Number of suggestions
    #[arg(long)]
    pub first: Option<i32>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default for terminal)
    #[default]
    #[value(alias = "pretty")]
    Text,
    /// JSON - standard JSON output for machine parsing
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_command() {
        let cli = Cli::try_parse_from([
            "semfora-search",
            "--format",
            "json",
            "symbols",
            "Widget",
            "--catalog",
            "catalog.toml",
            "--repo",
            "github.com/acme/widgets@v2",
            "--repo",
            "github.com/acme/tools",
            "--limit",
            "5",
            "--regex",
            "--include",
            "\\.go$",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Symbols(args) = cli.command else {
            panic!("expected symbols command");
        };
        assert_eq!(args.repos.len(), 2);
        assert_eq!(args.limit, 5);
        let info = args.pattern_info();
        assert!(info.is_regex);
        assert!(!info.is_case_sensitive);
        assert_eq!(info.include_patterns, vec!["\\.go$".to_string()]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "semfora-search",
            "suggest",
            "run",
            "--catalog",
            "c.json",
            "--verbose",
            "--first",
            "3",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Suggest(ref a) if a.first == Some(3)));
    }

    #[test]
    fn test_list_requires_repo() {
        assert!(Cli::try_parse_from(["semfora-search", "list", "--catalog", "c.toml"]).is_err());
    }
}
