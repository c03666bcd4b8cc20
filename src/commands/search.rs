//! Symbol and text search command handlers

use crate::aggregate::ResultAggregate;
use crate::cli::{OutputFormat, SearchArgs};
use crate::commands::{catalog_orchestrator, open_catalog, to_json, CommandContext, CommandOutput};
use crate::error::Result;
use crate::grouper::FileMatch;
use crate::orchestrator::SearchOutcome;
use crate::repo::RepositoryRef;

/// Run the `symbols` command
pub async fn run_symbols(args: &SearchArgs, ctx: &CommandContext) -> Result<CommandOutput> {
    let catalog = open_catalog(&args.catalog)?;
    let repos = catalog.select(&args.repos)?;
    let orchestrator = catalog_orchestrator(&catalog, &ctx.config);

    let outcome = orchestrator
        .search_symbols(&ctx.token, &repos, &args.pattern_info(), args.limit)
        .await;
    render(args, outcome, ctx)
}

/// Run the `text` command
pub async fn run_text(args: &SearchArgs, ctx: &CommandContext) -> Result<CommandOutput> {
    let catalog = open_catalog(&args.catalog)?;
    let repos = catalog.select(&args.repos)?;
    let orchestrator = catalog_orchestrator(&catalog, &ctx.config);

    let outcome = orchestrator
        .search_text(&ctx.token, &repos, &args.pattern_info(), args.limit)
        .await;
    render(args, outcome, ctx)
}

fn render(args: &SearchArgs, outcome: SearchOutcome, ctx: &CommandContext) -> Result<CommandOutput> {
    let text = match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "_type": "search_results",
                "pattern": args.pattern,
                "results": outcome.results,
                "aggregate": outcome.aggregate,
                "error": outcome.error.as_ref().map(|e| e.to_string()),
            });
            to_json(&json)?
        }
        OutputFormat::Text => format_text(args, &outcome.results, &outcome.aggregate),
    };

    Ok(CommandOutput {
        text,
        error: outcome.error,
    })
}

fn format_text(args: &SearchArgs, results: &[FileMatch], aggregate: &ResultAggregate) -> String {
    let mut output = String::new();
    output.push_str(&format!("pattern: \"{}\"\n\n", args.pattern));

    if results.is_empty() {
        output.push_str("No matches.\n");
    }

    for file_match in results {
        let rev = file_match
            .input_rev
            .as_deref()
            .map(|r| format!("@{}", r))
            .unwrap_or_default();
        output.push_str(&format!(
            "{}{}  {}\n",
            file_match.repo.name, rev, file_match.path
        ));
        for symbol in &file_match.symbols {
            let container = symbol
                .container_name
                .as_deref()
                .map(|c| format!(" in {}", c))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {} {}{} ({}:{})\n",
                symbol.kind.as_str(),
                symbol.name,
                container,
                symbol.range.start.line + 1,
                symbol.range.start.character + 1
            ));
        }
        for line in &file_match.line_matches {
            output.push_str(&format!("  {}: {}\n", line.line_number + 1, line.preview.trim_end()));
        }
    }

    output.push('\n');
    output.push_str(&format_summary(results, aggregate));
    output
}

fn names(repos: &[RepositoryRef]) -> String {
    repos
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-paragraph status summary of a search
pub fn format_summary(results: &[FileMatch], aggregate: &ResultAggregate) -> String {
    let mut output = String::new();
    let matches: usize = results.iter().map(FileMatch::match_count).sum();
    output.push_str(&format!(
        "{} matches in {} files | {} of {} repositories searched\n",
        matches,
        results.len(),
        aggregate.searched().len(),
        aggregate.repos().len()
    ));

    for (label, repos) in [
        ("cloning", aggregate.cloning()),
        ("missing", aggregate.missing()),
        ("timed out", aggregate.timed_out()),
    ] {
        if !repos.is_empty() {
            output.push_str(&format!("{}: {}\n", label, names(repos)));
        }
    }
    if !aggregate.partial().is_empty() {
        let partial: Vec<RepositoryRef> = aggregate.partial().iter().cloned().collect();
        output.push_str(&format!("partial results: {}\n", names(&partial)));
    }
    if aggregate.index_unavailable() {
        output.push_str("index unavailable\n");
    }
    if aggregate.limit_hit() {
        output.push_str("limit hit: more results are available\n");
    }
    output
}
