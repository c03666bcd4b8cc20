//! Suggestion command handler

use crate::cli::{OutputFormat, SuggestArgs};
use crate::commands::{catalog_orchestrator, open_catalog, to_json, CommandContext, CommandOutput};
use crate::error::Result;
use crate::pagination::limit_or;
use crate::suggestion::symbol_suggestions;
use crate::PatternInfo;

/// Run the `suggest` command over every repository in the catalog
pub async fn run_suggest(args: &SuggestArgs, ctx: &CommandContext) -> Result<CommandOutput> {
    let catalog = open_catalog(&args.catalog)?;
    let repos = catalog.select(&[])?;
    let orchestrator = catalog_orchestrator(&catalog, &ctx.config);

    let page_size = limit_or(args.first, ctx.config.default_page_size);
    let outcome = orchestrator
        .search_symbols(
            &ctx.token,
            &repos,
            &PatternInfo::new(args.pattern.clone()),
            page_size.max(ctx.config.default_page_size),
        )
        .await;

    let page = symbol_suggestions(&outcome.results, args.first, ctx.config.default_page_size);

    let text = match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "_type": "suggestions",
            "pattern": args.pattern,
            "suggestions": page,
            "error": outcome.error.as_ref().map(|e| e.to_string()),
        }))?,
        OutputFormat::Text => {
            let mut output = String::new();
            for suggestion in &page.items {
                output.push_str(&format!(
                    "{:>3}  {} ({})  {}\n",
                    suggestion.score,
                    suggestion.label,
                    suggestion.symbol.kind.as_str(),
                    suggestion.uri
                ));
            }
            if page.items.is_empty() {
                output.push_str("No suggestions.\n");
            }
            output
        }
    };

    Ok(CommandOutput {
        text,
        error: outcome.error,
    })
}
