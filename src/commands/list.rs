//! Symbol listing command handler

use crate::backend::RevisionResolver;
use crate::cli::{ListArgs, OutputFormat};
use crate::commands::{open_catalog, to_json, CommandContext, CommandOutput};
use crate::compute::compute_symbols;
use crate::error::{Result, SearchError};
use crate::repo::RepositoryRevisions;

/// Run the `list` command
pub async fn run_list(args: &ListArgs, ctx: &CommandContext) -> Result<CommandOutput> {
    let catalog = open_catalog(&args.catalog)?;
    let (name, rev) = RepositoryRevisions::parse_selector(&args.repo);
    let repo = catalog
        .repo_by_name(name)
        .ok_or_else(|| SearchError::RepoNotFound {
            repo: name.to_string(),
        })?;

    let page_size = i32::try_from(ctx.config.default_page_size).unwrap_or(i32::MAX);
    let commit = catalog.resolve_revision(&repo, rev.as_str()).await?;
    tracing::debug!("Listing symbols of {} at {}", repo, commit);

    let connection = compute_symbols(
        &*catalog,
        &repo,
        &commit,
        args.query.as_deref(),
        Some(args.first.unwrap_or(page_size)),
        &args.include,
        ctx.config.per_repo_timeout,
    )
    .await?;

    let text = match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "_type": "symbol_list",
            "repo": repo,
            "commit": commit,
            "symbols": connection,
        }))?,
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("{} @ {}\n\n", repo.name, commit));
            for symbol in connection.nodes() {
                output.push_str(&format!(
                    "{:<12} {}  {}:{}\n",
                    symbol.kind.as_str(),
                    symbol.name,
                    symbol.path,
                    symbol.range.start.line + 1
                ));
            }
            if connection.has_next_page() {
                output.push_str("\n(more symbols available)\n");
            }
            output
        }
    };

    Ok(text.into())
}
