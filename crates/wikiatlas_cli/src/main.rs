//! `wikiatlas` command line front end.
//!
//! # Responsibility
//! - Wire config, logging, gateway, archive and search from the environment.
//! - Expose read-only listing/search plus the garbage cleanup sweep.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::sync::Arc;
use wikiatlas_core::db::ArchiveLocation;
use wikiatlas_core::service::ListingOrigin;
use wikiatlas_core::{
    init_from_config, Article, ArticleService, BackendClient, ClientConfig, GeminiMatcher,
    SearchEngine, SqliteArchiveRepository,
};

#[derive(Parser)]
#[command(name = "wikiatlas")]
#[command(about = "WikiAtlas client tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,

    /// List articles, one page at a time
    List {
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search articles (lexical first, then semantic when configured)
    Search { query: String },

    /// Delete garbage articles from the backend
    Cleanup {
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::List { .. } => "list",
            Self::Search { .. } => "search",
            Self::Cleanup { .. } => "cleanup",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Commands::Ping = cli.command {
        println!("wikiatlas_core ping={}", wikiatlas_core::ping());
        println!("wikiatlas_core version={}", wikiatlas_core::core_version());
        return Ok(());
    }

    let config = ClientConfig::from_env().context("invalid configuration")?;
    init_from_config(&config).context("logging setup failed")?;
    let service = build_service(&config)?;
    info!(
        "event=cli_start module=cli status=ok command={} backend={}",
        cli.command.name(),
        config.api_base_url
    );

    match cli.command {
        Commands::Ping => {}
        Commands::List { page, limit } => {
            let listing = service.list_articles().await;
            if listing.origin != ListingOrigin::Backend {
                eprintln!("backend unreachable; showing {} data", listing.origin.as_str());
            }
            println!("{} articles total", listing.articles.len());
            print_articles(listing.page(page, limit));
        }
        Commands::Search { query } => {
            let hits = service.search(&query).await;
            if hits.is_empty() {
                println!("no matches for \"{query}\"");
            }
            print_articles(&hits);
        }
        Commands::Cleanup { dry_run } => {
            let report = service
                .cleanup_sweep(dry_run)
                .await
                .context("cleanup sweep failed")?;
            let verb = if dry_run { "would delete" } else { "deleted" };
            let affected = if dry_run {
                &report.matched
            } else {
                &report.deleted
            };
            println!("{verb} {} articles", affected.len());
            for id in affected {
                println!("  {id}");
            }
            for id in &report.failed {
                eprintln!("  failed: {id}");
            }
        }
    }
    Ok(())
}

fn build_service(
    config: &ClientConfig,
) -> Result<ArticleService<BackendClient, SqliteArchiveRepository>> {
    let client = BackendClient::from_config(config).context("invalid backend url")?;
    let archive = SqliteArchiveRepository::open(&ArchiveLocation::from_optional_path(
        config.archive_path.as_deref(),
    ))
    .context("cannot open offline archive")?;

    let engine = match GeminiMatcher::from_config(config) {
        Some(matcher) => SearchEngine::with_matcher(Arc::new(matcher)),
        None => SearchEngine::lexical_only(),
    };
    Ok(ArticleService::new(client, archive).with_search_engine(engine))
}

fn print_articles(articles: &[Article]) {
    for article in articles {
        println!(
            "{:<24} {:<12} {:>3} min  {}",
            article.id, article.category, article.reading_time, article.title
        );
    }
}
