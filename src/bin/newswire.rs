//! CLI binary for newswire.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, bail};
use chrono::{DateTime, Local, Utc};
use clap::{Args, Parser, Subcommand};
use newswire::config::CredentialSource;
use newswire::digest::render_digest;
use newswire::{NewsSession, NewswireConfig, SearchSummary};
use newswire_search::types::parse_date_bound;
use newswire_search::{Article, Marker, ProviderId, SearchOptions, SortBy, highlight_article};
use serde::Serialize;

const ANSI_BOLD: Marker<'static> = Marker {
    open: "\x1b[1m",
    close: "\x1b[0m",
};

/// newswire: search several news APIs at once.
#[derive(Parser)]
#[command(name = "newswire", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search the configured providers and print the merged stories.
    Search(SearchArgs),

    /// List providers and where their API keys come from.
    Providers,

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file path.
    Path,
}

#[derive(Args)]
struct SearchArgs {
    /// Search terms. Leave empty for top headlines; wrap in quotes for an exact phrase.
    query: Vec<String>,

    /// Comma-separated provider ids (newsapi, gnews, thenewsapi, newsdata, marketaux).
    #[arg(short, long, value_delimiter = ',', value_parser = parse_provider)]
    providers: Vec<ProviderId>,

    /// relevancy, popularity or publishedAt.
    #[arg(short, long, value_parser = parse_sort)]
    sort_by: Option<SortBy>,

    /// Two-letter language code.
    #[arg(short, long)]
    language: Option<String>,

    /// Country code or comma-separated list.
    #[arg(long)]
    country: Option<String>,

    /// Topic category for headlines.
    #[arg(long)]
    category: Option<String>,

    /// Results per provider per page.
    #[arg(long)]
    page_size: Option<u32>,

    /// Oldest publish date (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_date)]
    from: Option<DateTime<Utc>>,

    /// Newest publish date (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_date)]
    to: Option<DateTime<Utc>>,

    /// Restrict to these domains (comma-separated).
    #[arg(long)]
    domains: Option<String>,

    /// Exclude these domains (comma-separated).
    #[arg(long)]
    exclude_domains: Option<String>,

    /// Fields to match: any of title, description, content (comma-separated).
    #[arg(long)]
    search_in: Option<String>,

    /// Pages to fetch; every page after the first is a "load more".
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Print at most this many stories.
    #[arg(long)]
    limit: Option<usize>,

    /// Print a plain-text digest instead of the story list.
    #[arg(long, conflicts_with = "json")]
    digest: bool,

    /// Print JSON.
    #[arg(long)]
    json: bool,
}

fn parse_provider(s: &str) -> Result<ProviderId, String> {
    ProviderId::from_str(s).map_err(|e| e.message().to_string())
}

fn parse_sort(s: &str) -> Result<SortBy, String> {
    SortBy::from_str(s).map_err(|e| e.message().to_string())
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    parse_date_bound(s).map_err(|e| e.message().to_string())
}

impl SearchArgs {
    fn query(&self) -> String {
        self.query.join(" ")
    }

    /// Command-line filters layered over the config defaults.
    fn options(&self, base: SearchOptions) -> SearchOptions {
        SearchOptions {
            language: self.language.clone().or(base.language),
            country: self.country.clone().or(base.country),
            category: self.category.clone().or(base.category),
            sort_by: self.sort_by.or(base.sort_by),
            page_size: self.page_size.or(base.page_size),
            from: self.from.or(base.from),
            to: self.to.or(base.to),
            domains: self.domains.clone().or(base.domains),
            exclude_domains: self.exclude_domains.clone().or(base.exclude_domains),
            search_in: self.search_in.clone().or(base.search_in),
            ..base
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(NewswireConfig::default_config_path);
    let config = NewswireConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let _log_guard = newswire::logging::init(&config.logging)?;

    match cli.command {
        Command::Search(args) => run_search(&config, args).await,
        Command::Providers => {
            list_providers(&config);
            Ok(())
        }
        Command::Config { action } => run_config(&config_path, action),
    }
}

async fn run_search(config: &NewswireConfig, args: SearchArgs) -> anyhow::Result<()> {
    let mut session = NewsSession::from_config(config)?;
    if !args.providers.is_empty() {
        session = session.with_providers(args.providers.clone());
    }
    if session.providers().is_empty() {
        bail!("no providers enabled; pass --providers or edit [search] providers in the config");
    }

    let query = args.query();
    let options = args.options(config.default_options());

    let mut summary = session.search(&query, options).await?;
    report_failures(&summary);

    for _ in 1..args.pages.max(1) {
        if summary.exhausted {
            break;
        }
        summary = session.load_more().await?;
        report_failures(&summary);
        if summary.exhausted {
            eprintln!("No more stories.");
        }
    }

    let shown = match args.limit {
        Some(limit) => &summary.articles[..limit.min(summary.articles.len())],
        None => &summary.articles[..],
    };

    if args.json {
        print_json(&summary, shown)?;
    } else if args.digest {
        println!("{}", render_digest(shown, &query, &Local::now()));
    } else {
        print_stories(shown, &query);
        print_totals(&summary);
    }
    Ok(())
}

fn report_failures(summary: &SearchSummary) {
    for (provider, error) in &summary.failures {
        eprintln!("warning: {} failed: {error}", provider.display_name());
    }
}

fn print_stories(articles: &[Article], query: &str) {
    if articles.is_empty() {
        println!("No stories found.");
        return;
    }
    let marker = if std::io::stdout().is_terminal() {
        ANSI_BOLD
    } else {
        Marker { open: "", close: "" }
    };

    for (index, article) in articles.iter().enumerate() {
        let marked = highlight_article(article, query, marker);
        println!("{:>3}. {}", index + 1, marked.title);
        println!(
            "     {} | {} | {}",
            article.source.name,
            article.published_at,
            article.link().unwrap_or("(no link)")
        );
        if let Some(description) = marked.description.filter(|d| !d.trim().is_empty()) {
            println!("     {description}");
        }
        if let Some(snippet) = marked.snippet {
            println!("     {snippet}");
        }
        println!();
    }
}

fn print_totals(summary: &SearchSummary) {
    let totals: Vec<String> = summary
        .totals
        .iter()
        .map(|(provider, total)| match total {
            Some(n) => format!("{}: {n}", provider.display_name()),
            None => format!("{}: ?", provider.display_name()),
        })
        .collect();
    println!(
        "{} stories (page {}). Reported totals: {}",
        summary.articles.len(),
        summary.page,
        totals.join(", ")
    );
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFailure<'a> {
    provider: ProviderId,
    code: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    query: &'a str,
    page: u32,
    total_results: Vec<(ProviderId, Option<u64>)>,
    failures: Vec<JsonFailure<'a>>,
    articles: &'a [Article],
}

fn print_json(summary: &SearchSummary, articles: &[Article]) -> anyhow::Result<()> {
    let report = JsonReport {
        query: &summary.query,
        page: summary.page,
        total_results: summary.totals.clone(),
        failures: summary
            .failures
            .iter()
            .map(|(provider, error)| JsonFailure {
                provider: *provider,
                code: error.code(),
                message: error.message(),
            })
            .collect(),
        articles,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn list_providers(config: &NewswireConfig) {
    let defaults = config.enabled_providers();
    println!("{:<12} {:<12} {:<14} DEFAULT", "ID", "NAME", "API KEY");
    for &id in ProviderId::all() {
        let key = config.credential_source(id);
        let default = if defaults.contains(&id) { "yes" } else { "no" };
        println!("{:<12} {:<12} {:<14} {default}", id.id(), id.display_name(), key.to_string());
        if key == CredentialSource::Missing {
            tracing::debug!(provider = %id, env = %newswire::config::api_key_env_var(id), "no credential");
        }
    }
}

fn run_config(path: &Path, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", path.display());
            }
            NewswireConfig::initial().save_to_file(path)?;
            println!("Wrote {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
