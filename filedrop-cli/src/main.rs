//! FileDrop CLI
//!
//! Command-line interface for the FileDrop registry: run the API server or
//! drive the service directly against the on-disk log and snapshot.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use filedrop_api::{ApiConfig, ApiServer};
use filedrop_core::types::{FileEntry, MatchMode, PatternMode, SubscriberId};
use filedrop_search::{FileDrop, InvalidPatternPolicy, PaginationCursor, SearchEngine};

/// FileDrop - regex-searchable file registry with subscription announcements
#[derive(Parser)]
#[command(name = "filedrop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    storage: StorageArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the environment configuration.
#[derive(Args)]
struct StorageArgs {
    /// File log path (overrides FILEDROP_FILES)
    #[arg(long, global = true)]
    files: Option<PathBuf>,

    /// Subscription snapshot path (overrides FILEDROP_SUBSCRIPTIONS)
    #[arg(long, global = true)]
    subscriptions: Option<PathBuf>,

    /// Additional sender allowed to register files (repeatable)
    #[arg(long = "source", global = true, allow_negative_numbers = true)]
    sources: Vec<SubscriberId>,

    /// Stop a broadcast at the first invalid stored filter
    #[arg(long, global = true)]
    strict_broadcast: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Register a file and list the chats it would be announced to
    Add {
        /// Sending chat (must be a source or admin)
        #[arg(long, allow_negative_numbers = true)]
        sender: SubscriberId,
        /// Opaque file identifier
        file_id: String,
        /// File name
        name: String,
    },

    /// Fetch the first file matching a pattern
    Get {
        /// Pattern
        query: String,
    },

    /// List file names matching a pattern
    Search {
        /// Pattern
        query: String,
        /// Apply the group-chat result cap
        #[arg(long)]
        group: bool,
    },

    /// Print one page of inline-query results as JSON
    Inline {
        /// Pattern
        query: String,
        /// Offset token
        #[arg(long)]
        offset: Option<String>,
        /// Inline query id to echo
        #[arg(long, default_value = "cli")]
        query_id: String,
    },

    /// Set a chat's announcement filter ("off" clears it)
    Subscribe {
        /// Chat id
        #[arg(allow_negative_numbers = true)]
        chat: SubscriberId,
        /// Pattern, or "off"
        pattern: String,
    },

    /// Show a chat's announcement filter
    Subscription {
        /// Chat id
        #[arg(allow_negative_numbers = true)]
        chat: SubscriberId,
    },

    /// Show registry statistics
    Stats,

    /// Run benchmarks
    Bench {
        /// Number of file names to generate
        #[arg(short, long, default_value = "10000")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "filedrop=debug,info"
    } else {
        "filedrop=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(&cli.storage)?;

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(config, port, &bind).await,
        Commands::Add { sender, file_id, name } => {
            cmd_add(&open(&config).await?, sender, &file_id, &name).await
        }
        Commands::Get { query } => cmd_get(&open(&config).await?, &query),
        Commands::Search { query, group } => cmd_search(&open(&config).await?, &query, !group),
        Commands::Inline { query, offset, query_id } => {
            cmd_inline(&open(&config).await?, &query_id, &query, offset.as_deref())
        }
        Commands::Subscribe { chat, pattern } => {
            cmd_subscribe(&open(&config).await?, chat, &pattern).await
        }
        Commands::Subscription { chat } => cmd_subscription(&open(&config).await?, chat),
        Commands::Stats => cmd_stats(&open(&config).await?),
        Commands::Bench { count } => cmd_bench(count),
    }
}

/// Environment configuration with command-line overrides applied.
fn load_config(args: &StorageArgs) -> Result<ApiConfig> {
    let mut config = ApiConfig::from_env().context("Invalid FILEDROP_* environment")?;

    if let Some(files) = &args.files {
        config.files_path = files.clone();
    }
    if let Some(subscriptions) = &args.subscriptions {
        config.subscriptions_path = subscriptions.clone();
    }
    config.service = config.service.with_sources(args.sources.iter().copied());
    if args.strict_broadcast {
        config.service = config.service.with_policy(InvalidPatternPolicy::Abort);
    }

    debug!(?config, "Configuration loaded");
    Ok(config)
}

async fn open(config: &ApiConfig) -> Result<FileDrop> {
    FileDrop::open(
        &config.files_path,
        &config.subscriptions_path,
        config.service.clone(),
    )
    .await
    .with_context(|| format!("Failed to open file log {}", config.files_path.display()))
}

/// Run API server
async fn cmd_serve(config: ApiConfig, port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting FileDrop API server...".cyan().bold());
    println!("   {} {}", "File log:".dimmed(), config.files_path.display());
    println!("   {} {}", "Subscriptions:".dimmed(), config.subscriptions_path.display());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::from_config(config)
        .await
        .context("Failed to open registries")?;

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    server.run(addr).await?;

    Ok(())
}

/// Register a file
async fn cmd_add(service: &FileDrop, sender: SubscriberId, file_id: &str, name: &str) -> Result<()> {
    let registration = service
        .register(sender, file_id, name)
        .await
        .context("Failed to register file")?;

    println!("{} {}", "✅ Registered:".green().bold(), registration.entry.name);
    println!("   {} {}", "File id:".dimmed(), registration.entry.id);

    if registration.notify.is_empty() {
        println!("   {}", "No subscriber matches.".dimmed());
    } else {
        println!("   {} {}", "Announce to:".yellow(), registration.notify.len());
        for chat in &registration.notify {
            println!("      {}", chat);
        }
    }

    Ok(())
}

/// Look up one file
fn cmd_get(service: &FileDrop, query: &str) -> Result<()> {
    match service.lookup(query) {
        Some(entry) => {
            println!("{} {}", "📄".green(), entry.name);
            println!("   {} {}", "File id:".dimmed(), entry.id);
        }
        None => println!("{}", "File not found.".yellow()),
    }
    Ok(())
}

/// Search file names
fn cmd_search(service: &FileDrop, query: &str, is_private: bool) -> Result<()> {
    match service.search(query, is_private) {
        Ok(names) if names.is_empty() => println!("{}", "No files found.".yellow()),
        Ok(names) => println!("{}", filedrop_search::render_listing(&names)),
        Err(e) if e.is_user_facing() => println!("{} {}", "❌".red(), e),
        Err(e) => return Err(e).context("Search failed"),
    }
    Ok(())
}

/// Answer an inline query
fn cmd_inline(service: &FileDrop, query_id: &str, query: &str, offset: Option<&str>) -> Result<()> {
    let answer = service
        .inline(query_id, query, offset)
        .context("Inline query failed")?;
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}

/// Set or clear an announcement filter
async fn cmd_subscribe(service: &FileDrop, chat: SubscriberId, pattern: &str) -> Result<()> {
    let reply = service
        .set_subscription(chat, pattern)
        .await
        .context("Failed to update subscription")?;
    println!("{}", reply);
    Ok(())
}

/// Show an announcement filter
fn cmd_subscription(service: &FileDrop, chat: SubscriberId) -> Result<()> {
    match service.subscription(chat) {
        Some(pattern) => println!("{}", pattern),
        None => println!("{}", "Not subscribed.".yellow()),
    }
    Ok(())
}

/// Print statistics
fn cmd_stats(service: &FileDrop) -> Result<()> {
    let stats = service.stats();

    println!("{}", "📊 FileDrop statistics".cyan().bold());
    println!("   {} {}", "Files:".green(), stats.files.total_files);
    println!("   {} {}", "Log records:".dimmed(), stats.files.log_records);
    if stats.files.malformed_records > 0 {
        println!("   {} {}", "Malformed records:".red(), stats.files.malformed_records);
    }
    println!("   {} {}", "Subscribers:".green(), stats.subscribers);

    Ok(())
}

/// Run benchmarks
fn cmd_bench(count: usize) -> Result<()> {
    println!("{} {} file names", "📊 Benchmarking with".cyan().bold(), count);

    // Generate names
    println!("\n{}", "1. Generating registry...".dimmed());
    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let extensions = ["pdf", "png", "txt", "zip"];
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        entries.push(FileEntry::new(
            format!("BQAD{:08}", i),
            format!("release-{:06}.{}", i, extensions[i % extensions.len()]),
        ));
        pb.inc(1);
    }
    pb.finish();

    // Full scan
    println!("\n{}", "2. Searching...".dimmed());
    let engine = SearchEngine::new();
    let rare = filedrop_pattern::compile("999999", PatternMode::Search)?;
    let start = Instant::now();
    let found = engine.search(&entries, &rare, count.max(1), MatchMode::Substring);
    let scan_time = start.elapsed();
    println!("   ✓ Full scan of {} names: {:?} ({} hits)", count, scan_time, found.len());

    // Pagination
    println!("\n{}", "3. Paginating...".dimmed());
    let cursor = PaginationCursor::default();
    let all = filedrop_pattern::compile("release", PatternMode::Search)?;
    let pages = (count / cursor.page_size()).min(50) as u64;
    let start = Instant::now();
    let mut served = 0usize;
    for offset in 0..pages {
        served += cursor.window(&entries, &all, offset)?.items.len();
    }
    let page_time = start.elapsed();
    println!("   ✓ Served {} pages ({} results): {:?}", pages, served, page_time);

    let rate = count as f64 / scan_time.as_secs_f64();

    println!("\n{}", "📈 Results:".green().bold());
    println!("   Scan rate: {:.0} names/sec", rate);
    if pages > 0 {
        println!("   Time per page: {:.2}µs", page_time.as_micros() as f64 / pages as f64);
    }

    Ok(())
}
