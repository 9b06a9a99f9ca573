//! Refdata CLI
//!
//! Operator interface for resolving reference data, seeding the store,
//! and running source refreshes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use refdata_cache::{RefDataCache, RefreshReport, RefreshScheduler, SchedulerConfig};
use refdata_core::clock::{Clock, SystemClock};
use refdata_core::provenance::provenance_for;
use refdata_core::traits::CacheStore;
use refdata_core::types::{
    ColaScope, DataFormat, DataRefRequest, FeedHealth, ProviderResult, SourceKey, StoreSnapshot,
    ValueUnit,
};
use refdata_registry::{DataRefRegistry, EngineConfig};
use refdata_store::FileStore;

/// Refdata - time-versioned reference data with a persistent cache
#[derive(Parser)]
#[command(name = "refdata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Snapshot file backing the store
    #[arg(long, global = true, env = "REFDATA_STORE_PATH")]
    store: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one value
    Resolve {
        /// Source key or alias (bah, bas, cola, irs_limits, tricare, mileage)
        #[arg(short, long)]
        source: String,
        /// Location code
        #[arg(long)]
        code: Option<String>,
        /// Paygrade, e.g. E05
        #[arg(long)]
        paygrade: Option<String>,
        /// Member has dependents
        #[arg(long)]
        with_deps: bool,
        /// Reference field name
        #[arg(long)]
        field: Option<String>,
        /// Publication year
        #[arg(long)]
        year: Option<i32>,
        /// Effective date (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// COLA table (domestic or overseas)
        #[arg(long)]
        scope: Option<ColaScope>,
        /// Display format override (money, rate, percent, plain)
        #[arg(long, requires = "unit")]
        format: Option<DataFormat>,
        /// Unit of the raw value under a format override (minor, whole)
        #[arg(long)]
        unit: Option<ValueUnit>,
        /// Bypass the cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Resolve a JSON array of requests
    Batch {
        /// File containing the requests
        file: PathBuf,
    },

    /// Show where each source's data comes from
    Provenance {
        /// Limit to one source
        source: Option<String>,
    },

    /// Calculate a mileage reimbursement
    Reimburse {
        /// Miles driven
        #[arg(short, long)]
        miles: f64,
        /// Rate year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show the health plan cost summary group
    HealthSummary {
        /// Plan year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Purge cached values for a source (or `all`) and stamp its feed row
    Refresh {
        /// Source key or `all`
        target: String,
    },

    /// List feed rows with their current health
    Feeds,

    /// Load a snapshot of backing-table rows into the store
    Import {
        /// Snapshot JSON file
        file: PathBuf,
    },

    /// Refresh every source on a schedule until Ctrl-C
    Watch {
        /// Seconds between refresh cycles
        #[arg(long, default_value = "86400")]
        every: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "refdata=debug,info"
    } else {
        "refdata=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = EngineConfig::from_env().context("Invalid REFDATA_* configuration")?;
    if let Some(path) = cli.store {
        config = config.with_store_path(path);
    }

    let store = Arc::new(
        FileStore::with_auto_save(&config.store_path, config.auto_save_threshold)
            .await
            .with_context(|| format!("Failed to open store at {}", config.store_path.display()))?,
    );
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let result = match cli.command {
        Commands::Resolve {
            source,
            code,
            paygrade,
            with_deps,
            field,
            year,
            as_of,
            scope,
            format,
            unit,
            no_cache,
        } => {
            let mut request = DataRefRequest::new(source);
            request.params.code = code;
            request.params.paygrade = paygrade;
            request.params.with_dependents = Some(with_deps);
            request.params.field = field;
            request.params.year = year;
            request.params.as_of = as_of;
            request.params.cola_scope = scope;
            request.format = format;
            request.value_unit = unit;

            if no_cache {
                config = config.no_cache();
            }
            let registry = DataRefRegistry::from_store(store.clone(), clock, config);
            cmd_resolve(&registry, &request, cli.json).await
        }
        Commands::Batch { file } => {
            let registry = DataRefRegistry::from_store(store.clone(), clock, config);
            cmd_batch(&registry, &file, cli.json).await
        }
        Commands::Provenance { source } => cmd_provenance(source.as_deref(), cli.json),
        Commands::Reimburse { miles, year } => {
            let registry = DataRefRegistry::from_store(store.clone(), clock, config);
            cmd_reimburse(&registry, miles, year, cli.json).await
        }
        Commands::HealthSummary { year } => {
            let registry = DataRefRegistry::from_store(store.clone(), clock, config);
            cmd_health_summary(&registry, year, cli.json).await
        }
        Commands::Refresh { target } => {
            let cache = RefDataCache::new(store.clone(), clock);
            cmd_refresh(&cache, &target, cli.json).await
        }
        Commands::Feeds => cmd_feeds(store.as_ref(), clock.as_ref(), cli.json).await,
        Commands::Import { file } => cmd_import(&store, &file).await,
        Commands::Watch { every } => {
            let cache = Arc::new(RefDataCache::new(store.clone(), clock));
            cmd_watch(cache, every).await
        }
    };

    store.flush().await.context("Failed to save store")?;
    result
}

/// Resolve one request
async fn cmd_resolve(registry: &DataRefRegistry, request: &DataRefRequest, json: bool) -> Result<()> {
    let result = registry.resolve(request).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&request.source, &result);
    }
    Ok(())
}

/// Resolve every request in a JSON file, in order
async fn cmd_batch(registry: &DataRefRegistry, file: &Path, json: bool) -> Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let requests: Vec<DataRefRequest> =
        serde_json::from_str(&contents).context("Batch file must be a JSON array of requests")?;

    let results = registry.resolve_batch(&requests).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{} {} requests", "📋 Batch:".cyan().bold(), requests.len());
    for (i, (request, result)) in requests.iter().zip(&results).enumerate() {
        print_result(&format!("[{i}] {}", request.source), result);
    }
    let failed = results.iter().filter(|r| r.data.is_none()).count();
    if failed > 0 {
        println!(
            "\n{}",
            format!("⚠️  {failed} of {} values need manual entry", results.len())
                .yellow()
                .bold()
        );
    }
    Ok(())
}

/// Show the provenance directory
fn cmd_provenance(source: Option<&str>, json: bool) -> Result<()> {
    let sources = match source {
        Some(s) => vec![s.parse::<SourceKey>()?],
        None => SourceKey::ALL.to_vec(),
    };

    if json {
        let entries: Vec<_> = sources
            .iter()
            .map(|s| serde_json::json!({ "source": s, "provenance": provenance_for(*s) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for source in sources {
        let p = provenance_for(source);
        println!("{}", source.as_str().cyan().bold());
        println!("   {} {}", "Source:".dimmed(), p.source_name);
        println!("   {} {}", "URL:".dimmed(), p.source_url);
        println!("   {} {}", "Updated:".dimmed(), p.update_frequency);
    }
    Ok(())
}

/// Calculate a mileage reimbursement
async fn cmd_reimburse(
    registry: &DataRefRegistry,
    miles: f64,
    year: Option<i32>,
    json: bool,
) -> Result<()> {
    match registry.calculate_reimbursement(miles, year).await {
        Ok(r) if json => println!("{}", serde_json::to_string_pretty(&r)?),
        Ok(r) => {
            println!("{} {}", "🚗 Reimbursement:".green().bold(), r.display_value);
            println!("   {} {}", "Miles:".dimmed(), r.miles);
            println!("   {} ${}/mile", "Rate:".dimmed(), r.rate_per_mile);
            println!("   {} {}", "Rate effective:".dimmed(), r.as_of);
        }
        Err(e) => print_caution("mileage_rate", &e.to_string()),
    }
    Ok(())
}

/// Show the health plan cost summary
async fn cmd_health_summary(registry: &DataRefRegistry, year: Option<i32>, json: bool) -> Result<()> {
    let summary = registry.health_cost_summary(year).await;
    if json {
        let entries: Vec<_> = summary
            .iter()
            .map(|(field, result)| serde_json::json!({ "field": field, "result": result }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for (field, result) in &summary {
        print_result(field, result);
    }
    Ok(())
}

/// Refresh one source or all of them
async fn cmd_refresh(cache: &RefDataCache, target: &str, json: bool) -> Result<()> {
    let sources = if target.eq_ignore_ascii_case("all") {
        SourceKey::ALL.to_vec()
    } else {
        vec![target.parse::<SourceKey>()?]
    };

    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        reports.push(cache.refresh_source_data(source).await);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }
    Ok(())
}

/// List feed rows
async fn cmd_feeds(store: &dyn CacheStore, clock: &dyn Clock, json: bool) -> Result<()> {
    let feeds = store.list_feeds().await.context("Failed to read feeds")?;
    let now = clock.now();

    if json {
        let entries: Vec<_> = feeds
            .iter()
            .map(|f| serde_json::json!({ "feed": f, "effective_health": f.effective_health(now) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if feeds.is_empty() {
        println!("{}", "No feed rows yet; run `refdata refresh all`".dimmed());
        return Ok(());
    }

    for feed in &feeds {
        let last = feed
            .last_refreshed
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".into());
        println!(
            "{:<28} {:<6} {} {}  {} {}s",
            feed.source.as_str(),
            health_label(feed.effective_health(now)),
            "last:".dimmed(),
            last,
            "ttl:".dimmed(),
            feed.ttl_seconds
        );
        if let Some(err) = &feed.last_error {
            println!("   {} {}", "error:".red(), err);
        }
    }
    Ok(())
}

/// Import backing-table rows
async fn cmd_import(store: &FileStore, file: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let snapshot: StoreSnapshot =
        serde_json::from_str(&contents).context("Snapshot file is not valid JSON")?;

    let imported = store.import(snapshot).await.context("Import failed")?;
    println!(
        "{} {} rows into {}",
        "✅ Imported".green().bold(),
        imported,
        store.path().display()
    );
    Ok(())
}

/// Run the refresh scheduler until Ctrl-C
async fn cmd_watch(cache: Arc<RefDataCache>, every: u64) -> Result<()> {
    let scheduler =
        RefreshScheduler::new(cache, SchedulerConfig::with_interval(Duration::from_secs(every.max(1))));
    let handle = scheduler.handle();
    let task = scheduler.spawn();

    println!(
        "{} every {}s (Ctrl-C to stop)",
        "⏱  Refreshing all sources".cyan().bold(),
        every.max(1)
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    handle.stop();
    task.await.context("Scheduler task panicked")?;

    let status = handle.status();
    info!(cycles = status.cycles, "Watch stopped");
    println!(
        "{} {} cycles, {} refreshed, {} failed",
        "Stopped:".yellow().bold(),
        status.cycles,
        status.refreshed,
        status.failed
    );
    Ok(())
}

fn print_result(label: &str, result: &ProviderResult) {
    match &result.data {
        Some(data) => {
            let cached = if result.cached { " (cached)".dimmed().to_string() } else { String::new() };
            println!("{} {}{}", format!("✅ {label}:").green().bold(), data.display_value, cached);
            println!(
                "   {} {}, as of {}",
                "Source:".dimmed(),
                data.source_name,
                data.as_of
            );
        }
        None => print_caution(label, result.error.as_deref().unwrap_or("no value returned")),
    }
}

fn print_caution(label: &str, reason: &str) {
    println!("{} {}", format!("⚠️  {label}:").yellow().bold(), reason);
    println!("   {}", "Value not resolved; enter it manually.".yellow());
}

fn print_report(report: &RefreshReport) {
    match &report.error {
        None => println!(
            "{} {} ({} cached values purged, {} expired dropped)",
            "🔄".green(),
            report.source.as_str().bold(),
            report.purged,
            report.pruned
        ),
        Some(err) => println!(
            "{} {} {}",
            "❌".red(),
            report.source.as_str().bold(),
            err.red()
        ),
    }
}

fn health_label(health: FeedHealth) -> ColoredString {
    match health {
        FeedHealth::Ok => "ok".green(),
        FeedHealth::Stale => "stale".yellow(),
        FeedHealth::Error => "error".red(),
    }
}
