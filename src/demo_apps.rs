use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::catalog::{Product, ProductCatalog};
use crate::config::TraceConfig;
use crate::history::{FileHistoryBackend, ScanHistory, ScanRecord};
use crate::scan::{ScanOutcome, ScanRequest, ScanService};
use crate::trace::TraceGenerator;

#[derive(Debug, Parser)]
#[command(
    name = "trace_demo",
    disable_help_subcommand = true,
    about = "Simulate product scans and print supply-chain traces",
    long_about = "Browse the eel catalog, simulate a QR scan, print the generated trace chain and stats, and keep a persisted scan history.",
    after_help = "Defaults come from UNAGI_TRACE_SEED, UNAGI_TRACE_HISTORY_CAPACITY and UNAGI_TRACE_HISTORY_DIR when set."
)]
/// CLI for `trace_demo`.
///
/// Common usage:
/// - Random scan: `trace_demo`
/// - Scan a product: `trace_demo --product FISH001`
/// - Scan a QR payload: `trace_demo --qr TRACE-FISH003-2025`
/// - Browse: `trace_demo --category fresh` or `trace_demo --search kabayaki`
struct TraceDemoCli {
    #[arg(long, value_name = "ID", conflicts_with = "qr", help = "Product id to trace")]
    product: Option<String>,
    #[arg(long, value_name = "PAYLOAD", help = "QR payload to decode and trace")]
    qr: Option<String>,
    #[arg(long, help = "Optional deterministic seed override")]
    seed: Option<u64>,
    #[arg(
        long = "history-dir",
        value_name = "DIR",
        help = "Optional directory for the persisted scan history file"
    )]
    history_dir: Option<PathBuf>,
    #[arg(
        long,
        value_name = "TAG",
        help = "List products in a category (`all` lists everything) and exit"
    )]
    category: Option<String>,
    #[arg(long, value_name = "KEYWORD", help = "Search products and exit")]
    search: Option<String>,
    #[arg(long = "list-history", help = "Print the scan history and exit")]
    list_history: bool,
    #[arg(long = "clear-history", help = "Clear the scan history and exit")]
    clear_history: bool,
    #[arg(long, help = "Print the scan outcome as JSON")]
    json: bool,
}

/// Parse `args_iter` (without the program name) and run one demo action.
pub fn run_trace_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<TraceDemoCli, _>(std::iter::once("trace_demo".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = TraceConfig::from_env()?;
    config.seed = cli.seed.or(config.seed);
    if let Some(dir) = cli.history_dir {
        config.history_dir = dir;
    }
    let config = config.validated()?;

    let catalog = ProductCatalog::builtin();

    if let Some(tag) = cli.category.as_deref() {
        print_products(&format!("Category '{tag}'"), &catalog.filter_by_category(tag));
        return Ok(());
    }
    if let Some(keyword) = cli.search.as_deref() {
        print_products(&format!("Search '{keyword}'"), &catalog.search(keyword));
        return Ok(());
    }

    let backend = FileHistoryBackend::open(&config.history_dir)?;
    println!("Persisting scan history to {}", backend.path().display());
    let history = ScanHistory::with_capacity(backend, config.history_capacity)?;

    if cli.clear_history {
        history.clear();
        println!("Scan history cleared.");
        return Ok(());
    }
    if cli.list_history {
        print_history(&history.list());
        return Ok(());
    }

    let request = match (cli.product, cli.qr) {
        (Some(id), _) => ScanRequest::ProductId(id),
        (None, Some(payload)) => ScanRequest::QrPayload(payload),
        (None, None) => ScanRequest::Random,
    };

    let tracer = TraceGenerator::new(config.random_source());
    let mut service =
        ScanService::new(&catalog, &tracer, history, config.scan_random_source());
    let outcome = service.scan(request);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn print_products(title: &str, products: &[&Product]) {
    println!("=== {title}: {} product(s) ===", products.len());
    for product in products {
        println!(
            "{:<8} {:<32} ¥{:>7.2}  stock {:>4}  [{}]",
            product.id, product.name, product.price, product.stock, product.category
        );
    }
}

fn print_history(records: &[ScanRecord]) {
    if records.is_empty() {
        println!("No scan history yet.");
        return;
    }
    println!("=== {} scan record(s) ===", records.len());
    for record in records {
        println!(
            "{}  {:<8} {}  ({})",
            record.scan_time.format("%Y-%m-%d %H:%M:%S"),
            record.product_id,
            record.product_name,
            record.origin
        );
    }
}

fn print_outcome(outcome: &ScanOutcome) {
    let product = &outcome.product;
    if outcome.substituted {
        println!("(scan not recognized, showing a random product)");
    }
    println!("=== {} [{}] ===", product.name, product.id);
    println!("origin:   {}", product.origin);
    println!("producer: {}", product.producer);
    println!();
    for node in outcome.chain.nodes() {
        println!(
            "{} {:<11} {}  {}  [{}]",
            node.icon,
            node.category.as_str(),
            node.time_display(),
            node.name,
            node.status
        );
        println!("    {}", node.address);
        for (label, value) in &node.details {
            println!("    - {label}: {value}");
        }
    }
    println!();
    let stats = &outcome.stats;
    println!("nodes:              {}", stats.total_nodes);
    println!(
        "all passed:         {}",
        if stats.all_passed { "yes" } else { "no" }
    );
    println!("last update:        {}", stats.last_update);
    println!("transport duration: {}", stats.transport_duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_scan_options() {
        let cli = TraceDemoCli::try_parse_from([
            "trace_demo",
            "--qr",
            "TRACE-FISH001-2025",
            "--seed",
            "7",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.qr.as_deref(), Some("TRACE-FISH001-2025"));
        assert_eq!(cli.seed, Some(7));
        assert!(cli.json);
        assert!(cli.product.is_none());
    }

    #[test]
    fn cli_rejects_product_with_qr() {
        let result = TraceDemoCli::try_parse_from([
            "trace_demo",
            "--product",
            "FISH001",
            "--qr",
            "TRACE-FISH001-2025",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn help_is_not_an_error() {
        let parsed = parse_cli::<TraceDemoCli, _>(["trace_demo", "--help"]).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn demo_scan_writes_history() {
        let dir = tempfile::tempdir().unwrap();
        let dir_arg = dir.path().to_string_lossy().to_string();
        let args = ["--product", "FISH002", "--seed", "3", "--history-dir", dir_arg.as_str()];
        run_trace_demo(args.iter().map(|arg| arg.to_string())).unwrap();

        let backend = FileHistoryBackend::open(dir.path()).unwrap();
        let records = ScanHistory::new(backend).list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_id, "FISH002");
    }
}
