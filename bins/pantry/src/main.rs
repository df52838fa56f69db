//! pantry: search a product catalog from the terminal.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pantry_cli::output::{self, Status};
use pantry_search::{
    parse_catalog, CatalogItem, FileStore, FilterOp, FilterState, KeyValueStore, PriceRange,
    ResultSink, SearchConfig, SearchEngine, SearchHistory, SearchResults, SortMode, Suggestion,
};
use pantry_telemetry::{MetricsAnalytics, TelemetryConfig, Timer};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "pantry")]
#[command(about = "Typo-tolerant catalog search")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Search configuration file (defaults to pantry.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for persisted history
    #[arg(long, global = true, env = "PANTRY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Also write JSON logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and print the results
    Search {
        /// Catalog file (JSON array of items)
        #[arg(short, long)]
        catalog: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Query text; omit to browse the catalog
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Search as you type; one line per keystroke burst
    Interactive {
        /// Catalog file (JSON array of items)
        #[arg(short, long)]
        catalog: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Print collected metrics on exit
        #[arg(long)]
        metrics: bool,
    },

    /// Show or clear remembered queries
    History {
        /// Forget all remembered queries
        #[arg(long)]
        clear: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Only these categories (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Items with any of these tags (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    #[arg(long)]
    min_price: Option<f64>,

    #[arg(long)]
    max_price: Option<f64>,

    /// Only items in stock
    #[arg(long, conflicts_with = "out_of_stock")]
    in_stock: bool,

    /// Only sold-out items
    #[arg(long)]
    out_of_stock: bool,

    #[arg(long)]
    min_rating: Option<f64>,

    /// relevance, price-asc, price-desc, name, newest or rating
    #[arg(long, default_value_t = SortMode::Relevance)]
    sort: SortMode,
}

impl FilterArgs {
    fn into_filter_state(self) -> FilterState {
        let mut state = FilterState::default();
        for category in self.categories {
            state.apply(FilterOp::Category(category));
        }
        for tag in self.tags {
            state.apply(FilterOp::Tag(tag));
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let defaults = PriceRange::default();
            state.apply(FilterOp::Price(PriceRange::new(
                self.min_price.unwrap_or(defaults.min),
                self.max_price.unwrap_or(defaults.max),
            )));
        }
        if self.in_stock || self.out_of_stock {
            state.apply(FilterOp::InStock(Some(self.in_stock)));
        }
        if let Some(min) = self.min_rating {
            state.apply(FilterOp::Rating(min));
        }
        state.apply(FilterOp::Sort(self.sort));
        state
    }
}

/// Prints each completed execution as it is emitted.
struct TerminalSink;

impl ResultSink for TerminalSink {
    fn on_results(&mut self, results: &SearchResults) {
        output::print_results(results);
    }

    fn on_suggestions(&mut self, suggestions: &[Suggestion]) {
        output::print_suggestions(suggestions);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _telemetry = pantry_telemetry::init_with_config(TelemetryConfig {
        log_dir: cli.log_dir.clone(),
        ..TelemetryConfig::default().with_verbosity(cli.verbose)
    })?;

    let config = SearchConfig::load(cli.config.as_deref()).context("Failed to load search config")?;

    match cli.command {
        Commands::Search { catalog, filters, json, query } => {
            let query = query.join(" ");
            let mut engine = build_engine(config, cli.data_dir.as_deref(), &catalog)?
                .with_filters(filters.into_filter_state());
            let outcome = engine.search_now(&query);

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                output::print_outcome(&outcome);
            }
        }

        Commands::Interactive { catalog, filters, metrics } => {
            let engine = build_engine(config, cli.data_dir.as_deref(), &catalog)?
                .with_filters(filters.into_filter_state())
                .with_result_sink(Box::new(TerminalSink));

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(interactive(engine))?;

            if metrics {
                println!("{}", serde_json::to_string_pretty(&pantry_telemetry::metrics().export_json())?);
            }
        }

        Commands::History { clear, json } => {
            let mut history = open_history(&config, cli.data_dir.as_deref());
            if clear {
                history.clear();
                Status::success("Search history cleared");
            } else if json {
                println!("{}", serde_json::to_string_pretty(history.list())?);
            } else if history.is_empty() {
                Status::info("No searches yet");
            } else {
                Status::header("Recent searches");
                for (i, query) in history.list().iter().enumerate() {
                    println!("{:>3}. {}", i + 1, query);
                }
            }
        }
    }

    Ok(())
}

fn load_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    let timer = Timer::start("catalog.load");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let items = parse_catalog(&content)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
    let elapsed = timer.stop();

    pantry_telemetry::metrics().gauge("catalog.items", items.len() as u64);
    tracing::info!(items = items.len(), elapsed = %output::format_duration(elapsed), "Catalog loaded");
    Ok(items)
}

fn open_history(config: &SearchConfig, data_dir: Option<&Path>) -> SearchHistory {
    let dir = data_dir.map_or_else(FileStore::default_dir, Path::to_path_buf);
    let store: Option<Box<dyn KeyValueStore>> = match FileStore::open(&dir) {
        Ok(store) => {
            tracing::debug!(dir = %store.dir().display(), "History store opened");
            Some(Box::new(store))
        }
        Err(e) => {
            Status::warning(&format!("History disabled: {e}"));
            None
        }
    };
    SearchHistory::from_config(config, store)
}

fn build_engine(config: SearchConfig, data_dir: Option<&Path>, catalog: &Path) -> Result<SearchEngine> {
    let items = load_catalog(catalog)?;
    let history = open_history(&config, data_dir);
    Ok(SearchEngine::new(config)
        .with_history(history)
        .with_catalog(items)
        .with_analytics(Box::new(MetricsAnalytics::new())))
}

async fn interactive(mut engine: SearchEngine) -> Result<()> {
    Status::info(
        "Type to search. Commands: :cat NAME, :tag NAME, :price MIN MAX, :stock yes|no|any, \
         :rating N, :sort MODE, :clear, :history [PREFIX|clear], :quit",
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let wait = engine.time_until_due();

        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        Status::error(&format!("Failed to read input: {e}"));
                        break;
                    }
                };
                if !handle_line(&mut engine, &line) {
                    break;
                }
            }
            () = async {
                if let Some(wait) = wait {
                    tokio::time::sleep(wait).await;
                }
            }, if wait.is_some() => {
                engine.poll();
            }
        }
    }

    engine.flush();
    Ok(())
}

/// Returns `false` when the session should end.
fn handle_line(engine: &mut SearchEngine, line: &str) -> bool {
    let Some(command) = line.trim().strip_prefix(':') else {
        engine.submit(line);
        return true;
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    let op = match (name, rest.as_slice()) {
        ("quit" | "q", _) => return false,
        ("clear", _) => {
            engine.clear_filters();
            return true;
        }
        ("history", ["clear"]) => {
            engine.history_mut().clear();
            Status::success("Search history cleared");
            return true;
        }
        ("history", []) => {
            for query in engine.history().list() {
                println!("  {query}");
            }
            return true;
        }
        ("history", partial) => {
            let limit = engine.config().suggestion_limit;
            for query in engine.history().suggest(&partial.join(" "), limit) {
                println!("  {query}");
            }
            return true;
        }
        ("cat", [value, ..]) => Some(FilterOp::Category((*value).to_string())),
        ("tag", [value, ..]) => Some(FilterOp::Tag((*value).to_string())),
        ("price", [min, max]) => match (min.parse(), max.parse()) {
            (Ok(min), Ok(max)) => Some(FilterOp::Price(PriceRange::new(min, max))),
            _ => None,
        },
        ("stock", [value]) => match *value {
            "yes" => Some(FilterOp::InStock(Some(true))),
            "no" => Some(FilterOp::InStock(Some(false))),
            "any" => Some(FilterOp::InStock(None)),
            _ => None,
        },
        ("rating", [value]) => value.parse().ok().map(FilterOp::Rating),
        ("sort", [value]) => value.parse().ok().map(FilterOp::Sort),
        _ => None,
    };

    match op {
        Some(op) => engine.toggle_filter(op),
        None => Status::warning(&format!("Unrecognized command: :{command}")),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_to_state() {
        let args = FilterArgs {
            categories: vec!["sausage".into()],
            min_price: Some(100.0),
            out_of_stock: true,
            sort: SortMode::PriceDesc,
            ..FilterArgs::default()
        };
        let state = args.into_filter_state();

        assert!(state.categories.contains("sausage"));
        assert_eq!(state.price_range, PriceRange::new(100.0, f64::INFINITY));
        assert_eq!(state.in_stock, Some(false));
        assert_eq!(state.sort_mode, SortMode::PriceDesc);
    }

    #[test]
    fn test_handle_line_commands() {
        let mut engine = SearchEngine::new(SearchConfig::default())
            .with_catalog(vec![CatalogItem::new("1", "Tofu").with_category("soy")]);

        assert!(handle_line(&mut engine, "tofu"));
        assert_eq!(engine.current_query(), "tofu");

        assert!(handle_line(&mut engine, ":cat soy"));
        assert!(engine.filters().categories.contains("soy"));

        assert!(handle_line(&mut engine, ":sort price-asc"));
        assert_eq!(engine.filters().sort_mode, SortMode::PriceAsc);

        assert!(handle_line(&mut engine, ":stock no"));
        assert_eq!(engine.filters().in_stock, Some(false));

        engine.flush();
        assert_eq!(engine.history().list(), ["tofu"]);
        assert!(handle_line(&mut engine, ":history tf"));
        assert!(handle_line(&mut engine, ":history clear"));
        assert!(engine.history().is_empty());

        assert!(handle_line(&mut engine, ":bogus"));
        assert!(!handle_line(&mut engine, ":quit"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "pantry", "-vv", "search", "--catalog", "items.json", "--sort", "rating", "--in-stock",
            "spicy", "sausag",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search { query, filters, .. } => {
                assert_eq!(query, vec!["spicy", "sausag"]);
                assert_eq!(filters.sort, SortMode::Rating);
                assert!(filters.in_stock);
            }
            _ => panic!("expected search"),
        }
    }
}
