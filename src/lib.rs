//! vega-datasets: typed access to the Vega example datasets.
//!
//! The crate has two independent halves that only share the dataset files:
//! an accessor that fetches a dataset by name and returns JSON, typed
//! delimited-text records or raw text, and an offline catalog builder that
//! describes every dataset file in a Data Package shaped document.
//!
//! # Modules
//!
//! - [`accessor`]: Name -> URL lookup, retrieval and format dispatch
//! - [`record`]: Typed values, per-token type inference and payload readers
//! - [`registry`]: The static dataset name -> URL index
//! - [`overrides`]: Columns kept as opaque text
//! - [`catalog`]: Metadata catalog builder
//! - [`error`]: Error types for vega-datasets operations
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use url::Url;
//! use vega_datasets::accessor::{Datasets, Fetch};
//! use vega_datasets::overrides::FieldOverrides;
//! use vega_datasets::record::Value;
//! use vega_datasets::registry::Registry;
//! use vega_datasets::DatasetError;
//!
//! struct Canned;
//!
//! impl Fetch for Canned {
//!     fn fetch(&self, _url: &Url) -> Result<Vec<u8>, DatasetError> {
//!         Ok(b"zip_code,count\n02134,150\n".to_vec())
//!     }
//! }
//!
//! let registry = Registry::from_entries([(
//!     "zipcodes.csv",
//!     Url::parse("https://example.org/data/zipcodes.csv").unwrap(),
//! )]);
//! let datasets = Datasets::new(
//!     Arc::new(registry),
//!     Arc::new(FieldOverrides::builtin()),
//!     Arc::new(Canned),
//! );
//!
//! let content = datasets.load("zipcodes.csv")?;
//! let records = content.as_records().unwrap();
//! assert_eq!(records[0].get("zip_code"), Some(&Value::String("02134".into())));
//! assert_eq!(records[0].get("count"), Some(&Value::Number(150.0)));
//! # Ok::<(), DatasetError>(())
//! ```

pub mod accessor;
pub mod catalog;
pub mod error;
pub mod overrides;
pub mod record;
pub mod registry;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use accessor::{Content, Datasets};
use overrides::FieldOverrides;
use registry::{Registry, DEFAULT_BASE_URL};

pub use error::DatasetError;

/// The vega-datasets CLI application.
#[derive(Parser)]
#[command(name = "vega-datasets")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug). RUST_LOG wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List registered datasets and their URLs.
    List(RegistrySourceArgs),
    /// Print a dataset's URL without fetching it.
    Url(UrlArgs),
    /// Fetch a dataset and print its parsed content.
    Fetch(FetchArgs),
    /// Print the inferred type and value of each token.
    Infer(InferArgs),
    /// Build a registry JSON file from a dataset directory.
    Registry(BuildRegistryArgs),
    /// Build the metadata catalog for a dataset directory.
    Catalog(CatalogArgs),
}

/// Where the dataset registry comes from.
#[derive(clap::Args)]
struct RegistrySourceArgs {
    /// Registry JSON file mapping dataset names to URLs.
    #[arg(long, env = "VEGA_DATASETS_REGISTRY")]
    registry: Option<PathBuf>,

    /// Dataset directory to index instead of a registry file (takes precedence).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Base URL the dataset directory is published under.
    #[arg(long, env = "VEGA_DATASETS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

/// Arguments for the url subcommand.
#[derive(clap::Args)]
struct UrlArgs {
    /// Dataset name, including its extension.
    name: String,

    #[command(flatten)]
    source: RegistrySourceArgs,
}

/// Arguments for the fetch subcommand.
#[derive(clap::Args)]
struct FetchArgs {
    /// Dataset name, including its extension.
    name: String,

    #[command(flatten)]
    source: RegistrySourceArgs,

    /// YAML/JSON file replacing the built-in field override table.
    #[arg(long, env = "VEGA_DATASETS_OVERRIDES")]
    overrides: Option<PathBuf>,

    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,
}

/// Arguments for the infer subcommand.
#[derive(clap::Args)]
struct InferArgs {
    /// Tokens to classify.
    #[arg(required = true, allow_hyphen_values = true)]
    tokens: Vec<String>,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the registry subcommand.
#[derive(clap::Args)]
struct BuildRegistryArgs {
    /// Dataset directory to index.
    data_dir: PathBuf,

    /// Base URL the dataset directory is published under.
    #[arg(long, env = "VEGA_DATASETS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Write the registry here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Arguments for the catalog subcommand.
#[derive(clap::Args)]
struct CatalogArgs {
    /// Dataset directory to describe.
    data_dir: PathBuf,

    /// The repository's package.json.
    #[arg(long, default_value = "package.json")]
    package: PathBuf,

    /// YAML file with curated resource and field annotations.
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Directory the catalog files are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// File name stem of the catalog files.
    #[arg(long, default_value = "datapackage")]
    stem: String,

    /// Catalog files to write ('json', 'yaml', or 'both').
    #[arg(long, default_value = "both")]
    output: String,

    /// Also write a Markdown rendering of the catalog here.
    #[arg(long)]
    markdown: Option<PathBuf>,
}

/// Run the vega-datasets CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DatasetError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::List(args)) => run_list(args),
        Some(Commands::Url(args)) => run_url(args),
        Some(Commands::Fetch(args)) => run_fetch(args),
        Some(Commands::Infer(args)) => run_infer(args),
        Some(Commands::Registry(args)) => run_registry(args),
        Some(Commands::Catalog(args)) => run_catalog(args),
        None => {
            println!("vega-datasets {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Typed access to the Vega example datasets.");
            println!();
            println!("Run 'vega-datasets --help' for usage information.");
            Ok(())
        }
    }
}

/// Installs a stderr subscriber; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_registry(args: &RegistrySourceArgs) -> Result<Registry, DatasetError> {
    match (&args.data_dir, &args.registry) {
        (Some(dir), _) => Registry::from_dir(dir, &args.base_url),
        (None, Some(path)) => registry::read_registry_json(path),
        (None, None) => Err(DatasetError::NoRegistry),
    }
}

/// Execute the list subcommand.
fn run_list(args: RegistrySourceArgs) -> Result<(), DatasetError> {
    let registry = load_registry(&args)?;
    for (name, url) in registry.iter() {
        println!("{}\t{}", name, url);
    }
    Ok(())
}

/// Execute the url subcommand.
fn run_url(args: UrlArgs) -> Result<(), DatasetError> {
    let registry = load_registry(&args.source)?;
    let url = registry
        .get(&args.name)
        .ok_or_else(|| DatasetError::UnknownDataset(args.name.clone()))?;
    println!("{}", url);
    Ok(())
}

/// Execute the fetch subcommand.
fn run_fetch(args: FetchArgs) -> Result<(), DatasetError> {
    let registry = load_registry(&args.source)?;
    let overrides = match &args.overrides {
        Some(path) => overrides::read_overrides(path)?,
        None => FieldOverrides::builtin(),
    };

    let datasets = Datasets::new(
        Arc::new(registry),
        Arc::new(overrides),
        Arc::new(accessor::fetch::default_fetcher()),
    );

    match datasets.load(&args.name)? {
        Content::Text(text) => print!("{}", text),
        content => {
            let json = if args.compact {
                serde_json::to_string(&content)
            } else {
                serde_json::to_string_pretty(&content)
            }
            .map_err(|source| DatasetError::JsonWrite {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Execute the infer subcommand.
fn run_infer(args: InferArgs) -> Result<(), DatasetError> {
    let inferred: Vec<(&str, record::Value)> = args
        .tokens
        .iter()
        .map(|token| (token.as_str(), record::infer_value(token)))
        .collect();

    match args.output.as_str() {
        "text" => {
            for (token, value) in &inferred {
                println!("{:?}\t{}\t{}", token, value.kind(), value);
            }
        }
        "json" => {
            let rows: Vec<serde_json::Value> = inferred
                .iter()
                .map(|(token, value)| {
                    serde_json::json!({
                        "token": token,
                        "type": value.kind(),
                        "value": value,
                    })
                })
                .collect();
            let json = serde_json::to_string_pretty(&rows).map_err(|source| {
                DatasetError::JsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
        }
        other => {
            return Err(DatasetError::UnsupportedFormat(format!(
                "'{}' (supported: text, json)",
                other
            )));
        }
    }
    Ok(())
}

/// Execute the registry subcommand.
fn run_registry(args: BuildRegistryArgs) -> Result<(), DatasetError> {
    let registry = Registry::from_dir(&args.data_dir, &args.base_url)?;

    match &args.out {
        Some(path) => {
            registry::write_registry_json(path, &registry)?;
            println!("Wrote {} entries to {}", registry.len(), path.display());
        }
        None => {
            let json = registry::to_json_string(&registry).map_err(|source| {
                DatasetError::JsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Execute the catalog subcommand.
fn run_catalog(args: CatalogArgs) -> Result<(), DatasetError> {
    let package = catalog::read_package_metadata(&args.package)?;
    let annotations = match &args.annotations {
        Some(path) => catalog::read_annotations(path)?,
        None => catalog::Annotations::default(),
    };

    let build = catalog::build_catalog(&args.data_dir, package, &annotations)?;
    let written = catalog::write_catalog(&build.catalog, &args.out_dir, &args.stem, &args.output)?;
    for path in &written {
        println!("Wrote {}", path.display());
    }

    if let Some(path) = &args.markdown {
        catalog::report::write_markdown(path, &build.catalog)?;
        println!("Wrote {}", path.display());
    }

    println!(
        "Catalog has {} resource(s) with {} warning(s)",
        build.catalog.resources.len(),
        build.warnings.len()
    );
    Ok(())
}
