use clap::{Parser, Subcommand};
use dynaquery::catalogue::Catalogue;
use dynaquery::cli::{self as prog_cli, Command, Outcome, OutputMode, parse_params};
use dynaquery::config::{AppConfig, load_config};
use dynaquery::executor::QueryExecutor;
use dynaquery::registry::load_queries_ndjson;
use dynaquery::store::{MemoryStore, load_ndjson_dir};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "dynaquery", version, about = "Run catalogue and stored queries against a document store", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Query catalogue JSON. Defaults to query-config.json")]
    catalogue: Option<PathBuf>,
    #[arg(long, help = "Directory of *.ndjson files, one collection per file")]
    data: Option<PathBuf>,
    #[arg(long, help = "NDJSON file of stored query records")]
    queries: Option<PathBuf>,
    #[arg(long, help = "Write rolling log files to this directory")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, help = "Print compact single-line JSON")]
    compact: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Execute a catalogue query by entity.operation name")]
    Run {
        name: String,
        #[arg(long, help = "Parameters as a JSON object")]
        params: Option<String>,
    },
    #[command(name = "run-stored", about = "Execute a stored query by id")]
    RunStored {
        id: String,
        #[arg(long, help = "Parameters as a JSON object; overrides stored defaults")]
        params: Option<String>,
    },
    #[command(about = "Check a query name and its required parameters without executing")]
    Validate {
        name: String,
        #[arg(long)]
        params: Option<String>,
    },
    #[command(about = "List catalogue query mappings")]
    Mappings,
    #[command(about = "Show sample queries")]
    Samples,
    #[command(about = "Describe the query format and supported operation types")]
    Docs,
    #[command(about = "Report catalogue and registry health")]
    Status,
}

fn to_command(cmd: Commands) -> Result<Command, Box<dyn std::error::Error>> {
    Ok(match cmd {
        Commands::Run { name, params } => Command::Run { name, params: parse_params(params.as_deref())? },
        Commands::RunStored { id, params } => Command::RunStored {
            id,
            params: params.as_deref().map(|p| parse_params(Some(p))).transpose()?,
        },
        Commands::Validate { name, params } => {
            Command::Validate { name, params: parse_params(params.as_deref())? }
        }
        Commands::Mappings => Command::Mappings,
        Commands::Samples => Command::Samples,
        Commands::Docs => Command::Docs,
        Commands::Status => Command::Status,
    })
}

fn run(cli: Cli) -> Result<Outcome, Box<dyn std::error::Error>> {
    let flags = AppConfig {
        catalogue_path: cli.catalogue,
        log_dir: cli.log_dir,
        log_level: cli.log_level,
        data_dir: cli.data,
    };
    let cfg = load_config(flags, cli.config.as_deref())?;
    if let Some(dir) = &cfg.log_dir {
        dynaquery::logger::init_in(dir, cfg.log_level.as_deref().unwrap_or("info"), None, false)?;
    }

    let catalogue = Arc::new(Catalogue::load(cfg.catalogue_path())?);
    let store = Arc::new(MemoryStore::new());
    if let Some(dir) = &cfg.data_dir {
        for (collection, n) in load_ndjson_dir(&store, dir)? {
            log::info!("collection {collection}: {n} document(s)");
        }
    }
    let exec = QueryExecutor::in_memory(catalogue, store);
    if let Some(path) = &cli.queries {
        load_queries_ndjson(exec.registry(), std::fs::File::open(path)?)?;
    }

    let mode = if cli.compact { OutputMode::Compact } else { OutputMode::Pretty };
    let cmd = to_command(cli.command)?;
    prog_cli::run(&exec, cmd, mode, &mut std::io::stdout().lock())
}

fn main() {
    match run(Cli::parse()) {
        Ok(Outcome::Ok) => {}
        Ok(Outcome::Failed) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}
