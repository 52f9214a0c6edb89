use clap::{Parser, Subcommand};
use std::process;
use tracing::error;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root of the benchmark workspace (articles/, charsets/, outputs).
    #[arg(global = true, long, default_value = "auto_rime")]
    data_root: String,

    /// Directory holding the scheme definitions the engine deploys.
    #[arg(global = true, long, default_value = "Rime")]
    schema: String,

    /// Directory holding the engine's deployer and console binaries.
    #[arg(global = true, long, default_value = "librime/bin")]
    engine_bin: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full benchmark: segment, encode, simulate, score, report.
    Run(cmd::run::RunArgs),
    /// Derive the mapping and polyphone tables from the scheme dictionaries.
    GenMapping(cmd::gen_mapping::GenMappingArgs),
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let data_root = cli.data_root.clone();
    let schema = cli.schema.clone();
    let engine_bin = cli.engine_bin.clone();

    let result = match cli.command {
        Commands::Run(args) => cmd::run::run(args, &data_root, &schema, &engine_bin),
        Commands::GenMapping(args) => cmd::gen_mapping::run(args, &data_root, &schema),
    };

    if let Err(e) = result {
        error!("❌ {e}");
        process::exit(1);
    }
}
