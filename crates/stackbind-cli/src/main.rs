//! Stackbind command-line driver
//!
//! Generates interpreter-to-native trampolines from a JSON type catalogue:
//!
//! ```text
//! stackbind generate --catalogue types.json --out src/bindings [--config stackbind.toml]
//! stackbind inspect --catalogue types.json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackbind")]
#[command(about = "Binding generator for interpreter-to-native trampolines", long_about = None)]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Rust binding modules and the aggregate initializer
    Generate {
        /// Catalogue JSON file
        #[arg(short, long)]
        catalogue: PathBuf,
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
        /// Options file (stackbind.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Binding identifier suffix (overrides the options file)
        #[arg(long)]
        suffix: Option<String>,
        /// Runtime crate path used by emitted code (overrides the options file)
        #[arg(long)]
        runtime_crate: Option<String>,
    },

    /// Show identifiers, signatures and skip reasons without writing files
    Inspect {
        /// Catalogue JSON file
        #[arg(short, long)]
        catalogue: PathBuf,
        /// Options file (stackbind.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG, when set, takes precedence over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            catalogue,
            out,
            config,
            suffix,
            runtime_crate,
        } => commands::generate::execute(commands::generate::GenerateArgs {
            catalogue,
            out,
            config,
            suffix,
            runtime_crate,
        }),

        Commands::Inspect { catalogue, config } => {
            let stdout = std::io::stdout();
            commands::inspect::execute(&catalogue, config.as_deref(), &mut stdout.lock())
        }
    }
}
