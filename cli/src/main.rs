use clap::{ArgAction, Parser, Subcommand};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use serc::{compile_schema, compiled_to_json, generate_c, read_schema, SercError, REGISTRY};

#[derive(Parser)]
#[command(name = "serc")]
#[command(about = "Generate packed C structs, constructors and serializers from JSON schemas", long_about = None)]
struct Cli {
    /// Log more (-v for debug, -vv for trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate C source from a schema file
    Generate {
        /// Input `.json` schema file
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.c` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a schema and print the compiled structures as JSON
    Inspect {
        /// Input `.json` schema file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the registered member type IDs
    Types,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), SercError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Generate { input, output } => {
            let schema = read_schema(BufReader::new(File::open(input)?))?;
            // Compile fully before touching the output
            let c_code = generate_c(&compile_schema(&schema)?);
            if let Some(out_path) = output {
                fs::write(out_path, &c_code)?;
                info!("Generated {} → {}", input.display(), out_path.display());
            } else {
                print!("{}", c_code);
            }
            Ok(())
        }

        Commands::Inspect { input } => {
            let schema = read_schema(BufReader::new(File::open(input)?))?;
            let compiled = compile_schema(&schema)?;
            println!("{}", compiled_to_json(&compiled)?);
            Ok(())
        }

        Commands::Types => {
            for type_id in REGISTRY.type_ids() {
                println!("{}", type_id);
            }
            Ok(())
        }
    }
}
