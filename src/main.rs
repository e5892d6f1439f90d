// Author: Dustin Pilgrim
// License: MIT

//! `workflow-cfg`: materialize a JSON workflow config and print it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use workflow_cfg::{CfgError, MaterializeOptions, Materializer};

/// Resolve overrides and placeholders, validate against schemas, drop disabled sections
#[derive(Parser, Debug)]
#[command(name = "workflow-cfg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON document to materialize
    document: PathBuf,

    /// Runtime overrides, e.g. "env=prod;replicas=3;tags=[\"a\"]"
    #[arg(default_value = "")]
    overrides: String,

    /// JSON schemas the substituted document must satisfy, checked in order
    schemas: Vec<PathBuf>,

    /// Indent the output
    #[arg(long)]
    pretty: bool,

    /// Emit a real null where a field resolves to the text `null`
    #[arg(long)]
    strict_null: bool,

    /// Log pipeline steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

fn run(cli: &Cli) -> Result<String, CfgError> {
    let options = MaterializeOptions {
        legacy_null_text: !cli.strict_null,
        pretty: cli.pretty,
    };
    Materializer::new(options).render_file(&cli.document, &cli.overrides, &cli.schemas)
}

/// Logs go to stderr so stdout carries only the document.
fn init_tracing(verbose: bool) {
    let builder = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = if verbose {
        tracing::subscriber::set_global_default(builder.with_max_level(Level::DEBUG).finish())
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish())
    };

    if result.is_err() {
        eprintln!("warning: a tracing subscriber was already installed");
    }
}
