use std::path::PathBuf;

use clap::{Parser, Subcommand};
use formtree_codec::ConflictPolicy;

use formtree_cli::{decode_query, encode_json, input_or_stdin, load_config, CliError};

/// formtree - convert between flat form data and nested JSON
#[derive(Parser, Debug)]
#[command(name = "formtree")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON codec config file
    #[arg(long, global = true, env = "FORMTREE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a query string into nested JSON
    Decode {
        /// Query string; read from stdin when omitted or `-`
        query: Option<String>,

        /// Keep values as strings instead of coercing them
        #[arg(long, env = "FORMTREE_PRESERVE_STRINGS")]
        preserve_strings: bool,

        /// Fail on keys that disagree about container shape
        #[arg(long, env = "FORMTREE_STRICT")]
        strict: bool,
    },
    /// Encode a JSON object into an urlencoded body
    Encode {
        /// JSON object; read from stdin when omitted or `-`
        json: Option<String>,

        /// JSON-serialize every value, strings included
        #[arg(
            long,
            env = "FORMTREE_STRINGIFY_ALL",
            num_args = 0..=1,
            default_missing_value = "true"
        )]
        stringify_all: Option<bool>,
    },
}

fn run(args: Args) -> Result<String, CliError> {
    let mut config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Decode {
            query,
            preserve_strings,
            strict,
        } => {
            config.preserve_strings |= preserve_strings;
            if strict {
                config.on_conflict = ConflictPolicy::Reject;
            }
            decode_query(&input_or_stdin(query)?, &config)
        }
        Command::Encode {
            json,
            stringify_all,
        } => {
            if let Some(stringify_all) = stringify_all {
                config.stringify_all = stringify_all;
            }
            encode_json(&input_or_stdin(json)?, &config)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
