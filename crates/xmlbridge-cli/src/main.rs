use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use xmlbridge::{DecodeConfig, Decoder, EncodeConfig, Encoder, WordRules, json};

#[derive(Debug, Parser)]
#[command(
    name = "xmlbridge",
    version,
    about = "Convert JSON to XML and XML back to JSON"
)]
struct Args {
    /// Log more (-v debug, -vv trace); RUST_LOG applies when absent
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read JSON, write XML
    Encode(EncodeArgs),
    /// Read XML, write JSON
    Decode(DecodeArgs),
    /// Exit with status 0 if the input is well-formed XML, 1 otherwise
    Check {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
struct IoArgs {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// JSON file with configuration; flags are applied on top
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
struct WordArgs {
    /// Pair plural containers with singular items (cars -> car)
    #[arg(long)]
    singularize: bool,
    /// Word never singularized (repeatable)
    #[arg(long, value_name = "WORD")]
    exclude: Vec<String>,
    /// Explicit mapping PLURAL=SINGULAR (repeatable)
    #[arg(long, value_name = "PLURAL=SINGULAR")]
    include: Vec<String>,
}

impl WordArgs {
    fn apply(&self, mut rules: WordRules) -> Result<WordRules> {
        if self.singularize {
            rules.singularize_words = true;
        }
        for word in &self.exclude {
            rules = rules.exclude(word.as_str());
        }
        for mapping in &self.include {
            let Some((plural, singular)) = mapping.split_once('=') else {
                bail!("--include expects PLURAL=SINGULAR, got {mapping:?}");
            };
            rules = rules.include(plural, singular);
        }
        Ok(rules)
    }
}

#[derive(Debug, clap::Args)]
struct EncodeArgs {
    #[command(flatten)]
    io: IoArgs,
    /// Root element name
    #[arg(long)]
    root: String,
    #[command(flatten)]
    words: WordArgs,
    /// Write null values as xsi:nil="true"
    #[arg(long)]
    nil_on_null: bool,
    /// Indentation unit ("" for a single line)
    #[arg(long, value_name = "S")]
    indent: Option<String>,
    /// Version written to the XML declaration
    #[arg(long, value_name = "V")]
    version_decl: Option<String>,
}

#[derive(Debug, clap::Args)]
struct DecodeArgs {
    #[command(flatten)]
    io: IoArgs,
    #[command(flatten)]
    words: WordArgs,
    #[arg(long)]
    keep_comments: bool,
    #[arg(long)]
    keep_attributes: bool,
    #[arg(long)]
    keep_namespaces: bool,
    /// Keep the root element as the single top-level key
    #[arg(long)]
    keep_root: bool,
    /// Deepest element nesting accepted
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Encode(args) => encode(&args)?,
        Command::Decode(args) => decode(&args)?,
        Command::Check { input } => {
            let xml = read_input(input.as_deref())?;
            let valid = xmlbridge::is_valid(&xml);
            info!(valid, "checked input");
            return Ok(if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn encode(args: &EncodeArgs) -> Result<()> {
    let mut config: EncodeConfig = load_config(args.io.config.as_deref())?;
    config.words = args.words.apply(config.words)?;
    if args.nil_on_null {
        config.nil_on_null = true;
    }
    if let Some(indent) = &args.indent {
        config.indent_string.clone_from(indent);
    }
    if let Some(version) = &args.version_decl {
        config.document_version.clone_from(version);
    }
    debug!(?config, "encode configuration");

    let input = read_input(args.io.input.as_deref())?;
    let value = json::from_json_str(&input).context("input is not valid JSON")?;
    let mut xml = Encoder::new(config)
        .encode(&args.root, &value)
        .context("failed to encode XML")?;
    xml.push('\n');

    write_output(args.io.output.as_deref(), xml.as_bytes())
}

fn decode(args: &DecodeArgs) -> Result<()> {
    let mut config: DecodeConfig = load_config(args.io.config.as_deref())?;
    config.words = args.words.apply(config.words)?;
    config.strip_comments &= !args.keep_comments;
    config.strip_attributes &= !args.keep_attributes;
    config.strip_namespaces &= !args.keep_namespaces;
    config.strip_root &= !args.keep_root;
    if let Some(depth) = args.max_depth {
        config.max_recursion_depth = depth;
    }
    debug!(?config, "decode configuration");

    let input = read_input(args.io.input.as_deref())?;
    let value = Decoder::new(config)
        .decode(&input)
        .context("failed to decode XML")?;
    let mut text = if args.pretty {
        json::to_json_string_pretty(&value)?
    } else {
        json::to_json_string(&value)?
    };
    text.push('\n');

    write_output(args.io.output.as_deref(), text.as_bytes())
}

fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
