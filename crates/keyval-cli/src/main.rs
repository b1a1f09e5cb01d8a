//! `keyval` CLI: query, edit, stack and convert JSON/YAML configuration files.
//!
//! ## Usage
//!
//! ```sh
//! # Read a value by dotted path (stdin → stdout)
//! echo '{"db":{"host":"localhost"}}' | keyval get db.host
//!
//! # Set a value, creating missing parents
//! keyval set server.tls.enabled true --create -i config.yaml -o config.yaml
//!
//! # Stack layers: later files override earlier ones
//! keyval stack defaults.yaml production.json --to yaml
//!
//! # Convert between formats
//! keyval convert -i config.yaml --to json
//!
//! # Use a different path delimiter
//! keyval --delimiter / get db/host -i config.json
//! ```
//!
//! Set `RUST_LOG=keyval=debug` to see what the library does to the tree.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use keyval::{split_key_with, KeyVal, Node, DEFAULT_DELIMITER};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "keyval",
    version,
    about = "Query, edit and stack JSON/YAML configuration trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Delimiter separating path components
    #[arg(long, global = true, default_value = DEFAULT_DELIMITER)]
    delimiter: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at a path
    Get {
        /// Delimited path, e.g. `db.host` (empty for the whole document)
        path: String,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Input format (inferred from the file extension if omitted)
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Set the value at a path and print the resulting document
    Set {
        /// Delimited path, e.g. `db.port`
        path: String,
        /// New value; parsed as JSON when valid, otherwise taken as a string
        value: String,
        /// Create missing parent mappings instead of failing
        #[arg(long)]
        create: bool,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Input format (inferred from the file extension if omitted)
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Output format (defaults to the input format)
        #[arg(long, value_enum)]
        to: Option<Format>,
    },
    /// Stack files in order, later files overriding earlier ones
    Stack {
        /// Layer files, lowest priority first
        #[arg(required = true)]
        files: Vec<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        to: Format,
    },
    /// Re-encode a document in another format
    Convert {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Input format (inferred from the file extension if omitted)
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Output format
        #[arg(long, value_enum)]
        to: Format,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyval=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Get {
            path,
            input,
            format,
        } => {
            let format = resolve_format(format, input.as_deref());
            let kv = load(input.as_deref(), format)?;
            let keys = parse_path(&path, &cli.delimiter);
            let rendered = if keys.is_empty() {
                serde_json::to_string_pretty(kv.root())?
            } else {
                let node = kv
                    .value(&keys)
                    .with_context(|| format!("Failed to read `{}`", path))?;
                render_node(node)?
            };
            println!("{}", rendered);
        }
        Commands::Set {
            path,
            value,
            create,
            input,
            output,
            format,
            to,
        } => {
            let format = resolve_format(format, input.as_deref());
            let mut kv = load(input.as_deref(), format)?;
            let keys = parse_path(&path, &cli.delimiter);
            let node = parse_value(&value);
            debug!(path = %path, kind = %node.kind(), create, "setting value");
            let result = if create {
                kv.create_value(node, &keys)
            } else {
                kv.set_value(node, &keys)
            };
            result.with_context(|| format!("Failed to set `{}`", path))?;
            write_output(output.as_deref(), &encode(&kv, to.unwrap_or(format))?)?;
        }
        Commands::Stack { files, output, to } => {
            let mut layers = Vec::with_capacity(files.len());
            for file in &files {
                let format = resolve_format(None, Some(file.as_str()));
                layers.push(load(Some(file.as_str()), format)?);
            }
            debug!(layers = layers.len(), "stacking files");
            let merged = KeyVal::stack_layers(&layers);
            write_output(output.as_deref(), &encode(&merged, to)?)?;
        }
        Commands::Convert {
            input,
            output,
            format,
            to,
        } => {
            let format = resolve_format(format, input.as_deref());
            let kv = load(input.as_deref(), format)?;
            write_output(output.as_deref(), &encode(&kv, to)?)?;
        }
    }

    Ok(())
}

/// Split a delimited path. The empty string addresses the document root.
fn parse_path<'a>(raw: &'a str, delimiter: &str) -> Vec<&'a str> {
    if raw.is_empty() {
        return Vec::new();
    }
    split_key_with(raw, delimiter)
}

/// Interpret a command-line value: valid JSON keeps its type
/// (`8080`, `true`, `null`, `[1,2]`), anything else is a string.
fn parse_value(raw: &str) -> Node {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => Node::from(value),
        Err(_) => Node::from(raw),
    }
}

/// Explicit format wins; otherwise `.yaml`/`.yml` files are YAML and
/// everything else (including stdin) is JSON.
fn resolve_format(explicit: Option<Format>, path: Option<&str>) -> Format {
    if let Some(format) = explicit {
        return format;
    }
    let ext = path
        .and_then(|p| Path::new(p).extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("yaml") | Some("yml") => Format::Yaml,
        _ => Format::Json,
    }
}

fn load(path: Option<&str>, format: Format) -> Result<KeyVal> {
    let data = read_input(path)?;
    let source = path.unwrap_or("<stdin>");
    let parsed = match format {
        Format::Json => KeyVal::from_json(&data),
        Format::Yaml => KeyVal::from_yaml(&data),
    };
    parsed.with_context(|| format!("Failed to parse {} as {:?}", source, format))
}

fn encode(kv: &KeyVal, format: Format) -> Result<String> {
    let bytes = match format {
        Format::Json => {
            let mut bytes = kv.to_json_pretty()?;
            bytes.push(b'\n');
            bytes
        }
        Format::Yaml => kv.to_yaml()?,
    };
    String::from_utf8(bytes).context("Encoded document was not UTF-8")
}

/// Strings print bare; everything else prints as JSON.
fn render_node(node: &Node) -> Result<String> {
    match node {
        Node::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {}", path)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
