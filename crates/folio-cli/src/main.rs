use std::fs;
use std::io::Write;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;
use tabwriter::TabWriter;
use tracing_subscriber::EnvFilter;

use folio_io::prelude::*;

/// Exit code for content that parsed but breaks an invariant.
const EXIT_INVALID: i32 = 2;
/// Exit code for unreadable input.
const EXIT_IO: i32 = 1;

const PREVIEW_CHARS: usize = 60;

static RAW_CONTENT_SCHEMA: Lazy<Result<Validator, String>> = Lazy::new(|| {
    let schema_json: Value = serde_json::from_str(include_str!("../../../schemas/raw-content.v1.schema.json"))
        .map_err(|e| format!("invalid raw-content schema JSON: {e}"))?;
    Validator::new(&schema_json).map_err(|e| format!("compile raw-content schema: {e}"))
});

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Inspect, validate and edit rich-text content snapshots")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the blocks of a raw content JSON document.
    Inspect {
        /// Raw content JSON path
        input: String,
        /// Only blocks of this type (e.g. `header-one`)
        #[arg(long = "type")]
        block_type: Option<String>,
        /// Only the block with this key
        #[arg(long)]
        key: Option<String>,
        /// Only blocks whose text contains this substring
        #[arg(long)]
        grep: Option<String>,
        /// Align columns for humans instead of emitting TSV
        #[arg(long)]
        pretty: bool,
    },
    /// Check a raw content JSON document; prints OK when it is valid.
    Validate {
        /// Raw content JSON path
        input: String,
        /// Also check the document against the raw-content JSON schema
        #[arg(long)]
        schema: bool,
        /// Print diagnostics as JSON on stderr
        #[arg(long)]
        diagnostics_json: bool,
    },
    /// Replay an edit script on a document and print the resulting content.
    Apply {
        /// Raw content JSON path
        content: String,
        /// Edit script JSON path
        script: String,
        /// Maximum number of undo steps kept while replaying
        #[arg(long, default_value_t = 100)]
        max_undo: usize,
        /// Merge consecutive typing steps into one undo step
        #[arg(long)]
        coalesce_typing: bool,
        /// Separator between segments of segmented entities
        #[arg(long, default_value_t = ' ')]
        segment_separator: char,
        /// Print the plain text (blocks joined by newlines) instead of JSON
        #[arg(long)]
        text: bool,
        /// Output minified JSON
        #[arg(long)]
        min: bool,
    },
    /// Print a content fingerprint.
    Fingerprint {
        /// Raw content JSON path
        input: String,
        #[arg(long, value_enum, default_value_t = Algorithm::Sha256)]
        algo: Algorithm,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// SHA-256 over canonical raw JSON
    Sha256,
    /// xxh3 over block text and styling, ignoring keys
    Xxh64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.cmd, "folio invoked");

    match cli.cmd {
        Command::Inspect {
            input,
            block_type,
            key,
            grep,
            pretty,
        } => {
            let content = load_content(&input);
            let mut rows = vec!["key\ttype\tdepth\tparent\tunits\tfingerprint\tpreview".to_string()];
            for block in content.block_map().blocks() {
                let text = block.text().to_string_lossy();
                if block_type.as_deref().is_some_and(|t| t != block.block_type().as_str())
                    || key.as_deref().is_some_and(|k| k != block.key())
                    || grep.as_deref().is_some_and(|g| !text.contains(g))
                {
                    continue;
                }
                rows.push(format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    block.key(),
                    block.block_type().as_str(),
                    block.depth(),
                    block.parent_key().unwrap_or("-"),
                    block.len(),
                    folio_io::model::block_fingerprint(block),
                    preview(&text)
                ));
            }

            let stdout = std::io::stdout();
            if pretty {
                let mut tw = TabWriter::new(stdout.lock());
                for row in &rows {
                    writeln!(tw, "{row}")?;
                }
                tw.flush()?;
            } else {
                let mut out = stdout.lock();
                for row in &rows {
                    writeln!(out, "{row}")?;
                }
            }
        }
        Command::Validate {
            input,
            schema,
            diagnostics_json,
        } => {
            let s = read_or_exit(&input);

            if schema {
                let value: Value = match serde_json::from_str(&s) {
                    Ok(v) => v,
                    Err(e) => exit_with(EXIT_IO, &format!("Invalid JSON: {e}")),
                };
                let validator = match RAW_CONTENT_SCHEMA.as_ref() {
                    Ok(v) => v,
                    Err(msg) => anyhow::bail!("{msg}"),
                };
                let errors: Vec<String> = validator
                    .iter_errors(&value)
                    .map(|e| e.to_string())
                    .collect();
                if !errors.is_empty() {
                    exit_with(EXIT_INVALID, &format!("schema validation failed:\n{}", errors.join("\n")));
                }
            }

            let content = match parse_content_json_str(&s) {
                Ok(c) => c,
                Err(e) if e.is_content_error() => exit_with(EXIT_INVALID, &e.to_string()),
                Err(e) => exit_with(EXIT_IO, &e.to_string()),
            };

            match validate_content(&content) {
                Ok(()) => println!("OK"),
                Err(err) => {
                    if diagnostics_json {
                        let out = serde_json::to_string_pretty(&err.diagnostics)?;
                        exit_with(EXIT_INVALID, &out);
                    }
                    // Exact message, stable for CI / integrations.
                    exit_with(EXIT_INVALID, &err.first_message());
                }
            }
        }
        Command::Apply {
            content,
            script,
            max_undo,
            coalesce_typing,
            segment_separator,
            text,
            min,
        } => {
            let snapshot = load_content(&content);
            let script_s = read_or_exit(&script);
            let script: EditScript = match serde_json::from_str(&script_s) {
                Ok(s) => s,
                Err(e) => exit_with(EXIT_IO, &format!("Invalid edit script: {e}")),
            };

            let Some(segment_separator) = SegmentSeparator::from_char(segment_separator) else {
                anyhow::bail!("segment separator {segment_separator:?} does not fit in one UTF-16 code unit");
            };
            let opts = ScriptOptions {
                history: HistoryOptions {
                    allow_undo: true,
                    max_depth: max_undo,
                    coalesce_typing,
                },
                removal: RemovalOptions { segment_separator },
            };

            let state = match run_script(snapshot, &script, opts) {
                Ok(s) => s,
                Err(e) => exit_with(EXIT_INVALID, &e.to_string()),
            };
            let result = state.current_content();

            if text {
                println!("{}", result.plain_text("\n"));
            } else {
                let out = content_to_json_string(result, !min).context("serialize content")?;
                println!("{out}");
            }
        }
        Command::Fingerprint { input, algo } => {
            let content = load_content(&input);
            let out = match algo {
                Algorithm::Sha256 => format!("sha256:{}", hashing::content_sha256(&content)?),
                Algorithm::Xxh64 => format!("xxh64:{}", hashing::content_xxh64(&content)),
            };
            println!("{out}");
        }
    }

    Ok(())
}

fn exit_with(code: i32, msg: &str) -> ! {
    eprintln!("{msg}");
    process::exit(code);
}

fn read_or_exit(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => exit_with(EXIT_IO, &format!("{path}: {e}")),
    }
}

fn load_content(path: &str) -> ContentState {
    let s = read_or_exit(path);
    match parse_content_json_str(&s) {
        Ok(c) => c,
        Err(e) if e.is_content_error() => exit_with(EXIT_INVALID, &e.to_string()),
        Err(e) => exit_with(EXIT_IO, &e.to_string()),
    }
}

/// First line of `text`, bounded to `PREVIEW_CHARS` characters.
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    let mut out: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}
