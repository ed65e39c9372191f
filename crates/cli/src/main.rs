//! tdt — translate EPC identifiers between TDT representation levels.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use epc_tdt_core::{Engine, TdtError};
use epc_tdt_loader::DirectorySource;

// ── CLI definition ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "tdt",
    version,
    about = "EPC Tag Data Translation — translate identifiers between BINARY, \
             tag/pure-identity URIs, legacy and AI forms"
)]
struct Cli {
    /// Output mode: "pretty" for terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Translate an identifier to a target representation level.
    Translate {
        /// The identifier to translate (any input level).
        #[arg(value_name = "IDENTIFIER")]
        identifier: String,
        /// Directory of TDT scheme files.
        #[arg(long, value_name = "DIR")]
        schemes: PathBuf,
        /// Target level (BINARY, TAG_ENCODING, PURE_IDENTITY, LEGACY,
        /// LEGACY_AI, ONS_HOSTNAME). Case-sensitive.
        #[arg(long, value_name = "LEVEL")]
        to: String,
        /// Hints as ;-separated key=value pairs
        /// (e.g. "taglength=96;filter=3;gs1companyprefixlength=7").
        #[arg(long, default_value = "")]
        hints: String,
        /// Explicit path to the company-prefix table
        /// (defaults to ManagerTranslation.xml inside the scheme directory).
        #[arg(long, value_name = "PATH")]
        prefix_table: Option<PathBuf>,
    },

    /// List the loaded schemes, their levels and option keys.
    Schemes {
        /// Directory of TDT scheme files.
        #[arg(long, value_name = "DIR")]
        schemes: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = match cli.output.as_deref() {
        Some("json") => true,
        Some(_) => false,
        None => !std::io::stdout().is_terminal(),
    };
    let code = match run(cli, json) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err, json);
            1
        }
    };
    process::exit(code);
}

fn run(cli: Cli, json: bool) -> Result<()> {
    match cli.cmd {
        Cmd::Translate {
            identifier,
            schemes,
            to,
            hints,
            prefix_table,
        } => {
            let engine = build_engine(schemes, prefix_table)?;
            let output = engine
                .translate_params(&identifier, &hints, &to)
                .with_context(|| format!("translating {identifier:?}"))?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "ok": true, "output": output })
                );
            } else {
                println!("{output}");
            }
            Ok(())
        }

        Cmd::Schemes { schemes } => {
            let engine = build_engine(schemes, None)?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "ok": true, "schemes": engine.schemes() })
                );
            } else {
                for scheme in engine.schemes().schemes() {
                    println!(
                        "{} (tagLength {}, optionKey {})",
                        scheme.name, scheme.tag_length, scheme.option_key
                    );
                    for level in &scheme.levels {
                        let keys: Vec<&str> = level
                            .options
                            .iter()
                            .map(|o| o.option_key.as_str())
                            .collect();
                        println!("  {} [{}]", level.kind, keys.join(", "));
                    }
                }
            }
            Ok(())
        }
    }
}

fn build_engine(schemes: PathBuf, prefix_table: Option<PathBuf>) -> Result<Engine> {
    let mut source = DirectorySource::new(&schemes);
    if let Some(path) = prefix_table {
        source = source.with_prefix_table(path);
    }
    Engine::from_source(Box::new(source))
        .with_context(|| format!("loading schemes from {}", schemes.display()))
}

fn report_error(err: &anyhow::Error, json: bool) {
    // Surface the engine's error kind when the chain bottoms out in one.
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<TdtError>())
        .map(|e| e.kind.to_string());
    if json {
        eprintln!(
            "{}",
            serde_json::json!({ "ok": false, "kind": kind, "message": format!("{err:#}") })
        );
    } else {
        match kind {
            Some(kind) => eprintln!("error[{kind}]: {err:#}"),
            None => eprintln!("error: {err:#}"),
        }
    }
}
