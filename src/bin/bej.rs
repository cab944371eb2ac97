//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Command-line driver for the BEJ codec: `bej encode` turns a JSON file into
//! a BEJ byte stream against a schema (and optional annotation) dictionary;
//! `bej decode` reverses the process.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bej_codec::{decode, encode, Dictionary};

#[derive(Parser, Debug)]
#[command(name = "bej", about = "Encode and decode BEJ (Binary Encoded JSON) documents", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a JSON document into a BEJ byte stream.
    Encode(ModeArgs),
    /// Decode a BEJ byte stream into a JSON document.
    Decode(ModeArgs),
}

#[derive(Parser, Debug)]
struct ModeArgs {
    /// Input file: JSON text for `encode`, a BEJ byte stream for `decode`.
    input: PathBuf,

    /// Schema dictionary. A `.map` extension is redirected to the sibling `.bin` file.
    #[arg(short = 's', long = "schema")]
    schema: PathBuf,

    /// Optional annotation dictionary, resolved the same way as `--schema`.
    #[arg(short = 'a', long = "annot")]
    annot: Option<PathBuf>,

    /// Output file; defaults to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Encode(args) => run_encode(args),
        Command::Decode(args) => run_decode(args),
    }
}

fn load_dictionaries(
    schema_path: &PathBuf,
    annot_path: &Option<PathBuf>,
) -> Result<(Dictionary, Option<Dictionary>)> {
    let schema = Dictionary::load(schema_path)
        .with_context(|| format!("failed to load schema dictionary {:?}", schema_path))?;
    let annot = annot_path
        .as_ref()
        .map(Dictionary::load)
        .transpose()
        .with_context(|| "failed to load annotation dictionary")?;
    Ok((schema, annot))
}

fn run_encode(args: &ModeArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {:?}", args.input))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse JSON from {:?}", args.input))?;

    let (schema, annot) = load_dictionaries(&args.schema, &args.annot)?;
    let annot_view = annot.as_ref().map(Dictionary::view);

    tracing::debug!(input = ?args.input, schema = ?args.schema, annot = ?args.annot, "encoding JSON to BEJ");
    let bytes = encode(&value, &schema.view(), annot_view.as_ref())?;

    write_output(&args.output, &bytes)
}

fn run_decode(args: &ModeArgs) -> Result<()> {
    let bytes = fs::read(&args.input).with_context(|| format!("failed to read {:?}", args.input))?;

    let (schema, annot) = load_dictionaries(&args.schema, &args.annot)?;
    let annot_view = annot.as_ref().map(Dictionary::view);

    tracing::debug!(input = ?args.input, schema = ?args.schema, annot = ?args.annot, "decoding BEJ to JSON");
    let value = decode(&bytes, &schema.view(), annot_view.as_ref())?;

    let text = serde_json::to_string_pretty(&value)?;
    match &args.output {
        Some(path) => fs::write(path, text).with_context(|| format!("failed to write {:?}", path))?,
        None => println!("{}", text),
    }
    Ok(())
}

fn write_output(path: &Option<PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, bytes).with_context(|| format!("failed to write {:?}", path))?,
        None => std::io::stdout().write_all(bytes)?,
    }
    Ok(())
}
