//! jsonptr-index CLI: inspect JSON documents through a pointer offset index.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jsonptr_index::PointerIndex;
use std::io::{self, Read, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "jsonptr-index")]
#[command(about = "Index a JSON document by JSON Pointer and fetch values by offset", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every JSON Pointer in a document with its byte offset
    Paths(PathsArgs),
    /// Print the values at one or more JSON Pointers
    Get(GetArgs),
    /// Check that a document is well-formed JSON
    Validate(InputArgs),
}

/// Where to read the document from.
#[derive(Debug, Parser)]
struct InputArgs {
    /// Input file (`-` for stdin)
    file: PathBuf,

    /// Memory-map the input file instead of reading it (not valid with stdin)
    #[arg(long)]
    mmap: bool,
}

#[derive(Debug, Parser)]
struct PathsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Only list paths starting with this prefix
    #[arg(short, long)]
    prefix: Option<String>,
}

#[derive(Debug, Parser)]
struct GetArgs {
    #[command(flatten)]
    input: InputArgs,

    /// JSON Pointers to look up (`""` for the root)
    #[arg(required = true)]
    pointers: Vec<String>,

    /// Pretty print values instead of echoing the source bytes
    #[arg(long)]
    pretty: bool,
}

/// Document bytes, either read into memory or memory-mapped.
enum Document {
    Owned(Vec<u8>),
    Mapped(memmap2::Mmap),
}

impl Deref for Document {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Document::Owned(bytes) => bytes,
            Document::Mapped(map) => map,
        }
    }
}

fn load(args: &InputArgs) -> Result<Document> {
    if args.file == Path::new("-") {
        if args.mmap {
            bail!("--mmap cannot be used when reading from stdin");
        }
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read stdin")?;
        return Ok(Document::Owned(bytes));
    }

    if args.mmap {
        let file = std::fs::File::open(&args.file)
            .with_context(|| format!("Failed to open {}", args.file.display()))?;
        // SAFETY: the map is only read, and only for the lifetime of this process
        let map = unsafe { memmap2::Mmap::map(&file) }
            .with_context(|| format!("Failed to map {}", args.file.display()))?;
        return Ok(Document::Mapped(map));
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    Ok(Document::Owned(bytes))
}

/// Render the value at `pointer` for output.
fn render(index: &PointerIndex<'_>, pointer: &str, pretty: bool) -> Result<String> {
    if pretty {
        let value = index.value(pointer)?;
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    let span = index.raw_span(pointer)?;
    Ok(String::from_utf8_lossy(span).into_owned())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Paths(args) => {
            let document = load(&args.input)?;
            let index = PointerIndex::build(&document)
                .with_context(|| format!("Failed to index {}", args.input.file.display()))?;
            let prefix = args.prefix.as_deref().unwrap_or("");
            for (path, offset) in index.iter().filter(|(p, _)| p.starts_with(prefix)) {
                writeln!(out, "{}\t{}", offset, path)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Get(args) => {
            let document = load(&args.input)?;
            let index = PointerIndex::build(&document)
                .with_context(|| format!("Failed to index {}", args.input.file.display()))?;
            let mut status = ExitCode::SUCCESS;
            for pointer in &args.pointers {
                match render(&index, pointer, args.pretty) {
                    Ok(text) => writeln!(out, "{}", text)?,
                    Err(err) => {
                        eprintln!("{}: {}", pointer, err);
                        status = ExitCode::FAILURE;
                    }
                }
            }
            Ok(status)
        }
        Command::Validate(args) => {
            let document = load(&args)?;
            match jsonptr_index::validate(&document) {
                Ok(()) => {
                    eprintln!("✓ {} is valid JSON", args.file.display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{}: {}", args.file.display(), err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn main() -> Result<ExitCode> {
    run(Cli::parse())
}
