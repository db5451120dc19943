use clap::{Parser, Subcommand};
use env_logger::Env;
use permit_pdf::integrity::sha256_hex;
use permit_pdf::store::FsDocumentStore;
use permit_pdf::{
    ApprovedRollNumbers, GenerationError, GeneratorConfig, LetterGenerator, LetterRecord,
    VerificationReport,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] permit_pdf::config::ConfigError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to generate document: {0}")]
    Generation(#[from] GenerationError),
    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),
    #[error("{0} does not match the stored hash")]
    Tampered(PathBuf),
}

/// Render, protect and verify club permission letters
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Generator configuration (TOML); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the PDF for an approved letter
    Generate {
        /// Letter record as JSON
        #[arg(short, long)]
        letter: PathBuf,
        /// Approved roll numbers per group as JSON; derived from the letter's
        /// decisions when omitted
        #[arg(short, long)]
        approved: Option<PathBuf>,
        /// Directory the finished document is stored in
        #[arg(short, long, default_value = "letters")]
        out_dir: PathBuf,
        /// Skip flattening and encryption
        #[arg(long)]
        no_protect: bool,
        /// Overrides the configured verification URL
        #[arg(long)]
        verification_url: Option<String>,
        /// Write the generated document's location and hash back into the letter file
        #[arg(long)]
        update: bool,
    },
    /// Print the SHA-256 of a file
    Hash { file: PathBuf },
    /// Show the verification view of a letter
    Verify {
        #[arg(short, long)]
        letter: PathBuf,
        /// A document to check against the stored hash
        #[arg(short, long)]
        document: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };

    match args.command {
        Command::Generate {
            letter,
            approved,
            out_dir,
            no_protect,
            verification_url,
            update,
        } => {
            if no_protect {
                config.protection.enabled = false;
            }
            if let Some(url) = verification_url {
                config.verification_url = url;
            }
            let mut record: LetterRecord = read_json(&letter)?;
            let approved = match approved {
                Some(path) => read_json(&path)?,
                None => ApprovedRollNumbers::from_letter(&record),
            };

            let generator = LetterGenerator::new(config);
            let store = FsDocumentStore::new(out_dir);
            let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
            let persisted =
                runtime.block_on(generator.generate_and_store(&mut record, &approved, &store))?;

            if update {
                write_json(&letter, &record)?;
            }
            println!("{}", to_json(&persisted, &letter)?);
        }
        Command::Hash { file } => {
            let bytes = read(&file)?;
            println!("{}  {}", sha256_hex(&bytes), file.display());
        }
        Command::Verify {
            letter,
            document,
            json,
        } => {
            let record: LetterRecord = read_json(&letter)?;
            let report = VerificationReport::from_letter(&record);
            if json {
                println!("{}", to_json(&report, &letter)?);
            } else {
                print!("{report}");
            }

            if let Some(document) = document {
                match report.check_document(&read(&document)?) {
                    Some(true) => println!("{}: matches", document.display()),
                    Some(false) => return Err(CliError::Tampered(document)),
                    None => println!("{}: no stored document to compare", document.display()),
                }
            }
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let bytes = read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn to_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let json = to_json(value, path)?;
    std::fs::write(path, json).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}
