//! Scripture IR CLI
//!
//! Validates, hashes, verifies, and remaps IR corpora stored as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use scripture_ir::config::OutputFormat;
use scripture_ir::version::check_corpus_version;
use scripture_ir::{
    checksum, validation, Corpus, IrConfig, IrError, MappingRegistry, ValidationReport,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scripture-ir")]
#[command(about = "Validate, hash, and remap scripture IR corpora")]
struct Cli {
    /// Config file (defaults to scripture-ir.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check structural invariants of a corpus
    Validate {
        corpus: PathBuf,
        /// Also check that span, anchor, and annotation ids resolve
        #[arg(long)]
        references: bool,
    },

    /// Stamp every content block with its text hash
    Hash {
        corpus: PathBuf,
        /// Write the stamped corpus here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List content blocks whose stored hash no longer matches
    Verify { corpus: PathBuf },

    /// Remap a corpus into another versification system
    Map {
        corpus: PathBuf,
        /// Target versification system
        #[arg(short, long)]
        to: Option<String>,
        /// Directory of mapping table JSON files
        #[arg(long)]
        tables: Option<PathBuf>,
        /// Write the remapped corpus here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the tokens of a string
    Tokenize { text: String },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration to a file
    Init {
        #[arg(default_value = "scripture-ir.toml")]
        path: PathBuf,
    },
    /// Print the effective configuration
    Show,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns `Ok(false)` when the command ran but found problems
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = IrConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Validate { corpus, references } => {
            let corpus = read_corpus(&corpus)?;
            let mut errors = validation::validate_corpus(&corpus);
            if references || config.validation.check_references {
                errors.extend(validation::validate_references(&corpus));
            }

            let report = ValidationReport::from(errors);
            if report.is_valid() {
                println!("✅ {} - valid", corpus.id);
            } else {
                println!("❌ {} - {}", corpus.id, report);
            }
            Ok(report.is_valid())
        }

        Commands::Hash { corpus, output } => {
            let mut corpus = read_corpus(&corpus)?;
            let stamped = checksum::compute_all_hashes(&mut corpus);
            let signature = checksum::hash_corpus(&corpus)?;
            println!("Stamped {} content block(s)", stamped);
            println!("Corpus hash: {}", signature);
            if let Some(path) = output {
                write_corpus(corpus, &path, &config)?;
                println!("Wrote {}", path.display());
            }
            Ok(true)
        }

        Commands::Verify { corpus } => {
            let corpus = read_corpus(&corpus)?;
            let failed = checksum::verify_all_hashes(&corpus);
            let unhashed = checksum::unhashed_blocks(&corpus);

            if !unhashed.is_empty() {
                println!("⚠️  {} block(s) carry no hash and were not checked", unhashed.len());
            }
            if failed.is_empty() {
                println!("✅ {} - all stored hashes match", corpus.id);
                return Ok(true);
            }

            for id in &failed {
                println!("  ❌ {}", id);
            }
            if config.validation.fail_on_hash_mismatch {
                return Err(IrError::integrity_failure(&failed).into());
            }
            Ok(false)
        }

        Commands::Map {
            corpus,
            to,
            tables,
            output,
        } => {
            let corpus = read_corpus(&corpus)?;
            let Some(target) = to.or_else(|| config.mapping.target_versification.clone()) else {
                bail!("no target versification: pass --to or set mapping.target_versification");
            };
            let Some(dir) = tables.or_else(|| config.tables_dir()) else {
                bail!("no mapping tables: pass --tables or set mapping.tables_dir");
            };

            let mut registry = MappingRegistry::new();
            let loaded = registry
                .load_dir(&dir)
                .with_context(|| format!("loading mapping tables from {}", dir.display()))?;
            println!("Loaded {} mapping table(s)", loaded);

            let table = registry
                .get_chained_mapping(&corpus.versification, &target)
                .ok_or_else(|| IrError::TableNotFound {
                    from: corpus.versification.clone(),
                    to: target.clone(),
                })?;
            let (mapped, report) = if config.mapping.assess_loss {
                table.apply_to_corpus_assessed(&corpus)
            } else {
                table.apply_to_corpus(&corpus)
            };

            println!(
                "🔀 {} -> {} via {} ({}: {})",
                report.source_format,
                report.target_format,
                table.id,
                report.loss_class,
                report.loss_class.description()
            );
            for lost in &report.lost_elements {
                println!("  - {} [{}]: {}", lost.path, lost.element_type, lost.reason);
            }
            for warning in &report.warnings {
                println!("  ⚠️  {}", warning);
            }

            if let Some(path) = output {
                write_corpus(mapped, &path, &config)?;
                println!("Wrote {}", path.display());
            }
            Ok(true)
        }

        Commands::Tokenize { text } => {
            for token in scripture_ir::tokenize(&text) {
                println!(
                    "{:>4} [{:>4}, {:>4}) {:<12} {:?}",
                    token.index, token.char_start, token.char_end, token.token_type, token.text
                );
            }
            Ok(true)
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { path } => {
                if path.exists() {
                    bail!("{} already exists", path.display());
                }
                IrConfig::default().save(&path)?;
                println!("Wrote {}", path.display());
                Ok(true)
            }
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
                Ok(true)
            }
        },
    }
}

fn read_corpus(path: &Path) -> anyhow::Result<Corpus> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let corpus = Corpus::from_json(&content).with_context(|| format!("decoding {}", path.display()))?;
    if let Err(e) = check_corpus_version(&corpus) {
        tracing::warn!(corpus = %corpus.id, "{}", e);
    }
    Ok(corpus)
}

fn write_corpus(mut corpus: Corpus, path: &Path, config: &IrConfig) -> anyhow::Result<()> {
    if config.hashing.stamp_on_write {
        checksum::compute_all_hashes(&mut corpus);
    }
    let content = match config.output.format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&corpus)?,
        OutputFormat::Compact => corpus.to_json()?,
    };
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
