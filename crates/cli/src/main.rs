//! Docgen CLI
//!
//! Command-line interface for validating code example metadata and
//! generating README pages from it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use docgen_common::{MetadataErrors, ToolConfig};
use docgen_generator::{gather_data, write_super_summary, ReadmeRenderer, WriteOutcome};
use docgen_parser::{DocGen, LoadOptions};
use docgen_snippets::SnippetIndex;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "docgen")]
#[command(version, about = "Validate code example metadata and generate READMEs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tool configuration file (built-in language layout if not specified)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate all metadata, printing every error found
    #[command(after_help = "EXAMPLES:\n  \
        # Validate metadata only\n  \
        docgen validate --metadata .doc_gen/metadata\n\n  \
        # Also check snippet tags against the source tree, with schemas\n  \
        docgen validate \\\n    \
        --metadata .doc_gen/metadata \\\n    \
        --root . \\\n    \
        --schema .doc_gen/validation \\\n    \
        --strict")]
    Validate {
        /// Directory holding sdks.yaml, services.yaml and *_metadata.yaml
        #[arg(short, long)]
        metadata: PathBuf,

        /// Source tree to check snippet tags against
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Directory holding the schema files
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Report missing optional fields too
        #[arg(long)]
        strict: bool,

        /// Print errors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render per-language, per-service README pages
    #[command(after_help = "EXAMPLES:\n  \
        # Render every README\n  \
        docgen readme --metadata .doc_gen/metadata --root .\n\n  \
        # Render the Go V2 S3 README only\n  \
        docgen readme --metadata .doc_gen/metadata --root . \\\n    \
        --language Go --sdk-version 2 --service s3\n\n  \
        # Fail if any README is out of date\n  \
        docgen readme --metadata .doc_gen/metadata --root . --check")]
    Readme {
        /// Directory holding the metadata files
        #[arg(short, long)]
        metadata: PathBuf,

        /// Source tree the READMEs are written into
        #[arg(short, long)]
        root: PathBuf,

        /// Only this language
        #[arg(short, long)]
        language: Option<String>,

        /// Only this SDK version
        #[arg(long)]
        sdk_version: Option<u32>,

        /// Only this service
        #[arg(long)]
        service: Option<String>,

        /// Compare with the files on disk instead of writing
        #[arg(long)]
        check: bool,
    },

    /// List every snippet tag in a source tree
    Snippets {
        /// Source tree to scan
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Print the index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Collect README overviews into a root README
    Summarize {
        /// Tree to summarize; its README.md is replaced
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate {
            metadata,
            root,
            schema,
            strict,
            json,
        } => validate_command(&config, &metadata, root.as_deref(), schema, strict, json),
        Commands::Readme {
            metadata,
            root,
            language,
            sdk_version,
            service,
            check,
        } => readme_command(
            &config,
            &metadata,
            &root,
            Filter {
                language: language.as_deref(),
                sdk_version,
                service: service.as_deref(),
            },
            check,
        ),
        Commands::Snippets { root, json } => snippets_command(&config, &root, json),
        Commands::Summarize { root } => summarize_command(&config, &root),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ToolConfig> {
    match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            ToolConfig::load(path).context("Failed to load tool configuration")
        }
        None => Ok(ToolConfig::default()),
    }
}

fn load_metadata(metadata: &Path, options: &LoadOptions) -> Result<(DocGen, MetadataErrors)> {
    println!("{} Loading metadata from {}", "→".cyan(), metadata.display());
    let (doc_gen, errors) =
        DocGen::from_dir(metadata, options).context("Failed to load metadata")?;
    println!(
        "{} Loaded {} SDKs, {} services, {} examples",
        "✓".green(),
        doc_gen.sdks.len(),
        doc_gen.services.len(),
        doc_gen.examples.len()
    );
    Ok((doc_gen, errors))
}

fn validate_command(
    config: &ToolConfig,
    metadata: &Path,
    root: Option<&Path>,
    schema_dir: Option<PathBuf>,
    strict: bool,
    json: bool,
) -> Result<()> {
    let options = LoadOptions { strict, schema_dir };
    let (doc_gen, mut errors) = load_metadata(metadata, &options)?;

    if let Some(root) = root {
        println!("{} Indexing snippets under {}", "→".cyan(), root.display());
        let (index, index_errors) =
            SnippetIndex::build(root, &config.summary_ignore).context("Failed to index snippets")?;
        println!("{} Indexed {} snippet tags", "✓".green(), index.len());

        errors.extend(index_errors)?;
        errors.extend(index.validate(&doc_gen)?)?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&errors).context("Failed to serialize errors")?
        );
    } else {
        for error in &errors {
            println!("  {} {}", "✗".red(), error);
        }
    }

    if !errors.is_empty() {
        bail!("{} metadata errors found", errors.len());
    }

    println!("\n{}", "✓ Metadata is valid".green().bold());
    Ok(())
}

struct Filter<'a> {
    language: Option<&'a str>,
    sdk_version: Option<u32>,
    service: Option<&'a str>,
}

fn readme_command(
    config: &ToolConfig,
    metadata: &Path,
    root: &Path,
    filter: Filter<'_>,
    check: bool,
) -> Result<()> {
    let (doc_gen, errors) = load_metadata(metadata, &LoadOptions::default())?;
    if !errors.is_empty() {
        for error in &errors {
            println!("  {} {}", "✗".red(), error);
        }
        bail!("Metadata has {} errors; run `docgen validate` first", errors.len());
    }

    println!("{} Indexing snippets under {}", "→".cyan(), root.display());
    let (index, index_errors) =
        SnippetIndex::build(root, &config.summary_ignore).context("Failed to index snippets")?;
    for error in &index_errors {
        println!("  {} {}", "!".yellow(), error);
    }

    let mut renderer =
        ReadmeRenderer::new(&doc_gen, config, Some(&index)).context("Failed to load templates")?;
    let targets: Vec<_> = renderer
        .targets()
        .into_iter()
        .filter(|t| filter.language.map_or(true, |l| t.language == l))
        .filter(|t| filter.sdk_version.map_or(true, |v| t.sdk_version == v))
        .filter(|t| filter.service.map_or(true, |s| t.service == s))
        .collect();

    if targets.is_empty() {
        println!("{} No README matches the selection", "!".yellow());
        return Ok(());
    }

    let mut stale = Vec::new();
    for target in &targets {
        let path = renderer.readme_path(target)?;
        let outcome = renderer
            .write(root, target, check)
            .with_context(|| format!("Failed to render {}", path.display()))?;

        match outcome {
            WriteOutcome::Written => println!("  {} {}", "✓".green(), path.display()),
            WriteOutcome::Unchanged => println!("  {} {}", "=".dimmed(), path.display()),
            WriteOutcome::Stale => {
                println!("  {} {} is out of date", "✗".red(), path.display());
                stale.push(path);
            }
        }
    }

    if !stale.is_empty() {
        bail!("{} READMEs are out of date", stale.len());
    }

    println!(
        "\n{}",
        format!("✓ {} READMEs {}", targets.len(), if check { "checked" } else { "rendered" })
            .green()
            .bold()
    );
    Ok(())
}

fn snippets_command(config: &ToolConfig, root: &Path, json: bool) -> Result<()> {
    let (index, errors) =
        SnippetIndex::build(root, &config.summary_ignore).context("Failed to index snippets")?;

    if json {
        let snippets: Vec<_> = index.iter().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&snippets).context("Failed to serialize snippets")?
        );
    } else {
        for snippet in index.iter() {
            println!(
                "{} {}#L{}",
                snippet.tag.cyan(),
                snippet.file,
                snippet.line_start
            );
        }
        println!(
            "\n{} {} snippet tags under {}",
            "✓".green(),
            index.len(),
            index.root().display()
        );
    }

    for error in &errors {
        eprintln!("  {} {}", "!".yellow(), error);
    }
    Ok(())
}

fn summarize_command(config: &ToolConfig, root: &Path) -> Result<()> {
    println!("{} Gathering READMEs under {}", "→".cyan(), root.display());
    let summaries = gather_data(root, config).context("Failed to gather READMEs")?;
    for summary in &summaries {
        println!("  {} {}", "•".cyan(), summary.path.display());
    }

    let path = write_super_summary(root, &summaries).context("Failed to write summary")?;
    println!(
        "\n{} Wrote {} with {} entries",
        "✓".green().bold(),
        path.display(),
        summaries.len()
    );
    Ok(())
}
