//! intentgraph CLI - seed the multilingual intent graph and encode training data

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use intentgraph_core::commands::{self, EncodeRequest, SeedOutcome, SeedSources, StatsReport};
use intentgraph_core::config::Config;
use intentgraph_core::domain::Language;
use intentgraph_core::ingestion::{ConflictPolicy, IngestReport, IngestionOptions, ResolutionStrategy};
use intentgraph_core::storage::{Database, DatabaseConfig};
use tracing::debug;

#[derive(Parser)]
#[command(name = "intentgraph")]
#[command(author, version, about = "Multilingual intent graph and training-data encoder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// SQLite database file (overrides database.path)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the graph from the aligned en/fr/ar datasets
    Seed {
        /// English dataset (carries the provenance)
        #[arg(long)]
        en: PathBuf,
        /// French dataset
        #[arg(long)]
        fr: PathBuf,
        /// Arabic dataset
        #[arg(long)]
        ar: PathBuf,
        /// Seed even when the graph already holds contexts
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        ingestion: IngestionArgs,
    },

    /// Add the records of a single-language dataset
    Ingest {
        /// Language of the dataset
        #[arg(short, long, value_parser = parse_language)]
        lang: Language,
        /// Dataset file
        file: PathBuf,
        #[command(flatten)]
        ingestion: IngestionArgs,
    },

    /// Build the training set of a language and save its encoding artifact
    Encode {
        #[arg(short, long, value_parser = parse_language)]
        lang: Language,
        /// Output directory (overrides encoding.output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Shuffle seed (overrides encoding.shuffle_seed)
        #[arg(long)]
        seed: Option<u64>,
        /// Also write the training set as JSON
        #[arg(long)]
        export: bool,
        /// Encode with the artifact already saved in the output directory
        #[arg(long)]
        reuse: bool,
    },

    /// Encode one utterance with a saved artifact
    Vectorize {
        #[arg(short, long, value_parser = parse_language)]
        lang: Language,
        /// Directory holding the artifact (overrides encoding.output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Utterance to encode
        utterance: String,
    },

    /// Show graph statistics
    Stats,

    /// Inspect registered models
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Default)]
struct IngestionArgs {
    /// How to-links are resolved: two_phase or sequential
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<ResolutionStrategy>,
    /// What to do with codes already in the graph: fail or skip
    #[arg(long, value_parser = parse_conflict_policy)]
    on_conflict: Option<ConflictPolicy>,
}

impl IngestionArgs {
    /// Configured options with command-line overrides applied
    fn options(&self, config: &Config) -> IngestionOptions {
        let mut options = config.ingestion.options();
        if let Some(strategy) = self.strategy {
            options = options.with_strategy(strategy);
        }
        if let Some(on_conflict) = self.on_conflict {
            options = options.with_conflict_policy(on_conflict);
        }
        options
    }
}

#[derive(Subcommand)]
enum ModelAction {
    /// List registered models, newest first
    List {
        #[arg(short, long, value_parser = parse_language)]
        lang: Option<Language>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Reset to defaults
    Reset,
    /// Show the config file path
    Path,
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::parse(s).ok_or_else(|| format!("unsupported language '{}' (expected en, fr or ar)", s))
}

fn parse_strategy(s: &str) -> Result<ResolutionStrategy, String> {
    ResolutionStrategy::parse(s)
        .ok_or_else(|| format!("invalid strategy '{}' (expected two_phase or sequential)", s))
}

fn parse_conflict_policy(s: &str) -> Result<ConflictPolicy, String> {
    ConflictPolicy::parse(s).ok_or_else(|| format!("invalid policy '{}' (expected fail or skip)", s))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        "intentgraph=debug"
    } else {
        "intentgraph=info"
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match level.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Print an error, with its code and suggested fix when it is a core error
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<intentgraph_core::Error>() {
        Some(core) => {
            eprintln!("Error [{}]: {}", core.code(), core);
            if let Some(suggestion) = core.suggestion() {
                eprintln!("  Try: {}", suggestion);
            }
        }
        None => eprintln!("Error: {:#}", err),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    let quiet = cli.quiet;
    let format = cli.format;
    let db_path = cli
        .database
        .clone()
        .unwrap_or_else(|| config.database_path());

    let open_db = || {
        debug!(path = %db_path.display(), "Opening database");
        Database::new(DatabaseConfig::with_path(db_path.clone()))
    };

    match cli.command {
        Commands::Seed {
            en,
            fr,
            ar,
            force,
            ingestion,
        } => {
            let db = open_db().await?;
            let sources = SeedSources { en, fr, ar };
            cmd_seed(&db, &config, &sources, &ingestion, force, format, quiet).await
        }

        Commands::Ingest {
            lang,
            file,
            ingestion,
        } => {
            let db = open_db().await?;
            let report = commands::ingest_language(
                db.pool(),
                lang,
                &file,
                &config.ingestion.actor,
                ingestion.options(&config),
            )
            .await?;
            print_report(&report, format, quiet)
        }

        Commands::Encode {
            lang,
            out,
            seed,
            export,
            reuse,
        } => {
            let db = open_db().await?;
            let request = EncodeRequest::new(
                lang,
                out.unwrap_or_else(|| config.encoding.output_dir.clone()),
                config.ingestion.actor.clone(),
            )
            .with_seed(seed.or(config.encoding.shuffle_seed))
            .with_export(export)
            .reusing_artifact(reuse);
            cmd_encode(&db, &request, format, quiet).await
        }

        Commands::Vectorize {
            lang,
            out,
            utterance,
        } => {
            let dir = out.unwrap_or_else(|| config.encoding.output_dir.clone());
            let vector = commands::vectorize(&dir, lang, &utterance)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&vector)?),
                OutputFormat::Text => {
                    let cells: Vec<String> = vector.iter().map(|x| format!("{}", *x as u8)).collect();
                    println!("[{}]", cells.join(", "));
                }
            }
            Ok(())
        }

        Commands::Stats => {
            let db = open_db().await?;
            let stats = commands::get_stats(db.pool()).await?;
            print_stats(&stats, format)
        }

        Commands::Models { action } => {
            let db = open_db().await?;
            cmd_models(&db, action, format, quiet).await
        }

        Commands::Config { action } => cmd_config(action, quiet),
    }
}

async fn cmd_seed(
    db: &Database,
    config: &Config,
    sources: &SeedSources,
    ingestion: &IngestionArgs,
    force: bool,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let outcome = commands::seed(
        db.pool(),
        sources,
        &config.ingestion.actor,
        ingestion.options(config),
        force,
    )
    .await?;

    match outcome {
        SeedOutcome::Skipped { existing } => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "skipped": true, "existing": existing }));
            } else if !quiet {
                println!("Graph already holds {} contexts, nothing seeded.", existing);
                println!("\nReseed with: intentgraph seed --force --on-conflict skip ...");
            }
            Ok(())
        }
        SeedOutcome::Completed(report) => print_report(&report, format, quiet),
    }
}

fn print_report(report: &IngestReport, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    println!("Ingestion complete:");
    println!("  Inserted: {}", report.inserted);
    if report.skipped > 0 {
        println!("  Skipped (already present): {}", report.skipped);
    }
    println!("  Links created: {}", report.links_created);
    if !report.dropped_links.is_empty() {
        println!("  Dropped links: {}", report.dropped_links.len());
        for link in &report.dropped_links {
            println!("    {} -> {} (unknown code)", link.from, link.to);
        }
    }
    Ok(())
}

async fn cmd_encode(
    db: &Database,
    request: &EncodeRequest,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let outcome = commands::encode(db.pool(), request).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    println!("Encoded {} training set:", outcome.language);
    println!("  Examples: {}", outcome.examples);
    println!("  Vocabulary: {} tokens", outcome.vocabulary);
    println!("  Labels: {}", outcome.labels);
    println!("  Fingerprint: {}", &outcome.fingerprint[..12.min(outcome.fingerprint.len())]);
    println!("  Artifact: {}", outcome.artifact_path.display());
    if let Some(path) = &outcome.training_set_path {
        println!("  Training set: {}", path.display());
    }
    println!("  Model: {}", outcome.model_id);
    Ok(())
}

fn print_stats(stats: &StatsReport, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("Graph:");
    println!("  Contexts: {}", stats.graph.contexts);
    println!("  Contributions: {}", stats.graph.contributions);
    println!("  Patterns: {}", stats.graph.patterns);
    println!("  Responses: {}", stats.graph.responses);
    println!("  Relations: {}", stats.graph.relations);
    println!("Labelled contexts:");
    for (language, count) in &stats.labelled {
        println!("  {}: {}", language, count);
    }
    println!("Users: {}", stats.users);
    println!("Models: {}", stats.models);
    Ok(())
}

async fn cmd_models(
    db: &Database,
    action: ModelAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        ModelAction::List { lang } => {
            let models = commands::list_models(db.pool(), lang).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&models)?);
            } else if models.is_empty() {
                if !quiet {
                    println!("No models registered.");
                    println!("\nCreate one with: intentgraph encode --lang <lang>");
                }
            } else {
                if !quiet {
                    println!("Models:");
                }
                for m in models {
                    println!(
                        "  {} - {} [{}] {} ({})",
                        &m.id[..8],
                        m.language,
                        m.state.as_str(),
                        m.path,
                        m.created_at.to_rfc3339()
                    );
                }
            }
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
