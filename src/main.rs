//! sft-pro CLI: PDF/DOCX → JSONL fine-tuning data via a local Ollama model.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};

use sft_pro::config::{ConfigError, SftConfig};
use sft_pro::extract;
use sft_pro::llm::OllamaClient;
use sft_pro::models::{ModelScanner, ModelSelection, choose_by_number, select_model};
use sft_pro::paths::SftPaths;
use sft_pro::pipeline::{convert_extracted, resolve_output_path};

#[derive(Parser)]
#[command(
    name = "sft-pro",
    version,
    about = "Turn PDF and DOCX documents into JSONL fine-tuning datasets"
)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/sft-pro/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ollama base URL.
    #[arg(long, global = true)]
    ollama_url: Option<String>,

    /// Maximum characters of document text sent to the model.
    #[arg(long, global = true)]
    text_limit: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a document and generate a JSONL dataset from it.
    Generate {
        /// Input document (PDF or DOCX).
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL file; `.jsonl` is appended if missing (defaults to the
        /// input name with .jsonl).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ollama model to use, e.g. "llama3:latest".
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Print the text that would be sent to the model.
    Extract {
        /// Input document (PDF or DOCX).
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List locally installed Ollama models.
    Models,

    /// Check whether the Ollama server is reachable.
    Status,

    /// Show or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = SftPaths::resolve().ok();
    let config_path = match (&cli.config, &paths) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(paths)) => Some(paths.config_file()),
        (None, None) => None,
    };
    let mut config = match &config_path {
        Some(path) => SftConfig::load_or_default(path)?,
        None => SftConfig::default(),
    };
    if let Some(url) = cli.ollama_url {
        config.ollama_url = url;
    }
    if let Some(limit) = cli.text_limit {
        config.text_limit = limit;
    }

    let scanner = match (&config.manifests_dir, &paths) {
        (Some(dir), _) => ModelScanner::new(dir.clone()),
        (None, Some(paths)) => ModelScanner::from_paths(paths),
        (None, None) => {
            tracing::warn!("cannot determine home directory; no installed models will be found");
            ModelScanner::new(PathBuf::new())
        }
    };

    match cli.command {
        Commands::Generate {
            input,
            output,
            model,
        } => {
            if !input.is_file() {
                return Err(miette!(
                    "input file '{}' does not exist",
                    input.display()
                ));
            }

            let requested = model.or_else(|| config.default_model.clone());
            let model = resolve_model(select_model(scanner.list_models(), requested))?;
            let output = resolve_output_path(&input, output.as_deref());

            let client = OllamaClient::new(config.ollama_config());
            println!("Extracting text from {}...", display_name(&input));
            let doc = extract::extract_text(&input, config.text_limit)?;
            println!("Generating JSONL with Ollama model: {model}...");
            let outcome = convert_extracted(&client, &doc, &output, &model)?;

            if outcome.truncated {
                tracing::warn!(
                    limit = config.text_limit,
                    "document text was truncated before generation"
                );
            }
            if !outcome.report.is_clean() {
                tracing::warn!(
                    invalid = outcome.report.invalid_lines.len(),
                    lines = outcome.report.lines,
                    first = ?outcome.report.invalid_lines.first(),
                    "model output contains lines that are not JSON objects"
                );
            }
            let shown = std::fs::canonicalize(&outcome.output).unwrap_or(outcome.output);
            println!("Successfully saved JSONL to {}", shown.display());
        }

        Commands::Extract { input } => {
            let doc = extract::extract_text(&input, config.text_limit)?;
            print!("{}", doc.text);
            if !doc.text.ends_with('\n') {
                println!();
            }
        }

        Commands::Models => {
            let models = scanner.list_models();
            if models.is_empty() {
                println!(
                    "No Ollama models found in {}",
                    scanner.manifests_dir().display()
                );
            }
            for model in models {
                println!("{model}");
            }
        }

        Commands::Status => {
            let client = OllamaClient::new(config.ollama_config());
            if !client.probe() {
                return Err(miette!(
                    help = "Start Ollama with `ollama serve`.",
                    "Ollama is not reachable at {}",
                    client.base_url()
                ));
            }
            println!("Ollama is running at {}", client.base_url());
            let remote = client.remote_models()?;
            println!("Server reports {} model(s):", remote.len());
            for name in remote {
                println!("  {name}");
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => print!("{}", config.to_toml()?),
            ConfigAction::Init { force } => {
                let path = config_path
                    .ok_or_else(|| miette!("cannot determine config path; pass --config"))?;
                init_config(&path, force)?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

/// Turn a model selection into a model name, prompting on stdin when several
/// are installed.
fn resolve_model(selection: ModelSelection) -> Result<String> {
    match selection {
        ModelSelection::Requested(model) => Ok(model),
        ModelSelection::Only(model) => {
            println!("Found one model, using '{model}' by default.");
            Ok(model)
        }
        ModelSelection::NoneInstalled => Err(miette!(
            help = "Install a model first, e.g. `ollama pull llama3`.",
            "No Ollama models found"
        )),
        ModelSelection::Ambiguous(models) => {
            println!("Multiple Ollama models found. Please select one:");
            for (i, m) in models.iter().enumerate() {
                println!("  {}: {m}", i + 1);
            }
            print!("Enter number: ");
            std::io::stdout().flush().into_diagnostic()?;

            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .into_diagnostic()?;
            choose_by_number(&models, &line).ok_or_else(|| miette!("Invalid selection. Aborting."))
        }
    }
}

fn init_config(path: &Path, force: bool) -> std::result::Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.display().to_string(),
        });
    }
    SftConfig::default().save(path)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
