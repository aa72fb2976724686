mod config;
mod console;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use runtime::tools::crypto::default_registry;
use runtime::{CryptoCompare, OpenAiBackend, Session, ToolRegistry};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use console::ConsoleObserver;
use error::Result;

const CONFIG_FILE: &str = "parley.toml";

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Chat with a model that can look up cryptocurrency prices", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Model to use, overriding the configuration
    #[arg(short, long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// List the tools advertised to the model
    Tools,
}

#[tokio::main]
async fn main() {
    // Load .env before logging so RUST_LOG from it takes effect.
    let env_file = dotenvy::dotenv();
    init_logging();

    match env_file {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => error!(error = %e, "failed to load environment file"),
    }

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(model) = cli.model {
        config.backend.model = model;
    }

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(&config).await,
        Some(Commands::Tools) => cmd_tools(&config),
    }
}

fn build_registry(config: &Config) -> ToolRegistry {
    let source = CryptoCompare::with_base_url(&config.tools.quote_base_url);
    default_registry(Arc::new(source))
}

async fn cmd_chat(config: &Config) -> Result<()> {
    println!("parley v{}", env!("CARGO_PKG_VERSION"));

    let mut builder = OpenAiBackend::builder(config.api_key()?, &config.backend.model)
        .base_url(&config.backend.base_url);
    if let Some(temperature) = config.backend.temperature {
        builder = builder.temperature(temperature);
    }
    let backend = builder.build();
    info!(backend = %backend, "backend ready");

    let tools = Arc::new(build_registry(config));
    let mut session = Session::new(
        backend,
        tools,
        config.session.system_prompt.as_str(),
        ConsoleObserver,
    );
    println!("Session ID: {}", session.id);
    println!("Model: {}", config.backend.model);
    println!("Type 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        match session.chat(input).await {
            Ok(outcome) => debug!(
                tool = outcome.tool.as_ref().map(|t| t.call.name.as_str()),
                prompt_tokens = outcome.usage.prompt_tokens,
                completion_tokens = outcome.usage.completion_tokens,
                "turn complete"
            ),
            Err(e) => {
                error!(error = %e, "turn aborted");
                eprintln!("Error: {e}\n");
            }
        }
    }

    println!("\nSession ended.");
    Ok(())
}

fn cmd_tools(config: &Config) -> Result<()> {
    let registry = build_registry(config);

    for spec in registry.list_definitions() {
        println!("{}  {}", spec.name, spec.description);
        if let Some(props) = spec.parameters["properties"].as_object() {
            for (name, schema) in props {
                let kind = schema["type"].as_str().unwrap_or("any");
                println!("    {name}: {kind}");
            }
        }
    }

    Ok(())
}
