use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use quest_authoring::config::{AuthoringConfig, DEFAULT_CONFIG_FILE};
use quest_authoring::quest::{
    parse_quest_json, AuthoringState, HotReloadEvent, QuestAssembler, QuestCatalog,
};

/// Quest authoring toolkit.
#[derive(Parser)]
#[command(name = "quest-authoring", version, about = "Assemble and validate quest definitions")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every quest file in the catalog directory
    Lint {
        /// Keep running and re-validate when quest files change
        #[arg(long)]
        watch: bool,
    },

    /// Assemble a quest from an authoring-state snapshot (JSON)
    Assemble {
        /// Path to the authoring-state JSON file
        state: PathBuf,
    },

    /// Load a single quest file and print its canonical form
    Check {
        /// Path to the quest JSON file
        quest: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so command output on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quest_authoring=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, String> {
    let config = AuthoringConfig::load(&cli.config)?;

    match cli.command {
        Commands::Lint { watch } => lint(config, watch).await,
        Commands::Assemble { state } => assemble(config, state),
        Commands::Check { quest } => check(quest),
    }
}

async fn lint(config: AuthoringConfig, watch: bool) -> Result<ExitCode, String> {
    let catalog = Arc::new(QuestCatalog::new(&config.catalog.data_dir));
    catalog.load_all().await?;
    let rejected = report(&catalog).await;

    if !(watch || config.catalog.watch) {
        return Ok(if rejected == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let mut rx = catalog.start_file_watcher()?;
    info!("Watching {:?} for changes, press Ctrl-C to stop", catalog.quests_dir());

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(HotReloadEvent::Reloaded(path)) => {
                    info!("Quest hot-reload: {}", path);
                    report(&catalog).await;
                }
                Some(HotReloadEvent::Error(e)) => error!("Quest hot-reload error: {}", e),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Log the catalog contents; returns the number of rejected files
async fn report(catalog: &QuestCatalog) -> usize {
    let (count, rejections) = catalog.summary().await;
    for rejection in &rejections {
        warn!("{}: {}", rejection.path.display(), rejection.reason);
    }
    info!("{} quest(s) valid, {} rejected", count, rejections.len());
    rejections.len()
}

fn assemble(config: AuthoringConfig, path: PathBuf) -> Result<ExitCode, String> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
    let state: AuthoringState = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse authoring state {:?}: {}", path, e))?;

    let result = QuestAssembler::new(config.assembly)
        .assemble(&state)
        .map_err(|e| format!("Builder misuse: {}", e))?;

    let output = serde_json::to_string_pretty(&result)
        .map_err(|e| format!("Failed to serialize result: {}", e))?;
    println!("{}", output);

    Ok(if result.is_built() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check(path: PathBuf) -> Result<ExitCode, String> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

    match parse_quest_json(&content) {
        Ok(quest) => {
            let output = quest
                .to_json()
                .map_err(|e| format!("Failed to serialize quest: {}", e))?;
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}: {}", path.display(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
