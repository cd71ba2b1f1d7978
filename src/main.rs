// Excel Interview - command line driver

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use excel_interview::logging::init_tracing;
use excel_interview::models::session::SessionState;
use excel_interview::models::settings::{AppConfig, DatabaseMode};
use excel_interview::storage::{ConfigService, Database};
use excel_interview::{
    EngineSettings, InMemorySessionStore, InterviewEngine, SessionStore, SqliteSessionStore,
};
use excel_interview_llm::OpenAIProvider;

#[derive(Parser)]
#[command(name = "excel-interview")]
#[command(version, about = "Adaptive conversational Excel skills assessment", long_about = None)]
struct Cli {
    /// Path to config.json (defaults to ~/.excel-interview/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep sessions in memory instead of the SQLite database
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive interview on stdin/stdout
    Run,
    /// Show progress of a session
    Status { session_id: String },
    /// Print the final report of a session
    Report { session_id: String },
    /// Remove expired and abandoned sessions
    Cleanup,
    /// Check gateway configuration and store availability
    Health,
}

fn open_store(config: &AppConfig, memory: bool) -> Result<Arc<dyn SessionStore>> {
    if memory || config.database == DatabaseMode::Memory {
        return Ok(Arc::new(InMemorySessionStore::new()));
    }
    let db = Database::new().context("failed to open session database")?;
    Ok(Arc::new(SqliteSessionStore::new(&db)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_interview(engine: &InterviewEngine) -> Result<()> {
    let session_id = engine.create_session(None).await?;
    let opening = engine.start_interview(&session_id).await?;

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("Session {}\n\n{}\n\n> ", session_id, opening.message).as_bytes())
        .await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let answer = line.trim();
        if answer.is_empty() {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            continue;
        }

        let reply = engine.process_response(&session_id, answer).await?;
        let progress = match (reply.question_number, reply.total_questions) {
            (Some(n), Some(total)) if reply.state != SessionState::Completed => {
                format!("[Question {} of {}]\n", n, total)
            }
            _ => String::new(),
        };
        stdout
            .write_all(format!("\n{}{}\n\n", progress, reply.message).as_bytes())
            .await?;

        if reply.state == SessionState::Completed {
            if let Some(report) = &reply.report {
                stdout
                    .write_all(format!("{}\n", serde_json::to_string_pretty(report)?).as_bytes())
                    .await?;
            }
            break;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }
    stdout.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::load(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;
    let config = config_service.get_config_clone();
    init_tracing(&config);

    let store = open_store(&config, cli.memory)?;
    let provider = OpenAIProvider::new(config.provider.clone())
        .context("failed to build completion gateway client")?;
    let engine = InterviewEngine::new(store, Arc::new(provider), EngineSettings::from(&config));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_interview(&engine).await?,
        Commands::Status { session_id } => print_json(&engine.get_status(&session_id).await?)?,
        Commands::Report { session_id } => print_json(&engine.get_report(&session_id).await?)?,
        Commands::Cleanup => {
            let removed = engine.cleanup_old_sessions().await?;
            println!("Removed {} session(s)", removed);
        }
        Commands::Health => print_json(&engine.health().await)?,
    }

    Ok(())
}
