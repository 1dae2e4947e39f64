mod render;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use arboard::Clipboard;
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings_from, normalize_base_url, DEFAULT_CONFIG_FILE},
    tools::ToolAction,
    ClientSettings, ClipboardSink, HttpGateway, Session, SessionHandle, StatsSummary,
    ToolDescriptor,
};
use shared::{
    domain::ToolId,
    protocol::{FastaInput, TransformResult},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "biotools", about = "Sequence toolbox client")]
struct Args {
    /// Backend base url; overrides config and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Print raw JSON responses.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session with live statistics (default).
    Interactive,
    /// Run one tool on a sequence.
    Run {
        #[arg(long)]
        tool: ToolId,
        sequence: String,
    },
    /// Fetch statistics for a sequence.
    Stats { sequence: String },
    /// Run a tool over every record of a FASTA file.
    Batch {
        #[arg(long)]
        tool: ToolId,
        file: PathBuf,
    },
    /// Show backend service information.
    Info,
    /// List available tools.
    Tools,
}

struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().context("failed to open clipboard")?;
        clipboard
            .set_text(text.to_string())
            .context("failed to write clipboard")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings_from(&args.config, |key| std::env::var(key).ok())?;
    if let Some(url) = &args.api_url {
        settings.api_base_url = normalize_base_url(url)?;
    }
    let gateway = HttpGateway::from_settings(&settings)?;
    info!(api = gateway.base_url(), "using backend");

    match args.command.unwrap_or(Command::Interactive) {
        Command::Interactive => interactive(gateway, &settings).await,
        Command::Run { tool, sequence } => run_tool(&gateway, tool, &sequence, args.json).await,
        Command::Stats { sequence } => run_tool(&gateway, ToolId::Stats, &sequence, args.json).await,
        Command::Batch { tool, file } => batch(&gateway, tool, &file, args.json).await,
        Command::Info => {
            let service = gateway.service_info().await.map_err(|err| anyhow!(err.user_message()))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&service)?);
            } else {
                render::print_service_info(&service);
            }
            Ok(())
        }
        Command::Tools => {
            render::print_tools();
            Ok(())
        }
    }
}

async fn run_tool(gateway: &HttpGateway, tool: ToolId, sequence: &str, json: bool) -> Result<()> {
    if sequence.trim().is_empty() {
        bail!("sequence required");
    }
    let outcome = ToolDescriptor::for_id(tool)
        .invoke(gateway, sequence)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    match outcome {
        TransformResult::Sequence(output) => render::print_output(&output),
        TransformResult::Statistics(stats) => render::print_stats(&StatsSummary::from_stats(&stats)),
    }
    Ok(())
}

async fn batch(gateway: &HttpGateway, tool: ToolId, file: &Path, json: bool) -> Result<()> {
    let fasta_content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read FASTA file '{}'", file.display()))?;
    let input = FastaInput {
        fasta_content,
        sequence_type: None,
    };

    match ToolDescriptor::for_id(tool).action {
        ToolAction::Transform(operation) => {
            let batch = gateway
                .batch_transform(operation, &input)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
                return Ok(());
            }
            batch.results.iter().for_each(render::print_output);
            render::print_batch_errors(&batch.errors);
            eprintln!("{}/{} sequences processed", batch.success_count, batch.total_count);
        }
        ToolAction::Statistics => {
            let batch = gateway
                .batch_stats(&input)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
                return Ok(());
            }
            for stats in &batch.results {
                if let Some(id) = &stats.sequence_id {
                    println!(">{id}");
                }
                render::print_stats(&StatsSummary::from_stats(stats));
            }
            render::print_batch_errors(&batch.errors);
            eprintln!("{}/{} sequences processed", batch.success_count, batch.total_count);
        }
    }
    Ok(())
}

async fn interactive(gateway: HttpGateway, settings: &ClientSettings) -> Result<()> {
    let session = Session::spawn(Arc::new(gateway), Arc::new(SystemClipboard), settings);
    println!("Type a sequence to analyse it. Commands: :tool <id>, :tools, :clear, :copy, :quit");

    let mut updates = session.subscribe();
    let mut shown = updates.borrow_and_update().clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if !handle_line(&session, line.trim_end()).await? {
                    break;
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                render::print_changes(&shown, &current);
                shown = current;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

/// Returns `false` once the user asked to quit.
async fn handle_line(session: &SessionHandle, line: &str) -> Result<bool> {
    let Some(command) = line.strip_prefix(':') else {
        session.set_sequence(line).await?;
        return Ok(true);
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "q"), _) => return Ok(false),
        (Some("clear"), _) => session.clear_all().await?,
        (Some("copy"), _) => session.copy_result().await?,
        (Some("tools"), _) => render::print_tools(),
        (Some("tool" | "t"), Some(id)) => match id.parse::<ToolId>() {
            Ok(tool) => session.invoke_tool(tool).await?,
            Err(err) => warn!(error = %err, "unknown tool"),
        },
        _ => println!("unknown command ':{command}'"),
    }
    Ok(true)
}
