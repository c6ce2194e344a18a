mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("SPRINTBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        tracing::debug!("Command failed: {:?}", err);
        output::output_error(&format!("{:#}", err));
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            "sprintboard",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let file_path = cli
        .file
        .ok_or_else(|| anyhow::anyhow!("--file is required for board operations"))?;
    let ctx = CliContext::load(&file_path, cli.config.as_deref(), cli.org).await?;

    match cli.command {
        Commands::Project(cmd) => handlers::project::handle(&ctx, cmd.action).await,
        Commands::Sprint(cmd) => handlers::sprint::handle(&ctx, cmd.action).await,
        Commands::Issue(cmd) => handlers::issue::handle(&ctx, cmd.action).await,
        Commands::Board(cmd) => handlers::board::handle(&ctx, cmd.action).await,
        Commands::Completions { .. } => Ok(()),
    }
}
