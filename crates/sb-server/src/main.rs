use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;

use sb_config::SkillbenchConfig;
use sb_db::service::SkillService;
use sb_server::AppState;
use sb_server::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("skillbench error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = SkillbenchConfig::load_with_dotenv().context("failed to load configuration")?;

    match cli.command {
        Commands::Serve { bind } => serve(config, bind).await,
        Commands::Migrate => {
            SkillService::from_config(&config.database)
                .await
                .context("failed to open database")?;
            tracing::info!("database migrations applied");
            Ok(())
        }
        Commands::Config => {
            let shown = toml::to_string_pretty(&config.redacted())
                .context("failed to render configuration")?;
            println!("{shown}");
            Ok(())
        }
    }
}

async fn serve(mut config: SkillbenchConfig, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    config.validate_for_server()?;
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind '{}'", config.server.bind))?;

    let svc = SkillService::from_config(&config.database)
        .await
        .context("failed to open database")?;
    let state = AppState::from_config(svc, config).context("failed to initialize Clerk")?;
    sb_server::serve(state, addr).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SKILLBENCH_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
