use clap::Parser;
use colored::*;
use env_logger::Env;
use eyre::{Context, Result, eyre};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use tandem::api::HttpDashboardApi;
use tandem::config::Config;
use tandem::domain::{DashboardViewModel, ResolveState};
use tandem::pipeline::DashboardLoader;
use tandem::transport::{HttpDispatcher, ThrottleGate, ThrottledTransport};

const TOKEN_ENV: &str = "TANDEM_TOKEN";

fn setup_logging(default_filter: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tandem")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("tandem.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Wire the production stack: one throttle gate for the whole process
fn build_loader(config: &Config) -> Result<DashboardLoader> {
    let dispatcher = HttpDispatcher::with_timeout(&config.api.base_url, config.request_timeout())
        .map_err(|e| eyre!("{}", e))?;
    let gate = Arc::new(ThrottleGate::new(config.min_interval()));
    let transport = ThrottledTransport::new(Arc::new(dispatcher), gate);
    let api = HttpDashboardApi::new(transport, config.retry_policy());

    Ok(DashboardLoader::new(Arc::new(api), config.pipeline_config()))
}

async fn handle_load_command(
    token: Option<&str>,
    deadline_ms: Option<u64>,
    json: bool,
    verbose: bool,
    config: &Config,
) -> Result<()> {
    let token = match token {
        Some(t) => t.to_string(),
        None => std::env::var(TOKEN_ENV).unwrap_or_default(),
    };

    let loader = build_loader(config)?;
    let deadline = deadline_ms
        .map(Duration::from_millis)
        .or(loader.config().deadline);

    info!("Loading dashboard from {} (deadline: {:?})", config.api.base_url, deadline);
    if verbose {
        println!("{} {}", "Backend:".cyan(), config.api.base_url);
    }

    let view = loader
        .load_with_deadline(&token, deadline)
        .await
        .context("Failed to load dashboard, try again")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_dashboard(&view);
    }
    Ok(())
}

fn print_dashboard(view: &DashboardViewModel) {
    println!("{} {}", "Dashboard for".green(), view.user.display_name().bold());

    match (&view.couple, &view.invitation) {
        (Some(couple), _) => {
            let partner = couple
                .partner
                .as_ref()
                .and_then(|p| p.name.clone().or_else(|| p.email.clone()))
                .unwrap_or_else(|| "partner".to_string());
            println!("  Paired with {}", partner);
        }
        (None, Some(invitation)) => println!("  Invitation {}", invitation.status.yellow()),
        (None, None) => println!("  {}", "Not paired".yellow()),
    }

    let summary = &view.summary;
    println!(
        "  Overall compatibility: {}%  ({} scored, {} pending, {} started)",
        summary.overall_compatibility.to_string().bold(),
        summary.completed_count,
        summary.pending_count,
        summary.total_attempts
    );

    for row in &view.categories {
        let score = match row.score {
            Some(s) => format!("{:.0}", s).green(),
            None => match row.state {
                ResolveState::StatusFailed | ResolveState::ResultFailed => "unavailable".red(),
                _ => "pending".yellow(),
            },
        };
        println!(
            "    {:<28} {:>12}  you: {}  partner: {}",
            row.name,
            score,
            if row.user_completed { "done" } else { "-" },
            if row.partner_completed { "done" } else { "-" }
        );
    }

    if !view.appointments.is_empty() {
        println!("  Upcoming appointments: {}", view.appointments.len());
    }
}

fn handle_config_command(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to render config")?;
    print!("{}", yaml);
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Load {
            token,
            deadline_ms,
            json,
        } => handle_load_command(token.as_deref(), *deadline_ms, *json, cli.is_verbose(), config).await,
        Commands::Config => handle_config_command(config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; it carries the log level
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_filter()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
