use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;

mod api;
mod config;
mod errors;
mod models;
mod normalize;

use crate::api::jira::JiraClient;
use crate::config::settings::{Overrides, Settings};
use crate::errors::JiraError;

#[derive(Parser)]
#[command(name = "jira")]
#[command(version = "0.1.0")]
#[command(about = "JIRA Command Line Tool", long_about = None)]
struct Cli {
    /// config file (default is $HOME/.jira.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JIRA endpoint url (e.g., https://company.atlassian.net)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// JIRA username. email format
    #[arg(long, global = true)]
    username: Option<String>,

    /// JIRA password or API token
    #[arg(long, global = true)]
    password: Option<String>,

    /// display debugging logs
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an issue and print it as normalized JSON
    Issue {
        /// (e.g., PROJ-1234)
        key: Option<String>,
    },

    /// List the issue types that can be created in a project
    IssueTypes {
        /// Project key
        project: String,
    },

    /// List the fields offered when creating an issue type in a project
    CreateFields {
        /// Project key
        project: String,
        /// Issue type id (see `jira issue-types`)
        type_id: String,
    },

    /// Print every field definition known to the server
    Fields,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let overrides = Overrides {
        config: cli.config,
        endpoint: cli.endpoint,
        username: cli.username,
        password: cli.password,
        debug: cli.debug,
    };

    if let Err(e) = run(cli.command, &overrides).await {
        eprintln!("\n{:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, overrides: &Overrides) -> anyhow::Result<()> {
    let settings = Settings::load(overrides).context("Settings::load")?;
    init_tracing(settings.debug);
    settings.validate()?;

    let jira = JiraClient::new(
        settings.endpoint.clone(),
        settings.username.clone(),
        settings.password.clone(),
    )
    .context("JiraClient::new")?;

    match command {
        Commands::Issue { key } => handle_issue(&jira, key.as_deref()).await,
        Commands::IssueTypes { project } => handle_issue_types(&jira, &project).await,
        Commands::CreateFields { project, type_id } => {
            handle_create_fields(&jira, &project, &type_id).await
        }
        Commands::Fields => handle_fields(&jira).await,
    }
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn require_issue_key(key: Option<&str>) -> Result<&str, JiraError> {
    match key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(JiraError::UserInput("Issue key required".to_string())),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

async fn handle_issue(jira: &JiraClient, key: Option<&str>) -> anyhow::Result<()> {
    let key = require_issue_key(key)?;

    eprintln!("{}", "  Loading field definitions...".dimmed());
    let catalog = jira.load_fields().await.context("client.load_fields")?;

    eprintln!("{}", format!("  Fetching issue {}...", key).dimmed());
    let issue = jira
        .get_issue(key, &catalog)
        .await
        .with_context(|| format!("client.get_issue({})", key))?;

    print_json(&issue)
}

async fn handle_issue_types(jira: &JiraClient, project: &str) -> anyhow::Result<()> {
    eprintln!("{}", format!("  Fetching issue types for {}...", project).dimmed());
    let issue_types = jira
        .get_issue_types(project)
        .await
        .context("client.get_issue_types")?;

    print_json(&issue_types)
}

async fn handle_create_fields(jira: &JiraClient, project: &str, type_id: &str) -> anyhow::Result<()> {
    eprintln!(
        "{}",
        format!("  Fetching fields for {} / {}...", project, type_id).dimmed()
    );
    let fields = jira
        .get_create_fields(project, type_id)
        .await
        .context("client.get_create_fields")?;

    print_json(&fields)
}

async fn handle_fields(jira: &JiraClient) -> anyhow::Result<()> {
    eprintln!("{}", "  Loading field definitions...".dimmed());
    let catalog = jira.load_fields().await.context("client.load_fields")?;

    let mut fields: Vec<_> = catalog.iter().collect();
    fields.sort_by(|a, b| a.key.cmp(&b.key));

    print_json(&fields)
}
