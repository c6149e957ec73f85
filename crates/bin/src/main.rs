use std::{io::Write, sync::Arc};

use clap::Parser;
use feedvault::{
    VaultClient, VaultConfig,
    cache::{FileCache, LocalCache, MemoryCache},
    feed::{DecisionPolicy, Prompt},
};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, OnUnreachable};
use output::OutputFormat;

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("feedvault=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let mut config = VaultConfig::default()
        .with_gateway_url(cli.vault.gateway.clone())
        .with_topic(cli.vault.topic.clone());
    config.request_timeout_secs = cli.vault.timeout;

    let cache: Arc<dyn LocalCache> = match &cli.vault.cache_file {
        Some(path) => Arc::new(FileCache::new(path)),
        None => Arc::new(MemoryCache::new()),
    };
    let client = VaultClient::with_http_store(config, cache)?
        .with_policy(decision_policy(cli.vault.on_unreachable));

    if let Commands::Address = cli.command {
        return commands::address::run(&client, &cli.vault, format).await;
    }

    let session = client
        .unlock(&cli.vault.username, &cli.vault.password)
        .await?;
    let result = match &cli.command {
        Commands::Address => Ok(()),
        Commands::List => commands::logins::list(&session, format),
        Commands::Show { id } => commands::logins::show(&session, id, format),
        Commands::Add(entry) => commands::logins::add(&session, entry, format).await,
        Commands::Update { id, entry } => {
            commands::logins::update(&session, id, entry, format).await
        }
        Commands::Delete { id } => commands::logins::delete(&session, id, format).await,
    };
    session.close();
    result
}

fn decision_policy(choice: OnUnreachable) -> DecisionPolicy {
    match choice {
        OnUnreachable::PreferCache => DecisionPolicy::PreferLocalCache,
        OnUnreachable::InitEmpty => DecisionPolicy::InitializeEmpty,
        OnUnreachable::Abort => DecisionPolicy::Abort,
        OnUnreachable::Ask => DecisionPolicy::ask(|prompt| {
            tokio::task::block_in_place(|| confirm(prompt))
        }),
    }
}

/// Ask a yes/no question on the terminal. Anything but "y" or "yes" declines.
fn confirm(prompt: &Prompt) -> bool {
    eprint!("{} [y/N] ", prompt.message());
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
