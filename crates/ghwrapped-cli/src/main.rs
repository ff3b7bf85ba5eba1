mod render;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ghwrapped_core::{
    validate_username, ClientConfig, FetchState, GitHubClient, Insights, StatsCache, StatsRecord,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ghwrapped")]
#[command(author, version, about = "GitHub activity statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,
}

#[derive(Args, Clone)]
struct ConnectionArgs {
    #[arg(long, help = "GitHub token (overrides GITHUB_TOKEN)")]
    token: Option<String>,
    #[arg(long, help = "GraphQL endpoint URL")]
    endpoint: Option<String>,
    #[arg(long, help = "Disable spinner")]
    no_spinner: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show aggregated statistics for one or more users")]
    Stats {
        #[arg(required = true, help = "GitHub usernames")]
        usernames: Vec<String>,
        #[arg(long, help = "Output as JSON")]
        json: bool,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    #[command(about = "Show monthly contributions for the last five years")]
    Monthly {
        #[arg(help = "GitHub username")]
        username: String,
        #[arg(long, help = "Output as JSON")]
        json: bool,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    #[command(about = "Show languages ranked by code size")]
    Languages {
        #[arg(help = "GitHub username")]
        username: String,
        #[arg(long, help = "Output as JSON")]
        json: bool,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Stats {
            usernames,
            json,
            connection,
        } => run_stats_command(&usernames, json, &connection),
        Commands::Monthly {
            username,
            json,
            connection,
        } => run_monthly_command(&username, json, &connection),
        Commands::Languages {
            username,
            json,
            connection,
        } => run_languages_command(&username, json, &connection),
    }
}

fn init_logging(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if debug {
        EnvFilter::new("ghwrapped=debug,ghwrapped_core=debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn start_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Fetch every requested user, reusing results for repeated logins.
fn fetch_records(
    usernames: &[String],
    connection: &ConnectionArgs,
    show_spinner: bool,
) -> Result<Vec<StatsRecord>> {
    use tokio::runtime::Runtime;

    for username in usernames {
        validate_username(username)?;
    }

    let config = ClientConfig::load()
        .with_overrides(connection.endpoint.clone(), connection.token.clone());
    tracing::debug!(
        endpoint = %config.endpoint,
        authenticated = config.token.is_some(),
        "resolved client configuration"
    );
    let client = GitHubClient::new(&config)?;

    let spinner = (show_spinner && !connection.no_spinner).then(start_spinner);
    let rt = Runtime::new()?;

    let result = rt.block_on(async {
        let mut cache = StatsCache::default();
        let mut records = Vec::with_capacity(usernames.len());

        for username in usernames {
            if let Some(spinner) = &spinner {
                spinner.set_message(format!("Fetching GitHub stats for {}...", username.trim()));
            }

            let mut state = FetchState::Idle;
            state.run(cache.get_or_fetch(&client, username)).await;

            if let Some(message) = state.error() {
                anyhow::bail!("Failed to fetch stats for {}: {}", username.trim(), message);
            }
            let record = state
                .into_data()
                .ok_or_else(|| anyhow::anyhow!("Fetch for {} did not complete", username.trim()))?;
            records.push(record);
        }

        Ok::<_, anyhow::Error>(records)
    });

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    result
}

fn fetch_one(username: &str, connection: &ConnectionArgs, show_spinner: bool) -> Result<StatsRecord> {
    let mut records = fetch_records(&[username.to_string()], connection, show_spinner)?;
    records
        .pop()
        .ok_or_else(|| anyhow::anyhow!("No statistics returned for {}", username))
}

#[derive(serde::Serialize)]
struct StatsJson<'a> {
    stats: &'a StatsRecord,
    insights: Insights,
}

fn run_stats_command(usernames: &[String], json: bool, connection: &ConnectionArgs) -> Result<()> {
    let records = fetch_records(usernames, connection, !json)?;

    if json {
        let output: Vec<StatsJson> = records
            .iter()
            .map(|record| StatsJson {
                stats: record,
                insights: Insights::from_record(record),
            })
            .collect();

        if let [single] = output.as_slice() {
            println!("{}", serde_json::to_string_pretty(single)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    } else {
        for record in &records {
            render::print_stats(record, &Insights::from_record(record));
        }
    }

    Ok(())
}

fn run_monthly_command(username: &str, json: bool, connection: &ConnectionArgs) -> Result<()> {
    let record = fetch_one(username, connection, !json)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&record.monthly_contributions)?
        );
    } else {
        render::print_monthly(&record);
    }

    Ok(())
}

fn run_languages_command(username: &str, json: bool, connection: &ConnectionArgs) -> Result<()> {
    let record = fetch_one(username, connection, !json)?;
    let insights = Insights::from_record(&record);

    if json {
        println!("{}", serde_json::to_string_pretty(&insights.language_shares)?);
    } else {
        render::print_languages(&insights);
    }

    Ok(())
}
