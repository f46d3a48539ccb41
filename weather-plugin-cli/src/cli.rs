use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use weather_plugin_core::{
    Config, QueryError, QueryRequest, SuyanClient, WeatherSource, parse, register,
};

use crate::host::LocalHost;

const LOG_LEVELS: [&str; 4] = ["warn", "info", "debug", "trace"];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-plugin", version, about = "Local chat host for the weather query plugin")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one chat message, e.g. `chat 天气 北京`.
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Read chat messages from stdin until EOF or `/quit`.
    Repl,

    /// Fetch and parse the weather text for a city, printed as JSON.
    Fields {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Edit the local configuration interactively.
    Configure,

    /// Show the plugin registration.
    Info,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        init_logging(&config, self.verbose)?;

        match self.command {
            Command::Chat { message } => {
                let host = build_host(&config)?;
                let line = message.join(" ");
                match host.dispatch(&line).await {
                    Some(replies) => replies.iter().for_each(|r| println!("{r}")),
                    None => println!("{}", unclaimed_hint(&host)),
                }
            }
            Command::Repl => {
                let host = build_host(&config)?;
                let mut lines = BufReader::new(tokio::io::stdin()).lines();

                while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line == "/quit" {
                        break;
                    }

                    match host.dispatch(line).await {
                        Some(replies) => replies.iter().for_each(|r| println!("{r}\n")),
                        None => println!("{}\n", unclaimed_hint(&host)),
                    }
                }
            }
            Command::Fields { city } => {
                let request = QueryRequest::new(city.join(" ")).ok_or(QueryError::EmptyInput)?;
                let client = SuyanClient::with_defaults()?;

                let raw = client.fetch(request.city()).await.map_err(QueryError::from)?;
                let fields = parse(&raw.body).ok_or_else(|| QueryError::Unparseable {
                    city: request.city().to_string(),
                })?;

                println!("{}", serde_json::to_string_pretty(&fields)?);
            }
            Command::Configure => configure(config)?,
            Command::Info => {
                let registration = config.registration();
                let meta = &registration.metadata;
                let cmd = &registration.command;

                println!("{} v{}", meta.name, meta.version);
                println!("{}", meta.description);
                println!("author:   {}", meta.author);
                println!("command:  {}", cmd.keyword);
                println!("aliases:  {}", cmd.aliases.join(", "));
            }
        }

        Ok(())
    }
}

fn build_host(config: &Config) -> anyhow::Result<LocalHost> {
    let source = SuyanClient::with_defaults()?;
    let mut host = LocalHost::default();
    register(&mut host, config.registration(), Arc::new(source));
    Ok(host)
}

fn unclaimed_hint(host: &LocalHost) -> String {
    let triggers: Vec<&str> = host.registrations().flat_map(|r| r.command.triggers()).collect();
    format!("(no command matched; try one of: {})", triggers.join(", "))
}

/// `RUST_LOG` wins, then the configured level, then `-v`.
fn init_logging(config: &Config, verbose: u8) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = match config.log_level.as_deref() {
                Some(level) if verbose == 0 => level,
                _ => log_filter_from_verbosity(verbose),
            };
            EnvFilter::try_new(directive)
                .with_context(|| format!("Invalid log filter: {directive}"))?
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    Ok(())
}

const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current_author = config.author.clone().unwrap_or_default();
    let author = inquire::Text::new("Plugin author (empty for default):")
        .with_default(&current_author)
        .prompt()?;
    config.author = Some(author.trim().to_string()).filter(|a| !a.is_empty());

    let start = config
        .log_level
        .as_deref()
        .and_then(|l| LOG_LEVELS.iter().position(|&x| x == l))
        .unwrap_or(0);
    let level = inquire::Select::new("Log level:", LOG_LEVELS.to_vec())
        .with_starting_cursor(start)
        .prompt()?;
    config.log_level = Some(level.to_string());

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
