use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The URL of the `text/event-stream` endpoint to listen to
    #[arg(short = 'u', long, env)]
    stream_url: String,

    /// Query parameters added to the stream request, as `key=value` pairs.
    /// Repeat the flag or separate pairs with commas.
    #[arg(
        short = 'p',
        long = "param",
        env = "PARAMS",
        value_delimiter = ',',
        value_parser = parse_param
    )]
    params: Vec<(String, String)>,

    /// Label prefixed to every log line of the stream client
    #[arg(long, env, default_value = "stream")]
    pub label: String,

    /// Buffer size of the connection outcome channel (must be at least 1)
    #[arg(long, env, default_value_t = 1)]
    pub outcome_capacity: usize,

    /// Buffer size of the stopped channel (must be at least 1)
    #[arg(long, env, default_value_t = 1)]
    pub stopped_capacity: usize,

    /// Number of listening sessions attempted before giving up
    #[arg(long, env, default_value_t = 5)]
    pub max_attempts: u32,

    /// Delay in milliseconds before the first reconnect, doubled after every failure
    #[arg(long, env, default_value_t = 1000)]
    pub backoff_base_ms: u64,

    /// Upper bound in milliseconds for the reconnect delay
    #[arg(long, env, default_value_t = 60_000)]
    pub backoff_max_ms: u64,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    /// Query parameters keyed by name. A repeated key keeps its last value.
    pub fn query_params(&self) -> HashMap<String, String> {
        self.params.iter().cloned().collect()
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("invalid query parameter `{raw}`, expected key=value")),
    }
}
