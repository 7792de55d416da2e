use anyhow::Result;
use colored::*;
use log::*;
use service::config::Config;
use service::logging::Logger;
use service::retry::{with_attempts, Backoff};
use tokio::sync::watch;

mod listener;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new();
    Logger::init_logger(&config)?;

    println!(
        "{} Listening to {}",
        "→".blue(),
        config.stream_url().bright_white()
    );

    let (interrupt, interrupted) = watch::channel(false);
    tokio::spawn(async move {
        match listener::relay_interrupts(tokio::signal::ctrl_c, interrupt).await {
            Ok(()) => std::process::exit(130),
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        }
    });

    let backoff = Backoff::new(config.backoff_base(), config.backoff_max());
    let (config, backoff, interrupted) = (&config, &backoff, &interrupted);

    with_attempts(config.max_attempts, move || {
        backoff.run(move || listener::listen(config, interrupted.clone()))
    })
    .await?;

    println!("{} Stream closed", "✓".green());
    Ok(())
}
