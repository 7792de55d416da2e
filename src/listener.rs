use crate::output;
use anyhow::{bail, Result};
use log::*;
use service::config::Config;
use sse::{Client, ClientConfig, ConnectionOutcome};
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs one listening session on a fresh client.
///
/// Returns `Ok` once `interrupted` flips to `true` and the stream has fully
/// stopped. Returns an error when the stream could not be established or
/// ended without being interrupted, so the caller can reconnect.
pub async fn listen(config: &Config, mut interrupted: watch::Receiver<bool>) -> Result<()> {
    if *interrupted.borrow() {
        return Ok(());
    }

    let (client, mut outcomes) = Client::new(ClientConfig {
        url: config.stream_url().to_string(),
        outcome_capacity: config.outcome_capacity,
        stopped_capacity: config.stopped_capacity,
        label: config.label.clone(),
    })?;
    let client = Arc::new(client);

    let mut runner = {
        let client = Arc::clone(&client);
        let params = config.query_params();
        let label = config.label.clone();
        tokio::spawn(async move {
            client
                .run(&params, move |event| {
                    let label = label.clone();
                    async move { output::print_event(&label, &event) }
                })
                .await
        })
    };

    let outcome = tokio::select! {
        outcome = outcomes.recv() => outcome,
        _ = wait_for_interrupt(&mut interrupted) => {
            info!("[{}] Interrupted while connecting", client.label());
            client.shutdown().await;
            runner.await?;
            return Ok(());
        }
    };

    match outcome {
        Some(ConnectionOutcome::Connected) => {
            output::print_outcome(client.label(), ConnectionOutcome::Connected)
        }
        Some(outcome) => {
            output::print_outcome(client.label(), outcome);
            runner.await?;
            bail!("could not stream from {}: {outcome}", config.stream_url());
        }
        None => {
            runner.await?;
            bail!("outcome channel closed before connecting");
        }
    }

    tokio::select! {
        _ = wait_for_interrupt(&mut interrupted) => {
            info!("[{}] Interrupted, stopping stream", client.label());
            client.shutdown().await;
            runner.await?;
            Ok(())
        }
        joined = &mut runner => {
            joined?;
            match outcomes.try_recv() {
                Ok(outcome @ ConnectionOutcome::StreamReadError) => {
                    output::print_outcome(client.label(), outcome);
                    bail!("lost stream from {}", config.stream_url())
                }
                _ => bail!("{} closed the stream", config.stream_url()),
            }
        }
    }
}

/// Sets `interrupt` on the first signal and returns on the second, leaving
/// the caller to force the exit when a graceful stop takes too long.
pub async fn relay_interrupts<F, Fut>(
    mut signal: F,
    interrupt: watch::Sender<bool>,
) -> io::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    signal().await?;
    info!("Received Ctrl-C, shutting down");
    let _ = interrupt.send(true);

    signal().await?;
    warn!("Received second Ctrl-C, exiting without waiting for the stream");
    Ok(())
}

/// Resolves once the flag is set. Never resolves if the sender is gone.
async fn wait_for_interrupt(interrupted: &mut watch::Receiver<bool>) {
    if interrupted.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
