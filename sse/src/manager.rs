use crate::connection::Connection;
use crate::decoder::{Decoder, Frame};
use crate::error::{config_error, ConfigErrorKind, Error};
use crate::message::{ConnectionOutcome, Event};
use futures_util::stream::StreamExt;
use log::*;
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio_util::io::StreamReader;
use tokio_util::task::TaskTracker;

/// Receiving end of the outcome channel, handed back by [`Client::new`].
pub type OutcomeReceiver = mpsc::Receiver<ConnectionOutcome>;

/// Settings for one [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint serving `text/event-stream`.
    pub url: String,
    /// Buffer size of the outcome channel. Must be at least 1.
    pub outcome_capacity: usize,
    /// Buffer size of the stopped channel. Must be at least 1.
    pub stopped_capacity: usize,
    /// Prefix for this client's log lines.
    pub label: String,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome_capacity: 1,
            stopped_capacity: 1,
            label: "sse".to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.outcome_capacity < 1 {
            return Err(config_error(
                ConfigErrorKind::OutcomeCapacity,
                "Outcome channel capacity must be at least 1",
            ));
        }
        if self.stopped_capacity < 1 {
            return Err(config_error(
                ConfigErrorKind::StoppedCapacity,
                "Stopped channel capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Streaming SSE client.
///
/// One client serves one stream: [`Client::run`] connects, reports a
/// [`ConnectionOutcome`], and hands every decoded event to the callback on its
/// own task until the server closes the stream, a read fails, or
/// [`Client::shutdown`] is called. A run always finishes by waiting for the
/// callbacks it started and then emitting one stopped signal, which is what
/// `shutdown` waits for.
///
/// Share the client through an `Arc` to call `shutdown` from another task
/// while `run` is in progress. Create a new client for every reconnect.
pub struct Client {
    label: String,
    connection: Connection,
    outcome: mpsc::Sender<ConnectionOutcome>,
    stopped: mpsc::Sender<()>,
    stopped_rx: Mutex<mpsc::Receiver<()>>,
    shutdown: mpsc::Sender<()>,
    shutdown_rx: Mutex<mpsc::Receiver<()>>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<(Self, OutcomeReceiver), Error> {
        config.validate()?;

        let http = reqwest::Client::builder().build()?;
        let (outcome, outcome_rx) = mpsc::channel(config.outcome_capacity);
        let (stopped, stopped_rx) = mpsc::channel(config.stopped_capacity);
        let (shutdown, shutdown_rx) = mpsc::channel(1);

        let client = Self {
            label: config.label,
            connection: Connection::new(config.url, http),
            outcome,
            stopped,
            stopped_rx: Mutex::new(stopped_rx),
            shutdown,
            shutdown_rx: Mutex::new(shutdown_rx),
        };

        Ok((client, outcome_rx))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Connects and streams until stopped. Resolves once every dispatched
    /// callback has completed and the stopped signal has been emitted.
    pub async fn run<F, Fut>(&self, params: &HashMap<String, String>, callback: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stream(params, callback).await;
        self.report_stopped();
    }

    /// Asks the running stream to stop and waits until it has.
    ///
    /// A call made while another `shutdown` is still waiting is logged and
    /// returns immediately. A call made when no run is active waits for the
    /// next run to stop.
    pub async fn shutdown(&self) {
        let Ok(mut stopped) = self.stopped_rx.try_lock() else {
            error!("[{}] Shutdown already in progress, ignoring request", self.label);
            return;
        };

        match self.shutdown.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                error!("[{}] Awaited unexpected shutdown request", self.label);
            }
            Err(TrySendError::Closed(())) => {
                error!("[{}] Shutdown channel closed", self.label);
                return;
            }
        }

        if stopped.recv().await.is_none() {
            warn!("[{}] Stopped channel closed before the stream stopped", self.label);
        }
    }

    async fn stream<F, Fut>(&self, params: &HashMap<String, String>, callback: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let response = match self.connection.open(params).await {
            Ok(response) => response,
            Err(outcome) => {
                self.report(outcome);
                return;
            }
        };

        info!("[{}] Connected to {}", self.label, self.connection.url());
        self.report(ConnectionOutcome::Connected);

        let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
        let mut decoder = Decoder::new(StreamReader::new(Box::pin(body)));

        let callback = Arc::new(callback);
        let dispatched = TaskTracker::new();
        let mut shutdown = self.shutdown_rx.lock().await;

        loop {
            let frame = tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    info!("[{}] Shutting down listener", self.label);
                    break;
                }
                frame = decoder.next_frame() => frame,
            };

            match frame {
                Ok(Frame::Event(event)) => {
                    let callback = Arc::clone(&callback);
                    dispatched.spawn(async move {
                        (*callback)(event).await;
                    });
                }
                Ok(Frame::Empty) => {}
                Ok(Frame::EndOfStream) => {
                    info!("[{}] Stream closed by server", self.label);
                    break;
                }
                Err(e) => {
                    error!("[{}] Error reading stream: {e}", self.label);
                    self.report_stream_error(&mut shutdown).await;
                    break;
                }
            }
        }

        dispatched.close();
        debug!(
            "[{}] Waiting for {} dispatched callback(s)",
            self.label,
            dispatched.len()
        );
        dispatched.wait().await;

        info!("[{}] SSE streaming exiting", self.label);
    }

    fn report(&self, outcome: ConnectionOutcome) {
        match self.outcome.try_send(outcome) {
            Ok(()) => debug!("[{}] Reported outcome: {outcome}", self.label),
            Err(TrySendError::Full(_)) => {
                warn!(
                    "[{}] Outcome channel full, dropping outcome: {outcome}",
                    self.label
                )
            }
            Err(TrySendError::Closed(_)) => {
                debug!("[{}] Outcome receiver dropped: {outcome}", self.label)
            }
        }
    }

    /// Delivers `StreamReadError` even when the channel still holds the
    /// unread `Connected`: waits for room unless a shutdown request arrives
    /// first.
    async fn report_stream_error(&self, shutdown: &mut mpsc::Receiver<()>) {
        let outcome = ConnectionOutcome::StreamReadError;
        tokio::select! {
            sent = self.outcome.send(outcome) => match sent {
                Ok(()) => debug!("[{}] Reported outcome: {outcome}", self.label),
                Err(_) => debug!("[{}] Outcome receiver dropped: {outcome}", self.label),
            },
            _ = shutdown.recv() => {
                warn!("[{}] Shutdown requested before {outcome} was consumed", self.label)
            }
        }
    }

    fn report_stopped(&self) {
        if let Err(TrySendError::Full(())) = self.stopped.try_send(()) {
            warn!(
                "[{}] Stopped channel full, previous stop was never observed",
                self.label
            );
        }
    }
}
