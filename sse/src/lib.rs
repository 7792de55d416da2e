//! Server-Sent Events (SSE) streaming client.
//!
//! This crate consumes a long-lived `text/event-stream` response and hands every
//! decoded event to caller-supplied logic without ever blocking ingestion on it.
//!
//! # Architecture
//!
//! - **Connection**: one GET request with `Accept: text/event-stream` and the
//!   caller's query parameters. The result is reported once per run as a
//!   [`ConnectionOutcome`] on the outcome channel.
//! - **Decoder**: reads the body one line at a time. `data: <json>` lines become
//!   events, keep-alive comments become `{"event": "keepalive"}`, everything
//!   else is skipped. Invalid JSON is logged and dropped; only I/O errors end
//!   the stream.
//! - **Dispatch**: every event runs the callback on its own tokio task. Tasks
//!   are tracked so a stopping run waits for all of them before it signals
//!   that it has stopped.
//!
//! # Run lifecycle
//!
//! 1. `Connecting`: the request is sent. Failures report `ClientCreationFailed`,
//!    `RequestFailed` or `ConnectFailed` and the run stops.
//! 2. `Streaming`: `Connected` is reported and lines are decoded until a
//!    shutdown request arrives, the server closes the stream, or a read fails
//!    (`StreamReadError`).
//! 3. `Draining`: no more reads; outstanding callbacks are awaited.
//! 4. `Stopped`: the response is released and the stopped signal is emitted,
//!    always, as the last thing the run does.
//!
//! # Example
//!
//! ```rust,ignore
//! use sse::{Client, ClientConfig};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let (client, mut outcomes) = Client::new(ClientConfig::new("https://push.example.com/sse"))?;
//! let client = Arc::new(client);
//!
//! let runner = {
//!     let client = Arc::clone(&client);
//!     tokio::spawn(async move {
//!         let params = HashMap::from([("channels".to_string(), "updates".to_string())]);
//!         client.run(&params, |event| async move { println!("{event:?}") }).await
//!     })
//! };
//!
//! if outcomes.recv().await == Some(sse::ConnectionOutcome::Connected) {
//!     // ... later
//!     client.shutdown().await;
//! }
//! runner.await?;
//! ```
//!
//! # Modules
//!
//! - `connection`: request construction and response validation
//! - `decoder`: line-oriented protocol decoder
//! - `manager`: the `Client`, its run loop and shutdown handshake
//! - `message`: `Event` and `ConnectionOutcome`

mod connection;
pub mod decoder;
pub mod error;
pub mod manager;
pub mod message;

pub use error::Error;
pub use manager::{Client, ClientConfig, OutcomeReceiver};
pub use message::{ConnectionOutcome, Event};
