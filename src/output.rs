use colored::*;
use log::*;
use serde_json::Value;
use sse::message::is_keepalive;
use sse::{ConnectionOutcome, Event};

pub fn print_event(label: &str, event: &Event) {
    if is_keepalive(event) {
        debug!("[{label}] keepalive");
        return;
    }

    let kind = event
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("message");

    println!(
        "\n[{}] {} event received",
        label.bright_blue().bold(),
        kind.yellow()
    );

    if let Ok(pretty) = serde_json::to_string_pretty(event) {
        println!("   {}", pretty.dimmed());
    }
}

pub fn print_outcome(label: &str, outcome: ConnectionOutcome) {
    let marker = if outcome.is_connected() {
        "✓".green()
    } else {
        "✗".red()
    };

    println!("{} [{}] {}", marker, label.bold(), outcome);
}
