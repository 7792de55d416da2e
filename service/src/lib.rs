//! Process-level plumbing shared by the listener: configuration, logging and
//! retry helpers.

pub mod config;
pub mod logging;
pub mod retry;
