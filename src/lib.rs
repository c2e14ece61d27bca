#![forbid(unsafe_code)]

//! Session lifecycle client and completion monitor for the Jules remote
//! task API.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod transport;

pub use client::{ActivityReader, Paginator, SessionClient};
pub use config::GlobalConfig;
pub use errors::{AppError, Result};
pub use orchestrator::{CompletionMonitor, MonitorOptions};
