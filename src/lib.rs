//! Transcript Harvester - a service and CLI for extracting video transcripts
//!
//! This library tries a fixed chain of acquisition strategies (direct caption
//! download, yt-dlp caption extraction, HTML page scanning, the hosted
//! transcript API, and finally whisper speech-to-text) and normalizes whatever
//! raw caption output it obtains into clean paragraph text.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod scratch;
pub mod server;
pub mod strategies;
pub mod subtitle;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use pipeline::{Acquisition, HarvestPipeline};
pub use strategies::{AcquisitionStrategy, ErrorKind, StrategyError, StrategyKind};
pub use subtitle::Transcript;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
