use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "harvester",
    about = "Transcript Harvester - Extract video transcripts via captions, transcript APIs and speech-to-text",
    version,
    long_about = "Extracts a clean text transcript for a video URL by trying a fixed chain of fallbacks: direct caption download, yt-dlp caption extraction, HTML page scanning, the hosted transcript API, and finally whisper speech-to-text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a transcript for a video or page URL
    Fetch {
        /// Video page, caption file, or platform URL
        #[arg(value_name = "URL")]
        url: String,

        /// Also write the transcript text to a file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Caption language override
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Run the HTTP endpoint
    Serve {
        /// Listen port override
        #[arg(short, long, value_name = "PORT")]
        port: Option<u16>,
    },

    /// Inspect tool paths and settings
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List acquisition strategies in fallback order
    Strategies,
}
