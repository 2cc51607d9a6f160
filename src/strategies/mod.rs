//! Transcript acquisition strategies
//!
//! Each strategy wraps one technique for obtaining a transcript and converts
//! every failure into a [`StrategyError`]; nothing escapes to the orchestrator.
//! The orchestrator chains strategies by matching [`ErrorKind`] structurally,
//! never by inspecting error text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod api;
pub mod direct;
pub mod page;
pub mod speech;
pub mod tool;

use crate::process::ProcessError;
use crate::subtitle::Transcript;

/// Which acquisition technique produced a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    DirectCaptionDownload,
    ToolCaptionExtraction,
    HtmlPageCaptionScan,
    RemoteTranscriptApi,
    SpeechToTextFallback,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::DirectCaptionDownload => "direct_caption_download",
            StrategyKind::ToolCaptionExtraction => "tool_caption_extraction",
            StrategyKind::HtmlPageCaptionScan => "html_page_caption_scan",
            StrategyKind::RemoteTranscriptApi => "remote_transcript_api",
            StrategyKind::SpeechToTextFallback => "speech_to_text_fallback",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse failure category used for fallback gating and HTTP status selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    Network,
    ToolFailure,
    Timeout,
    NotFound,
    Format,
    RemoteApi,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadInput => "bad_input",
            ErrorKind::Network => "network",
            ErrorKind::ToolFailure => "tool_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Format => "format",
            ErrorKind::RemoteApi => "remote_api",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Structured failure reported by a strategy
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("missing video reference")]
    MissingReference,

    #[error("network request failed: {0}")]
    Network(String),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("extraction tool failed: {stderr}")]
    ToolFailed { stderr: String },

    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    #[error("subtitles not found")]
    CaptionsNotFound,

    #[error("no embedded caption link in page")]
    NoEmbeddedCaptionLink,

    #[error("transcript not available: {0}")]
    TranscriptUnavailable(String),

    #[error("transcript output file missing: {0}")]
    TranscriptOutputMissing(String),

    #[error("audio extraction failed: {0}")]
    AudioExtractionFailed(String),

    #[error("document produced no usable text")]
    EmptyTranscript,

    #[error("not a recognized platform reference: {0}")]
    UnrecognizedReference(String),

    #[error("transcript API error: {0}")]
    RemoteApi(String),

    #[error("file operation failed: {0}")]
    Io(String),
}

impl StrategyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StrategyError::MissingReference => ErrorKind::BadInput,
            StrategyError::Network(_) => ErrorKind::Network,
            StrategyError::HttpStatus { .. } => ErrorKind::Network,
            StrategyError::ToolFailed { .. } => ErrorKind::ToolFailure,
            StrategyError::Timeout { .. } => ErrorKind::Timeout,
            StrategyError::CaptionsNotFound => ErrorKind::NotFound,
            StrategyError::NoEmbeddedCaptionLink => ErrorKind::NotFound,
            StrategyError::TranscriptUnavailable(_) => ErrorKind::RemoteApi,
            StrategyError::TranscriptOutputMissing(_) => ErrorKind::NotFound,
            StrategyError::AudioExtractionFailed(_) => ErrorKind::ToolFailure,
            StrategyError::EmptyTranscript => ErrorKind::Format,
            StrategyError::UnrecognizedReference(_) => ErrorKind::BadInput,
            StrategyError::RemoteApi(_) => ErrorKind::RemoteApi,
            StrategyError::Io(_) => ErrorKind::Internal,
        }
    }
}

impl From<ProcessError> for StrategyError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NonZeroExit { stderr, .. } => StrategyError::ToolFailed { stderr },
            ProcessError::TimedOut { program, seconds } => {
                StrategyError::Timeout { program, seconds }
            }
            ProcessError::Spawn { .. } => StrategyError::ToolFailed {
                stderr: err.to_string(),
            },
        }
    }
}

/// One self-contained acquisition technique
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether this strategy can interpret the reference at all.
    fn applies_to(&self, reference: &str) -> bool;

    /// Gate on the most recent failure in the chain. The default attempts the
    /// strategy regardless of what went wrong before it.
    fn should_attempt(&self, _prior: Option<&StrategyError>) -> bool {
        true
    }

    async fn acquire(&self, reference: &str) -> Result<Transcript, StrategyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_classify_structurally() {
        assert_eq!(StrategyError::CaptionsNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(StrategyError::NoEmbeddedCaptionLink.kind(), ErrorKind::NotFound);
        assert_eq!(
            StrategyError::TranscriptUnavailable("disabled".into()).kind(),
            ErrorKind::RemoteApi
        );
        assert_eq!(
            StrategyError::ToolFailed { stderr: "boom".into() }.kind(),
            ErrorKind::ToolFailure
        );
        assert_eq!(
            StrategyError::Timeout { program: "yt-dlp".into(), seconds: 60 }.kind(),
            ErrorKind::Timeout
        );
        assert_eq!(StrategyError::EmptyTranscript.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_process_error_conversion() {
        let err: StrategyError = ProcessError::NonZeroExit {
            program: "yt-dlp".into(),
            code: Some(1),
            stderr: "unavailable".into(),
        }
        .into();
        assert!(matches!(err, StrategyError::ToolFailed { ref stderr } if stderr == "unavailable"));

        let err: StrategyError = ProcessError::TimedOut {
            program: "whisper".into(),
            seconds: 120,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }
}
