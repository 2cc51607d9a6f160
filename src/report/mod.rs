//! Outcome reporting
//!
//! Serializes the pipeline's outcome for the process boundary (one JSON line
//! on stdout) and maps failure kinds to HTTP status codes for the server. Also
//! home of the archive sink the pipeline writes successful transcripts
//! through.

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;

use crate::pipeline::Acquisition;
use crate::strategies::{ErrorKind, StrategyError};

/// Render the outcome as exactly one line of JSON.
pub fn render_outcome(outcome: &Result<Acquisition, StrategyError>) -> String {
    match outcome {
        Ok(acquisition) => serde_json::to_string(acquisition)
            .unwrap_or_else(|e| json!({ "error": e.to_string(), "kind": "internal" }).to_string()),
        Err(e) => json!({ "error": e.to_string(), "kind": e.kind().as_str() }).to_string(),
    }
}

/// HTTP status the boundary should answer with for a failure of this kind.
pub fn http_status(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::BadInput => 400,
        // an inaccessible or invalid video is the caller's problem
        ErrorKind::ToolFailure => 400,
        ErrorKind::NotFound => 404,
        ErrorKind::Network => 502,
        ErrorKind::RemoteApi => 502,
        ErrorKind::Timeout => 504,
        ErrorKind::Format => 500,
        ErrorKind::Internal => 500,
    }
}

/// Side-channel archival copy of every successful transcript
#[async_trait]
pub trait ArchiveSink: Send + Sync {
    async fn store(&self, transcript: &str) -> crate::Result<()>;
}

/// Writes `clean_transcript.txt` into a well-known folder, overwriting any
/// prior content.
pub struct FsArchive {
    dir: PathBuf,
}

impl FsArchive {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl ArchiveSink for FsArchive {
    async fn store(&self, transcript: &str) -> crate::Result<()> {
        fs_err::create_dir_all(&self.dir).context("Failed to create archive directory")?;
        let path = self.dir.join("clean_transcript.txt");
        fs_err::write(&path, transcript).context("Failed to write archived transcript")?;
        tracing::debug!("archived transcript to {}", path.display());
        Ok(())
    }
}

/// In-memory sink for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryArchive {
    stored: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MemoryArchive {
    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ArchiveSink for MemoryArchive {
    async fn store(&self, transcript: &str) -> crate::Result<()> {
        self.stored.lock().unwrap().push(transcript.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::StrategyKind;
    use chrono::Utc;

    #[test]
    fn test_success_renders_method_and_transcript() {
        let outcome = Ok(Acquisition {
            transcript: "Hello there".to_string(),
            method: StrategyKind::DirectCaptionDownload,
            retrieved_at: Utc::now(),
        });

        let line = render_outcome(&outcome);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["transcript"], "Hello there");
        assert_eq!(value["method"], "direct_caption_download");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_failure_renders_kind_and_detail() {
        let outcome = Err(StrategyError::CaptionsNotFound);
        let line = render_outcome(&outcome);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["kind"], "not_found");
        assert_eq!(value["error"], "subtitles not found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(http_status(ErrorKind::BadInput), 400);
        assert_eq!(http_status(ErrorKind::ToolFailure), 400);
        assert_eq!(http_status(ErrorKind::NotFound), 404);
        assert_eq!(http_status(ErrorKind::Format), 500);
        assert_eq!(http_status(ErrorKind::Timeout), 504);
    }

    #[tokio::test]
    async fn test_fs_archive_overwrites_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsArchive::new(dir.path().to_path_buf());

        archive.store("first transcript").await.unwrap();
        archive.store("second transcript").await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("clean_transcript.txt")).unwrap();
        assert_eq!(content, "second transcript");
    }
}
