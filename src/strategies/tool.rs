//! Caption extraction via yt-dlp
//!
//! Requests manual and automatic captions for one language without
//! downloading any media. yt-dlp exiting non-zero and yt-dlp succeeding
//! without producing the caption file are distinct failures: the second means
//! the video simply has no captions, which is what unlocks the page-scan
//! fallback.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::{AcquisitionStrategy, StrategyError, StrategyKind};
use crate::process::CommandRunner;
use crate::scratch::Scratch;
use crate::subtitle::{self, Transcript};

pub struct ToolCaptionExtraction {
    runner: Arc<dyn CommandRunner>,
    scratch: Arc<Scratch>,
    yt_dlp: String,
    language: String,
    timeout: Duration,
}

impl ToolCaptionExtraction {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        scratch: Arc<Scratch>,
        yt_dlp: String,
        language: String,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            scratch,
            yt_dlp,
            language,
            timeout,
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for ToolCaptionExtraction {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ToolCaptionExtraction
    }

    fn applies_to(&self, reference: &str) -> bool {
        !reference.trim().is_empty()
    }

    async fn acquire(&self, reference: &str) -> Result<Transcript, StrategyError> {
        let suffix = format!(".{}.vtt", self.language);
        let caption = self.scratch.acquire(&suffix);

        // yt-dlp takes an output prefix and appends `.<lang>.vtt` itself
        let caption_path = caption.path().to_string_lossy();
        let prefix = caption_path
            .strip_suffix(suffix.as_str())
            .expect("scratch path ends with its suffix")
            .to_string();

        let args = vec![
            "--write-sub".to_string(),
            "--write-auto-sub".to_string(),
            "--sub-lang".to_string(),
            self.language.clone(),
            "--skip-download".to_string(),
            "-o".to_string(),
            prefix,
            reference.to_string(),
        ];

        self.runner.run(&self.yt_dlp, &args, self.timeout).await?;

        if !caption.path().exists() {
            tracing::warn!(
                "yt-dlp ran, but no caption file at {}",
                caption.path().display()
            );
            return Err(StrategyError::CaptionsNotFound);
        }

        let document = fs_err::read_to_string(caption.path())
            .map_err(|e| StrategyError::Io(e.to_string()))?;
        caption.release();

        let cues = subtitle::parse_caption_document(&document);
        let transcript = subtitle::normalize_lines(cues.iter().map(String::as_str));

        if transcript.is_empty() {
            return Err(StrategyError::EmptyTranscript);
        }

        Ok(transcript)
    }
}
