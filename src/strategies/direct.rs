//! Direct caption file download
//!
//! Applies only when the reference already points at a caption file. The body
//! is staged through a scratch file so the parse step works from the same
//! artifact every other caption strategy produces.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use super::{AcquisitionStrategy, StrategyError, StrategyKind};
use crate::scratch::Scratch;
use crate::subtitle::{self, Transcript};

pub struct DirectCaptionDownload {
    client: Client,
    scratch: Arc<Scratch>,
}

impl DirectCaptionDownload {
    pub fn new(client: Client, scratch: Arc<Scratch>) -> Self {
        Self { client, scratch }
    }

    /// Fetch a caption URL, stage it, parse and normalize it.
    ///
    /// Shared with the page-scan strategy, which delegates here once it has
    /// discovered an embedded caption URL.
    pub(crate) async fn fetch_and_parse(&self, vtt_url: &str) -> Result<Transcript, StrategyError> {
        tracing::info!("downloading caption file: {}", vtt_url);

        let response = self
            .client
            .get(vtt_url)
            .send()
            .await
            .map_err(|e| StrategyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StrategyError::HttpStatus {
                url: vtt_url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StrategyError::Network(e.to_string()))?;

        let caption = self.scratch.acquire(".vtt");
        fs_err::write(caption.path(), &body).map_err(|e| StrategyError::Io(e.to_string()))?;
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

#[async_trait]
impl AcquisitionStrategy for DirectCaptionDownload {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectCaptionDownload
    }

    fn applies_to(&self, reference: &str) -> bool {
        reference.trim_end().to_lowercase().ends_with(".vtt")
    }

    async fn acquire(&self, reference: &str) -> Result<Transcript, StrategyError> {
        self.fetch_and_parse(reference).await
    }
}
