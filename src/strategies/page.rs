//! Embedded caption link discovery
//!
//! Fetches the reference's HTML and scans it for a caption file URL. Only
//! attempted when the previous strategy failed because captions were not
//! found; a hard tool failure means the video itself is inaccessible and a
//! page scan would tell us nothing new.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use super::direct::DirectCaptionDownload;
use super::{AcquisitionStrategy, ErrorKind, StrategyError, StrategyKind};
use crate::subtitle::Transcript;

static VTT_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s'"]+\.vtt"#).unwrap());

pub struct HtmlPageCaptionScan {
    client: Client,
    direct: DirectCaptionDownload,
}

impl HtmlPageCaptionScan {
    pub fn new(client: Client, direct: DirectCaptionDownload) -> Self {
        Self { client, direct }
    }
}

#[async_trait]
impl AcquisitionStrategy for HtmlPageCaptionScan {
    fn kind(&self) -> StrategyKind {
        StrategyKind::HtmlPageCaptionScan
    }

    fn applies_to(&self, reference: &str) -> bool {
        let reference = reference.trim();
        reference.starts_with("http://") || reference.starts_with("https://")
    }

    fn should_attempt(&self, prior: Option<&StrategyError>) -> bool {
        matches!(prior, Some(e) if e.kind() == ErrorKind::NotFound)
    }

    async fn acquire(&self, reference: &str) -> Result<Transcript, StrategyError> {
        tracing::info!("scanning page for embedded caption link: {}", reference);

        let response = self
            .client
            .get(reference)
            .send()
            .await
            .map_err(|e| StrategyError::Network(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| StrategyError::Network(e.to_string()))?;

        let vtt_url = match VTT_URL.find(&body) {
            Some(m) => m.as_str().to_string(),
            None => return Err(StrategyError::NoEmbeddedCaptionLink),
        };

        tracing::info!("found caption link: {}", vtt_url);

        // lightweight existence check before committing to a full download
        let head = self
            .client
            .head(&vtt_url)
            .send()
            .await
            .map_err(|e| StrategyError::Network(e.to_string()))?;

        if !head.status().is_success() {
            tracing::warn!(
                "caption link exists but is not downloadable (HTTP {})",
                head.status()
            );
            return Err(StrategyError::NoEmbeddedCaptionLink);
        }

        self.direct.fetch_and_parse(&vtt_url).await
    }
}
