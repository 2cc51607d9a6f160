//! Acquisition pipeline
//!
//! Runs the fixed fallback chain: direct caption download, yt-dlp caption
//! extraction, HTML page scan, hosted transcript API, speech-to-text. Stops at
//! the first success. When every attempted strategy fails, the last failure is
//! reported; later failures are more diagnostic because earlier ones are often
//! "not applicable" rather than true errors.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::process::{CommandRunner, TokioCommandRunner};
use crate::report::{ArchiveSink, FsArchive};
use crate::scratch::Scratch;
use crate::strategies::{
    api::RemoteTranscriptApi, direct::DirectCaptionDownload, page::HtmlPageCaptionScan,
    speech::SpeechToTextFallback, tool::ToolCaptionExtraction, AcquisitionStrategy, StrategyError,
    StrategyKind,
};

/// Successful outcome of one acquisition request
#[derive(Debug, Clone, Serialize)]
pub struct Acquisition {
    /// The cleaned transcript text
    pub transcript: String,

    /// Which strategy produced it
    pub method: StrategyKind,

    /// When the acquisition completed
    pub retrieved_at: DateTime<Utc>,
}

/// Owns the strategy chain and the archive sink for one request scope
pub struct HarvestPipeline {
    strategies: Vec<Box<dyn AcquisitionStrategy>>,
    archive: Arc<dyn ArchiveSink>,
}

impl HarvestPipeline {
    /// Build the production chain from configuration.
    pub fn new(config: &Config) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.captions.request_timeout_secs))
            .build()?;

        let scratch = Arc::new(Scratch::new()?);
        let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner);
        let tool_timeout = Duration::from_secs(config.tools.timeout_secs);
        let language = config.captions.language.clone();

        let strategies: Vec<Box<dyn AcquisitionStrategy>> = vec![
            Box::new(DirectCaptionDownload::new(client.clone(), scratch.clone())),
            Box::new(ToolCaptionExtraction::new(
                runner.clone(),
                scratch.clone(),
                config.tools.yt_dlp_path.clone(),
                language.clone(),
                tool_timeout,
            )),
            Box::new(HtmlPageCaptionScan::new(
                client.clone(),
                DirectCaptionDownload::new(client.clone(), scratch.clone()),
            )),
            Box::new(RemoteTranscriptApi::new(client.clone(), language.clone())),
            Box::new(SpeechToTextFallback::new(
                runner,
                scratch,
                config.tools.yt_dlp_path.clone(),
                config.tools.whisper_path.clone(),
                language,
                tool_timeout,
            )),
        ];

        let archive: Arc<dyn ArchiveSink> = Arc::new(FsArchive::new(config.archive_dir()));

        Ok(Self { strategies, archive })
    }

    /// Assemble a pipeline from explicit parts.
    pub fn with_parts(
        strategies: Vec<Box<dyn AcquisitionStrategy>>,
        archive: Arc<dyn ArchiveSink>,
    ) -> Self {
        Self { strategies, archive }
    }

    /// Try each strategy in order and return the first success, or the last
    /// failure once the chain is exhausted.
    pub async fn acquire(&self, reference: &str) -> Result<Acquisition, StrategyError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(StrategyError::MissingReference);
        }

        let mut last_failure: Option<StrategyError> = None;

        for strategy in &self.strategies {
            if !strategy.applies_to(reference) {
                tracing::debug!("skipping {}: not applicable", strategy.kind());
                continue;
            }
            if !strategy.should_attempt(last_failure.as_ref()) {
                tracing::debug!("skipping {}: gated by prior failure", strategy.kind());
                continue;
            }

            tracing::info!("attempting strategy: {}", strategy.kind());

            match strategy.acquire(reference).await {
                Ok(transcript) => {
                    let acquisition = Acquisition {
                        transcript: transcript.to_string(),
                        method: strategy.kind(),
                        retrieved_at: Utc::now(),
                    };

                    // archival copy is best-effort, never fatal
                    if let Err(e) = self.archive.store(&acquisition.transcript).await {
                        tracing::warn!("archive write failed: {}", e);
                    }

                    return Ok(acquisition);
                }
                Err(e) => {
                    tracing::warn!("{} failed: {}", strategy.kind(), e);
                    last_failure = Some(e);
                }
            }
        }

        Err(last_failure
            .unwrap_or_else(|| StrategyError::UnrecognizedReference(reference.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryArchive;
    use crate::strategies::ErrorKind;
    use crate::subtitle::{normalize_lines, Transcript};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Strategy with a scripted outcome, recording whether it ran
    struct Scripted {
        kind: StrategyKind,
        outcome: fn() -> Result<Transcript, StrategyError>,
        gate_on_not_found: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(
            kind: StrategyKind,
            outcome: fn() -> Result<Transcript, StrategyError>,
        ) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Box::new(Self {
                    kind,
                    outcome,
                    gate_on_not_found: false,
                    calls: calls.clone(),
                }),
                calls,
            )
        }

        fn gated(
            kind: StrategyKind,
            outcome: fn() -> Result<Transcript, StrategyError>,
        ) -> (Box<Self>, Arc<AtomicUsize>) {
            let (mut s, calls) = Self::new(kind, outcome);
            s.gate_on_not_found = true;
            (s, calls)
        }
    }

    #[async_trait]
    impl AcquisitionStrategy for Scripted {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn applies_to(&self, _reference: &str) -> bool {
            true
        }

        fn should_attempt(&self, prior: Option<&StrategyError>) -> bool {
            if self.gate_on_not_found {
                matches!(prior, Some(e) if e.kind() == ErrorKind::NotFound)
            } else {
                true
            }
        }

        async fn acquire(&self, _reference: &str) -> Result<Transcript, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn ok_transcript() -> Result<Transcript, StrategyError> {
        Ok(normalize_lines(["scripted success"]))
    }

    fn pipeline(strategies: Vec<Box<dyn AcquisitionStrategy>>) -> (HarvestPipeline, Arc<MemoryArchive>) {
        let archive = Arc::new(MemoryArchive::default());
        (HarvestPipeline::with_parts(strategies, archive.clone()), archive)
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let (s1, c1) = Scripted::new(StrategyKind::DirectCaptionDownload, || {
            Err(StrategyError::CaptionsNotFound)
        });
        let (s2, c2) = Scripted::new(StrategyKind::ToolCaptionExtraction, || {
            Err(StrategyError::CaptionsNotFound)
        });
        let (s3, c3) = Scripted::new(StrategyKind::RemoteTranscriptApi, ok_transcript);
        let (s4, c4) = Scripted::new(StrategyKind::SpeechToTextFallback, ok_transcript);

        let (pipeline, _) = pipeline(vec![s1, s2, s3, s4]);
        let acquisition = pipeline.acquire("https://example.com/v").await.unwrap();

        assert_eq!(acquisition.method, StrategyKind::RemoteTranscriptApi);
        assert_eq!(acquisition.transcript, "Scripted success");
        assert_eq!(c1.load(Ordering::SeqCst), 1);
        assert_eq!(c2.load(Ordering::SeqCst), 1);
        assert_eq!(c3.load(Ordering::SeqCst), 1);
        // never invoked after a success
        assert_eq!(c4.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_reports_last_failure() {
        // tool extraction ran but found nothing, page scan found no link,
        // then the transcript API said transcripts are disabled
        let (s1, _) = Scripted::new(StrategyKind::ToolCaptionExtraction, || {
            Err(StrategyError::CaptionsNotFound)
        });
        let (s2, _) = Scripted::new(StrategyKind::HtmlPageCaptionScan, || {
            Err(StrategyError::NoEmbeddedCaptionLink)
        });
        let (s3, _) = Scripted::new(StrategyKind::RemoteTranscriptApi, || {
            Err(StrategyError::TranscriptUnavailable("disabled".into()))
        });

        let (pipeline, _) = pipeline(vec![s1, s2, s3]);
        let err = pipeline.acquire("https://example.com/v").await.unwrap_err();

        // the most downstream failure wins, not the earlier not-found
        assert_eq!(err.kind(), ErrorKind::RemoteApi);
        assert!(matches!(err, StrategyError::TranscriptUnavailable(_)));
    }

    #[tokio::test]
    async fn test_gated_strategy_skipped_after_hard_tool_failure() {
        let (s1, _) = Scripted::new(StrategyKind::ToolCaptionExtraction, || {
            Err(StrategyError::ToolFailed {
                stderr: "video unavailable".into(),
            })
        });
        let (s2, page_calls) = Scripted::gated(StrategyKind::HtmlPageCaptionScan, ok_transcript);
        let (s3, c3) = Scripted::new(StrategyKind::SpeechToTextFallback, ok_transcript);

        let (pipeline, _) = pipeline(vec![s1, s2, s3]);
        let acquisition = pipeline.acquire("https://example.com/v").await.unwrap();

        assert_eq!(page_calls.load(Ordering::SeqCst), 0);
        assert_eq!(c3.load(Ordering::SeqCst), 1);
        assert_eq!(acquisition.method, StrategyKind::SpeechToTextFallback);
    }

    #[tokio::test]
    async fn test_gated_strategy_runs_after_not_found() {
        let (s1, _) = Scripted::new(StrategyKind::ToolCaptionExtraction, || {
            Err(StrategyError::CaptionsNotFound)
        });
        let (s2, page_calls) = Scripted::gated(StrategyKind::HtmlPageCaptionScan, ok_transcript);

        let (pipeline, _) = pipeline(vec![s1, s2]);
        let acquisition = pipeline.acquire("https://example.com/v").await.unwrap();

        assert_eq!(page_calls.load(Ordering::SeqCst), 1);
        assert_eq!(acquisition.method, StrategyKind::HtmlPageCaptionScan);
    }

    #[tokio::test]
    async fn test_empty_reference_is_missing_input() {
        let (pipeline, _) = pipeline(Vec::new());
        let err = pipeline.acquire("   ").await.unwrap_err();
        assert!(matches!(err, StrategyError::MissingReference));
    }

    #[tokio::test]
    async fn test_success_is_archived() {
        let (s1, _) = Scripted::new(StrategyKind::DirectCaptionDownload, ok_transcript);
        let (pipeline, archive) = pipeline(vec![s1]);

        pipeline.acquire("https://example.com/talk.vtt").await.unwrap();

        assert_eq!(archive.stored(), vec!["Scripted success".to_string()]);
    }
}
