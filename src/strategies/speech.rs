//! Speech-to-text fallback
//!
//! Last resort when no caption source worked: pull the best available audio
//! with yt-dlp, then run whisper on it. Whisper emits plain text with no cue
//! timing, so the caption parser is bypassed and the raw text goes straight to
//! the normalizer. Both the audio file and whisper's output file are scratch
//! handles and disappear on every exit path.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::{AcquisitionStrategy, StrategyError, StrategyKind};
use crate::process::{CommandRunner, ProcessError};
use crate::scratch::Scratch;
use crate::subtitle::{normalize_lines, Transcript};

pub struct SpeechToTextFallback {
    runner: Arc<dyn CommandRunner>,
    scratch: Arc<Scratch>,
    yt_dlp: String,
    whisper: String,
    language: String,
    timeout: Duration,
}

impl SpeechToTextFallback {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        scratch: Arc<Scratch>,
        yt_dlp: String,
        whisper: String,
        language: String,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            scratch,
            yt_dlp,
            whisper,
            language,
            timeout,
        }
    }

    async fn extract_audio(&self, reference: &str, audio_path: &str) -> Result<(), StrategyError> {
        let args = vec![
            "-f".to_string(),
            "bestaudio".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            audio_path.to_string(),
            reference.to_string(),
        ];

        self.runner
            .run(&self.yt_dlp, &args, self.timeout)
            .await
            .map_err(|e| match e {
                ProcessError::TimedOut { .. } => e.into(),
                other => StrategyError::AudioExtractionFailed(other.to_string()),
            })?;

        Ok(())
    }

    async fn transcribe_audio(&self, audio_path: &str, out_dir: &str) -> Result<(), StrategyError> {
        let args = vec![
            audio_path.to_string(),
            "--language".to_string(),
            self.language.clone(),
            "--output_format".to_string(),
            "txt".to_string(),
            "--output_dir".to_string(),
            out_dir.to_string(),
        ];

        self.runner.run(&self.whisper, &args, self.timeout).await?;
        Ok(())
    }
}

#[async_trait]
impl AcquisitionStrategy for SpeechToTextFallback {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SpeechToTextFallback
    }

    fn applies_to(&self, reference: &str) -> bool {
        !reference.trim().is_empty()
    }

    async fn acquire(&self, reference: &str) -> Result<Transcript, StrategyError> {
        tracing::info!("falling back to speech-to-text for: {}", reference);

        let audio = self.scratch.acquire(".mp3");
        let audio_path = audio.path().to_string_lossy().to_string();

        self.extract_audio(reference, &audio_path).await?;

        if !audio.path().exists() {
            return Err(StrategyError::AudioExtractionFailed(
                "yt-dlp reported success but produced no audio file".to_string(),
            ));
        }

        // whisper writes `<stem>.txt` next to the requested output dir
        let text = self.scratch.adopt(audio.path().with_extension("txt"));
        let out_dir = self.scratch.dir().to_string_lossy().to_string();

        let transcription = self.transcribe_audio(&audio_path, &out_dir).await;
        audio.release();
        transcription?;

        if !text.path().exists() {
            return Err(StrategyError::TranscriptOutputMissing(
                text.path().display().to_string(),
            ));
        }

        let raw = fs_err::read_to_string(text.path()).map_err(|e| StrategyError::Io(e.to_string()))?;
        text.release();

        let transcript = normalize_lines(raw.lines());

        if transcript.is_empty() {
            return Err(StrategyError::EmptyTranscript);
        }

        Ok(transcript)
    }
}
