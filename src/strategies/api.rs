//! Hosted transcript API
//!
//! Only meaningful for YouTube-form references. Extracts the platform-native
//! video id from the reference and queries the timedtext endpoint for the
//! configured language, concatenating the returned segments in order.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{AcquisitionStrategy, StrategyError, StrategyKind};
use crate::subtitle::{normalize_lines, Transcript};

pub struct RemoteTranscriptApi {
    client: Client,
    language: String,
}

impl RemoteTranscriptApi {
    pub fn new(client: Client, language: String) -> Self {
        Self { client, language }
    }
}

/// timedtext `fmt=json3` payload
#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com"
        || host == "www.youtube.com"
        || host == "m.youtube.com"
        || host == "youtu.be"
        || host.ends_with(".youtube.com")
}

/// Pull the video id out of the reference, whichever URL form it uses.
pub fn video_id(reference: &str) -> Option<String> {
    let parsed = Url::parse(reference.trim()).ok()?;
    let host = parsed.host_str()?;
    if !is_youtube_host(host) {
        return None;
    }

    // youtu.be/<id>
    if host.eq_ignore_ascii_case("youtu.be") {
        let seg = parsed.path_segments()?.next()?.trim();
        if !seg.is_empty() {
            return Some(seg.to_string());
        }
        return None;
    }

    // youtube.com/watch?v=<id>
    if parsed.path().starts_with("/watch") {
        for (k, v) in parsed.query_pairs() {
            if k == "v" && !v.trim().is_empty() {
                return Some(v.trim().to_string());
            }
        }
        return None;
    }

    // youtube.com/shorts/<id>, youtube.com/embed/<id>
    let mut segments = parsed.path_segments()?;
    let first = segments.next().unwrap_or("");
    let second = segments.next().unwrap_or("");
    if (first == "shorts" || first == "embed") && !second.trim().is_empty() {
        return Some(second.to_string());
    }

    None
}

#[async_trait]
impl AcquisitionStrategy for RemoteTranscriptApi {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RemoteTranscriptApi
    }

    fn applies_to(&self, reference: &str) -> bool {
        video_id(reference).is_some()
    }

    async fn acquire(&self, reference: &str) -> Result<Transcript, StrategyError> {
        let id = video_id(reference)
            .ok_or_else(|| StrategyError::UnrecognizedReference(reference.to_string()))?;

        tracing::info!("querying transcript API for video {}", id);

        let endpoint = format!(
            "https://www.youtube.com/api/timedtext?v={}&lang={}&fmt=json3",
            id, self.language
        );

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| StrategyError::RemoteApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StrategyError::RemoteApi(format!(
                "HTTP {} from transcript API",
                response.status().as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StrategyError::RemoteApi(e.to_string()))?;

        // the API answers an empty 200 when transcripts are disabled
        if body.trim().is_empty() {
            return Err(StrategyError::TranscriptUnavailable(
                "transcript disabled or not published for this video".to_string(),
            ));
        }

        let document: TimedText = serde_json::from_str(&body)
            .map_err(|e| StrategyError::RemoteApi(format!("unexpected payload: {e}")))?;

        let lines: Vec<String> = document
            .events
            .iter()
            .map(|event| {
                event
                    .segs
                    .iter()
                    .map(|seg| seg.utf8.as_str())
                    .collect::<String>()
            })
            .flat_map(|text| {
                text.lines()
                    .map(|line| line.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|line| !line.is_empty())
            .collect();

        let transcript = normalize_lines(lines.iter().map(String::as_str));

        if transcript.is_empty() {
            return Err(StrategyError::TranscriptUnavailable(
                "transcript API returned no text segments".to_string(),
            ));
        }

        Ok(transcript)
    }
}
