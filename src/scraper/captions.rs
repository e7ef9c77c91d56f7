use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::error::CaptionError;

/// One timed subtitle line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionCue {
    /// Seconds from the start of the video.
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

/// Anything that can produce caption cues for a video.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch_subtitles(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Vec<CaptionCue>, CaptionError>;
}

/// Concatenates cue text in cue order, one space between cues.
pub fn join_cues(cues: &[CaptionCue]) -> String {
    cues.iter()
        .map(|cue| cue.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

const CAPTION_TRACKS_MARKER: &str = "\"captionTracks\":";

static CUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<text start="([^"]*)" dur="([^"]*)"[^>]*>(.*?)</text>"#)
        .expect("cue pattern is valid")
});
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static NUMERIC_ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:x([0-9a-fA-F]+)|([0-9]+));").expect("entity pattern is valid")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    vss_id: String,
}

/// Scrapes the caption tracks advertised on a video's watch page.
pub struct YoutubeCaptionScraper {
    http: reqwest::Client,
    base_url: String,
}

impl YoutubeCaptionScraper {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CaptionError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, CaptionError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CaptionError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptionScraper {
    async fn fetch_subtitles(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Vec<CaptionCue>, CaptionError> {
        let page_url = format!("{}/watch?v={}", self.base_url, video_id);
        log::debug!("Fetching watch page {page_url}");
        let page = self.fetch_text(&page_url).await?;

        let tracks = parse_caption_tracks(&page, video_id)?;
        let track = select_track(&tracks, language).ok_or_else(|| {
            CaptionError::LanguageUnavailable {
                video_id: video_id.to_string(),
                language: language.to_string(),
            }
        })?;

        let transcript = self.fetch_text(&track.base_url).await?;
        let cues = parse_cues(&transcript);
        if cues.is_empty() {
            return Err(CaptionError::NoCaptions(video_id.to_string()));
        }

        let span = cues
            .last()
            .map(|cue| cue.start + cue.duration)
            .unwrap_or_default();
        log::info!(
            "Loaded {} caption cues ({span:.0}s) for {video_id} ({language})",
            cues.len()
        );
        Ok(cues)
    }
}

fn parse_caption_tracks(page: &str, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError> {
    let Some(position) = page.find(CAPTION_TRACKS_MARKER) else {
        if page.contains("class=\"g-recaptcha\"") {
            return Err(CaptionError::BotChallenge);
        }
        if !page.contains("\"playabilityStatus\":") {
            return Err(CaptionError::VideoUnavailable(video_id.to_string()));
        }
        return Err(CaptionError::NoCaptions(video_id.to_string()));
    };

    let rest = &page[position + CAPTION_TRACKS_MARKER.len()..];
    serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .ok_or_else(|| CaptionError::Malformed("caption track list is missing".to_string()))?
        .map_err(|err| CaptionError::Malformed(err.to_string()))
}

/// Prefers manual tracks (`.en`) over auto-generated ones (`a.en`).
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let manual = format!(".{language}");
    let automatic = format!("a.{language}");
    tracks
        .iter()
        .find(|track| track.vss_id == manual)
        .or_else(|| tracks.iter().find(|track| track.vss_id == automatic))
        .or_else(|| tracks.iter().find(|track| track.vss_id.contains(&manual)))
}

fn parse_cues(transcript: &str) -> Vec<CaptionCue> {
    CUE_PATTERN
        .captures_iter(transcript)
        .map(|captures| {
            let start = captures[1].parse().unwrap_or_default();
            let duration = captures[2].parse().unwrap_or_default();
            CaptionCue {
                start,
                duration,
                text: clean_cue_text(&captures[3]),
            }
        })
        .collect()
}

// Cue text arrives escaped twice (`&amp;#39;`), and may carry inline tags.
fn clean_cue_text(raw: &str) -> String {
    let decoded = decode_entities(&decode_entities(raw));
    let stripped = TAG_PATTERN.replace_all(&decoded, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(input: &str) -> String {
    let named = input
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ");
    let numeric = NUMERIC_ENTITY_PATTERN.replace_all(&named, |captures: &regex::Captures| {
        let code = match (captures.get(1), captures.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| captures[0].to_string())
    });
    numeric.replace("&amp;", "&")
}
