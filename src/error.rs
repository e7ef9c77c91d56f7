use thiserror::Error;

/// Failures while retrieving captions for a video.
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("captions request returned HTTP {0}")]
    Status(u16),

    #[error("YouTube answered with a bot challenge")]
    BotChallenge,

    #[error("video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("no captions found for video {0}")]
    NoCaptions(String),

    #[error("no captions in language `{language}` for video {video_id}")]
    LanguageUnavailable { video_id: String, language: String },

    #[error("malformed caption data: {0}")]
    Malformed(String),
}

/// Failures while calling the text-generation endpoint.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("missing API key (set {0})")]
    MissingApiKey(&'static str),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("api error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response contained no candidates")]
    EmptyCandidates,

    #[error("first candidate had no output")]
    EmptyOutput,
}
