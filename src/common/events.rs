use super::types::RequestToken;

/// Results the worker reports back to the UI.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    CaptionsLoaded {
        token: RequestToken,
        text: String,
    },
    CaptionsFailed {
        token: RequestToken,
        error: String,
    },
    /// `text` is the draft that was sent, `reply` the first candidate.
    GenerationCompleted {
        token: RequestToken,
        text: String,
        reply: String,
    },
    GenerationFailed {
        token: RequestToken,
        error: String,
    },
}
