use super::types::{RequestKind, RequestToken};

/// Commands the UI sends to the background worker.
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    /// Fetch captions for a video and fold them into one text blob.
    FetchCaptions {
        token: RequestToken,
        video_id: String,
        language: String,
    },
    /// Send the draft text to the text-generation endpoint.
    Generate { token: RequestToken, text: String },
    /// Abort whatever request of this kind is still in flight.
    Cancel(RequestKind),
}
