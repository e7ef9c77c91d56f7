use serde::{Deserialize, Serialize};

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Ties a worker event back to the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(pub u64);

/// The two kinds of outbound request the worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Captions,
    Generation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_serializes_lowercase() {
        let message = Message {
            id: 1,
            text: "hi".to_string(),
            sender: Sender::Bot,
            timestamp: 0,
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["sender"], "bot");
    }
}
