use chrono::Utc;

use crate::common::{Message, RequestKind, RequestToken, Sender, WorkerCommand, WorkerEvent};
use crate::scraper::extract_video_id;

/// Local session state of the chat window.
pub struct AppState {
    pub messages: Vec<Message>,
    pub youtube_url_input: String,
    pub input_text: String,
    pub is_generating: bool,
    pub is_loading_captions: bool,
    /// Captions that arrived while the user was typing; waiting for a decision.
    pub pending_captions: Option<String>,
    pub last_error: Option<String>,
    next_message_id: u64,
    next_token: u64,
    generation_token: Option<RequestToken>,
    captions_token: Option<RequestToken>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            youtube_url_input: String::new(),
            input_text: String::new(),
            is_generating: false,
            is_loading_captions: false,
            pending_captions: None,
            last_error: None,
            next_message_id: 1,
            next_token: 1,
            generation_token: None,
            captions_token: None,
        }
    }

    /// Learn: turns the URL field into a captions request.
    pub fn request_captions(&mut self, language: &str) -> Option<WorkerCommand> {
        let Some(video_id) = extract_video_id(&self.youtube_url_input) else {
            log::info!("No video id in `{}`", self.youtube_url_input.trim());
            self.last_error = Some("No YouTube video id found in that URL".to_string());
            return None;
        };

        let token = self.allocate_token();
        self.captions_token = Some(token);
        self.is_loading_captions = true;
        self.last_error = None;
        Some(WorkerCommand::FetchCaptions {
            token,
            video_id,
            language: language.to_string(),
        })
    }

    /// Send: blank drafts and a request already in flight are no-ops.
    pub fn request_generation(&mut self) -> Option<WorkerCommand> {
        if self.is_generating || self.input_text.trim().is_empty() {
            return None;
        }

        let token = self.allocate_token();
        self.generation_token = Some(token);
        self.is_generating = true;
        self.last_error = None;
        Some(WorkerCommand::Generate {
            token,
            text: self.input_text.clone(),
        })
    }

    /// Drops the in-flight request of `kind`; its result will be ignored.
    pub fn cancel(&mut self, kind: RequestKind) -> Option<WorkerCommand> {
        let pending = match kind {
            RequestKind::Generation => {
                self.is_generating = false;
                self.generation_token.take()
            }
            RequestKind::Captions => {
                self.is_loading_captions = false;
                self.captions_token.take()
            }
        };
        pending.map(|_| WorkerCommand::Cancel(kind))
    }

    pub fn apply_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::CaptionsLoaded { token, text } => {
                if !self.take_if_current(RequestKind::Captions, token) {
                    return;
                }
                self.is_loading_captions = false;
                if self.input_text.trim().is_empty() {
                    self.input_text = text;
                } else if self.pending_captions.replace(text).is_some() {
                    log::debug!("Newer captions replaced ones still waiting for a decision");
                }
            }
            WorkerEvent::CaptionsFailed { token, error } => {
                if !self.take_if_current(RequestKind::Captions, token) {
                    return;
                }
                self.is_loading_captions = false;
                self.last_error = Some(format!("Could not load captions: {error}"));
            }
            WorkerEvent::GenerationCompleted { token, text, reply } => {
                if !self.take_if_current(RequestKind::Generation, token) {
                    return;
                }
                // Keep anything typed after Send.
                if self.input_text == text {
                    self.input_text.clear();
                }
                self.push_message(text, Sender::User);
                self.push_message(reply, Sender::Bot);
                self.is_generating = false;
            }
            WorkerEvent::GenerationFailed { token, error } => {
                if !self.take_if_current(RequestKind::Generation, token) {
                    return;
                }
                self.is_generating = false;
                self.last_error = Some(format!("Could not get a reply: {error}"));
            }
        }
    }

    pub fn replace_draft_with_captions(&mut self) {
        if let Some(captions) = self.pending_captions.take() {
            self.input_text = captions;
        }
    }

    pub fn append_captions_to_draft(&mut self) {
        if let Some(captions) = self.pending_captions.take() {
            if !self.input_text.is_empty() && !self.input_text.ends_with(char::is_whitespace) {
                self.input_text.push(' ');
            }
            self.input_text.push_str(&captions);
        }
    }

    pub fn discard_captions(&mut self) {
        self.pending_captions = None;
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    fn push_message(&mut self, text: String, sender: Sender) {
        let message = Message {
            id: self.next_message_id,
            text,
            sender,
            timestamp: Utc::now().timestamp_millis(),
        };
        self.next_message_id += 1;
        self.messages.push(message);
    }

    fn allocate_token(&mut self) -> RequestToken {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        token
    }

    fn take_if_current(&mut self, kind: RequestKind, token: RequestToken) -> bool {
        let current = match kind {
            RequestKind::Captions => &mut self.captions_token,
            RequestKind::Generation => &mut self.generation_token,
        };
        if *current == Some(token) {
            *current = None;
            true
        } else {
            log::debug!("Discarding stale {kind:?} result for {token:?}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(state: &mut AppState, draft: &str) -> RequestToken {
        state.input_text = draft.to_string();
        match state.request_generation() {
            Some(WorkerCommand::Generate { token, text }) => {
                assert_eq!(text, draft);
                token
            }
            other => panic!("expected a generate command, got {other:?}"),
        }
    }

    fn learn(state: &mut AppState, url: &str) -> RequestToken {
        state.youtube_url_input = url.to_string();
        match state.request_captions("en") {
            Some(WorkerCommand::FetchCaptions {
                token,
                video_id,
                language,
            }) => {
                assert_eq!(video_id, "dQw4w9WgXcQ");
                assert_eq!(language, "en");
                token
            }
            other => panic!("expected a captions command, got {other:?}"),
        }
    }

    #[test]
    fn blank_draft_is_a_no_op() {
        let mut state = AppState::new();
        for draft in ["", "   ", "\n\t"] {
            state.input_text = draft.to_string();
            assert!(state.request_generation().is_none());
            assert!(!state.is_generating);
            assert!(state.messages.is_empty());
        }
    }

    #[test]
    fn successful_generation_appends_user_then_bot() {
        let mut state = AppState::new();
        let token = generate(&mut state, "What is photosynthesis?");
        assert!(state.is_generating);

        state.apply_event(WorkerEvent::GenerationCompleted {
            token,
            text: "What is photosynthesis?".to_string(),
            reply: "It is...".to_string(),
        });

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].text, "What is photosynthesis?");
        assert_eq!(state.messages[0].sender, Sender::User);
        assert_eq!(state.messages[1].text, "It is...");
        assert_eq!(state.messages[1].sender, Sender::Bot);
        assert_eq!(state.input_text, "");
        assert!(!state.is_generating);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn failed_generation_leaves_transcript_alone() {
        let mut state = AppState::new();
        let token = generate(&mut state, "hello");

        state.apply_event(WorkerEvent::GenerationFailed {
            token,
            error: "api error: 500 - boom".to_string(),
        });

        assert!(state.messages.is_empty());
        assert!(!state.is_generating);
        assert_eq!(state.input_text, "hello");
        assert!(state.last_error.as_deref().unwrap().contains("500"));
    }

    #[test]
    fn second_send_while_busy_is_ignored() {
        let mut state = AppState::new();
        generate(&mut state, "first");
        state.input_text = "second".to_string();
        assert!(state.request_generation().is_none());
    }

    #[test]
    fn message_ids_strictly_increase() {
        let mut state = AppState::new();
        for round in 0..3 {
            let draft = format!("question {round}");
            let token = generate(&mut state, &draft);
            state.apply_event(WorkerEvent::GenerationCompleted {
                token,
                text: draft,
                reply: "answer".to_string(),
            });
        }

        let ids: Vec<u64> = state.messages.iter().map(|message| message.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert!(
            state
                .messages
                .windows(2)
                .all(|pair| pair[0].timestamp <= pair[1].timestamp)
        );
    }

    #[test]
    fn stale_generation_result_is_ignored() {
        let mut state = AppState::new();
        let stale = generate(&mut state, "slow");
        state.cancel(RequestKind::Generation);
        let current = generate(&mut state, "fast");

        state.apply_event(WorkerEvent::GenerationCompleted {
            token: stale,
            text: "slow".to_string(),
            reply: "late".to_string(),
        });
        assert!(state.messages.is_empty());
        assert!(state.is_generating);

        state.apply_event(WorkerEvent::GenerationCompleted {
            token: current,
            text: "fast".to_string(),
            reply: "on time".to_string(),
        });
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].text, "on time");
    }

    #[test]
    fn cancel_clears_busy_and_emits_command_once() {
        let mut state = AppState::new();
        generate(&mut state, "hello");

        assert!(matches!(
            state.cancel(RequestKind::Generation),
            Some(WorkerCommand::Cancel(RequestKind::Generation))
        ));
        assert!(!state.is_generating);
        assert!(state.cancel(RequestKind::Generation).is_none());
    }

    #[test]
    fn url_without_video_id_reports_error() {
        let mut state = AppState::new();
        state.youtube_url_input = "https://example.com/video".to_string();

        assert!(state.request_captions("en").is_none());
        assert!(!state.is_loading_captions);
        assert!(state.last_error.is_some());
    }

    #[test]
    fn captions_fill_a_blank_draft() {
        let mut state = AppState::new();
        let token = learn(&mut state, "https://youtu.be/dQw4w9WgXcQ");
        assert!(state.is_loading_captions);

        state.apply_event(WorkerEvent::CaptionsLoaded {
            token,
            text: "never gonna give you up".to_string(),
        });

        assert_eq!(state.input_text, "never gonna give you up");
        assert!(state.pending_captions.is_none());
        assert!(!state.is_loading_captions);
    }

    #[test]
    fn captions_never_clobber_typed_draft() {
        let mut state = AppState::new();
        let token = learn(&mut state, "https://youtu.be/dQw4w9WgXcQ");
        state.input_text = "Summarize:".to_string();

        state.apply_event(WorkerEvent::CaptionsLoaded {
            token,
            text: "the captions".to_string(),
        });
        assert_eq!(state.input_text, "Summarize:");
        assert_eq!(state.pending_captions.as_deref(), Some("the captions"));

        state.append_captions_to_draft();
        assert_eq!(state.input_text, "Summarize: the captions");
        assert!(state.pending_captions.is_none());
    }

    #[test]
    fn pending_captions_can_replace_or_be_discarded() {
        let mut state = AppState::new();
        state.input_text = "draft".to_string();
        state.pending_captions = Some("captions".to_string());
        state.replace_draft_with_captions();
        assert_eq!(state.input_text, "captions");

        state.pending_captions = Some("more".to_string());
        state.discard_captions();
        assert_eq!(state.input_text, "captions");
        assert!(state.pending_captions.is_none());
    }

    #[test]
    fn captions_failure_keeps_draft() {
        let mut state = AppState::new();
        let token = learn(&mut state, "https://youtu.be/dQw4w9WgXcQ");
        state.input_text = "my draft".to_string();

        state.apply_event(WorkerEvent::CaptionsFailed {
            token,
            error: "no captions found".to_string(),
        });

        assert_eq!(state.input_text, "my draft");
        assert!(!state.is_loading_captions);
        assert!(state.last_error.is_some());
        state.dismiss_error();
        assert!(state.last_error.is_none());
    }

    #[test]
    fn newer_learn_supersedes_older_captions() {
        let mut state = AppState::new();
        let first = learn(&mut state, "https://youtu.be/dQw4w9WgXcQ");
        let second = learn(&mut state, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");

        state.apply_event(WorkerEvent::CaptionsLoaded {
            token: first,
            text: "old".to_string(),
        });
        assert_eq!(state.input_text, "");
        assert!(state.is_loading_captions);

        state.apply_event(WorkerEvent::CaptionsLoaded {
            token: second,
            text: "new".to_string(),
        });
        assert_eq!(state.input_text, "new");
    }

    #[test]
    fn text_typed_while_waiting_survives_the_reply() {
        let mut state = AppState::new();
        let token = generate(&mut state, "first question");
        state.input_text = "follow-up I typed while waiting".to_string();

        state.apply_event(WorkerEvent::GenerationCompleted {
            token,
            text: "first question".to_string(),
            reply: "answer".to_string(),
        });

        assert_eq!(state.input_text, "follow-up I typed while waiting");
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].text, "first question");
        assert!(!state.is_generating);
    }

    #[test]
    fn newer_pending_captions_replace_older_ones() {
        let mut state = AppState::new();
        state.input_text = "typing".to_string();
        let first = learn(&mut state, "https://youtu.be/dQw4w9WgXcQ");
        state.apply_event(WorkerEvent::CaptionsLoaded {
            token: first,
            text: "old captions".to_string(),
        });
        let second = learn(&mut state, "https://youtu.be/dQw4w9WgXcQ");
        state.apply_event(WorkerEvent::CaptionsLoaded {
            token: second,
            text: "new captions".to_string(),
        });

        assert_eq!(state.pending_captions.as_deref(), Some("new captions"));
        assert_eq!(state.input_text, "typing");
    }

    #[test]
    fn cancelling_captions_ignores_late_result() {
        let mut state = AppState::new();
        let token = learn(&mut state, "https://youtu.be/dQw4w9WgXcQ");

        assert!(matches!(
            state.cancel(RequestKind::Captions),
            Some(WorkerCommand::Cancel(RequestKind::Captions))
        ));
        assert!(!state.is_loading_captions);

        state.apply_event(WorkerEvent::CaptionsLoaded {
            token,
            text: "too late".to_string(),
        });
        assert_eq!(state.input_text, "");
        assert!(state.pending_captions.is_none());
    }

    mod round_trip {
        use std::sync::Arc;
        use std::time::Duration;

        use serde_json::json;
        use tokio::sync::mpsc;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use crate::common::{Sender, WorkerCommand, WorkerEvent};
        use crate::config::GenerationSettings;
        use crate::scraper::{PalmClient, ScrapeClient, YoutubeCaptionScraper};
        use crate::ui::state::AppState;

        async fn start_worker(
            server: &MockServer,
            timeout: Duration,
        ) -> (mpsc::Sender<WorkerCommand>, mpsc::Receiver<WorkerEvent>) {
            let captions = YoutubeCaptionScraper::new(server.uri(), timeout).unwrap();
            let generator = PalmClient::new(
                format!("{}/generate", server.uri()),
                Some("test-key".to_string()),
                GenerationSettings::default(),
                timeout,
            )
            .unwrap();
            let (cmd_tx, cmd_rx) = mpsc::channel(4);
            let (event_tx, event_rx) = mpsc::channel(4);
            let worker = ScrapeClient::new(
                event_tx,
                cmd_rx,
                Arc::new(captions),
                Arc::new(generator),
                None,
            );
            tokio::spawn(async move {
                worker.run().await.unwrap();
            });
            (cmd_tx, event_rx)
        }

        async fn send_draft(server: &MockServer, state: &mut AppState, draft: &str) {
            send_draft_within(server, state, draft, Duration::from_secs(5)).await;
        }

        async fn send_draft_within(
            server: &MockServer,
            state: &mut AppState,
            draft: &str,
            timeout: Duration,
        ) {
            let (commands, mut events) = start_worker(server, timeout).await;
            state.input_text = draft.to_string();
            if let Some(command) = state.request_generation() {
                commands.send(command).await.unwrap();
                let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
                    .await
                    .unwrap()
                    .unwrap();
                state.apply_event(event);
            }
        }

        #[tokio::test]
        async fn photosynthesis_scenario() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/generate"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "candidates": [{ "output": "It is..." }]
                })))
                .mount(&server)
                .await;

            let mut state = AppState::new();
            send_draft(&server, &mut state, "What is photosynthesis?").await;

            let transcript: Vec<(&str, Sender)> = state
                .messages
                .iter()
                .map(|message| (message.text.as_str(), message.sender))
                .collect();
            assert_eq!(
                transcript,
                vec![
                    ("What is photosynthesis?", Sender::User),
                    ("It is...", Sender::Bot)
                ]
            );
            assert_eq!(state.input_text, "");
            assert!(!state.is_generating);
        }

        #[tokio::test]
        async fn whitespace_draft_issues_no_request() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;

            let mut state = AppState::new();
            send_draft(&server, &mut state, "   ").await;

            assert!(state.messages.is_empty());
            assert!(!state.is_generating);
        }

        #[tokio::test]
        async fn failing_endpoint_leaves_transcript_unchanged() {
            for response in [
                ResponseTemplate::new(500),
                ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
            ] {
                let server = MockServer::start().await;
                Mock::given(method("POST"))
                    .respond_with(response)
                    .mount(&server)
                    .await;

                let mut state = AppState::new();
                send_draft(&server, &mut state, "hello").await;

                assert!(state.messages.is_empty());
                assert!(!state.is_generating);
                assert!(state.last_error.is_some());
            }
        }

        #[tokio::test]
        async fn timed_out_endpoint_leaves_transcript_unchanged() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "candidates": [{ "output": "late" }] }))
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&server)
                .await;

            let mut state = AppState::new();
            send_draft_within(&server, &mut state, "hello", Duration::from_millis(100)).await;

            assert!(state.messages.is_empty());
            assert!(!state.is_generating);
            assert_eq!(state.input_text, "hello");
            assert!(state.last_error.is_some());
        }
    }
}
