use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::common::{RequestKind, RequestToken, WorkerCommand, WorkerEvent};

use super::captions::{CaptionSource, join_cues};
use super::generator::{TextGenerator, render_prompt};

/// Background worker: runs captions fetches and generation calls off the UI thread.
///
/// Every request becomes its own task. A newer request of the same kind, or an
/// explicit cancel, aborts the task still in flight.
pub struct ScrapeClient {
    event_sender: mpsc::Sender<WorkerEvent>,
    command_receiver: mpsc::Receiver<WorkerCommand>,
    captions: Arc<dyn CaptionSource>,
    generator: Arc<dyn TextGenerator>,
    prompt_template: Option<String>,
    in_flight: HashMap<RequestKind, JoinHandle<()>>,
}

impl ScrapeClient {
    pub fn new(
        event_sender: mpsc::Sender<WorkerEvent>,
        command_receiver: mpsc::Receiver<WorkerCommand>,
        captions: Arc<dyn CaptionSource>,
        generator: Arc<dyn TextGenerator>,
        prompt_template: Option<String>,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            captions,
            generator,
            prompt_template,
            in_flight: HashMap::new(),
        }
    }

    pub async fn run(mut self) -> Result<(), Box<dyn Error>> {
        log::info!("Worker event loop started");

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command);
        }

        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        log::info!("Command channel closed; worker stopping");
        Ok(())
    }

    fn handle_command(&mut self, command: WorkerCommand) {
        match command {
            WorkerCommand::FetchCaptions {
                token,
                video_id,
                language,
            } => {
                let handle = tokio::spawn(load_captions(
                    self.captions.clone(),
                    self.event_sender.clone(),
                    token,
                    video_id,
                    language,
                ));
                self.track(RequestKind::Captions, handle);
            }
            WorkerCommand::Generate { token, text } => {
                let prompt = render_prompt(self.prompt_template.as_deref(), &text);
                let handle = tokio::spawn(generate_reply(
                    self.generator.clone(),
                    self.event_sender.clone(),
                    token,
                    text,
                    prompt,
                ));
                self.track(RequestKind::Generation, handle);
            }
            WorkerCommand::Cancel(kind) => {
                if let Some(handle) = self.in_flight.remove(&kind) {
                    if !handle.is_finished() {
                        log::info!("Cancelling in-flight {kind:?} request");
                    }
                    handle.abort();
                }
            }
        }
    }

    fn track(&mut self, kind: RequestKind, handle: JoinHandle<()>) {
        if let Some(previous) = self.in_flight.insert(kind, handle) {
            if !previous.is_finished() {
                log::debug!("Superseding in-flight {kind:?} request");
            }
            previous.abort();
        }
    }
}

async fn load_captions(
    source: Arc<dyn CaptionSource>,
    event_sender: mpsc::Sender<WorkerEvent>,
    token: RequestToken,
    video_id: String,
    language: String,
) {
    let event = match source.fetch_subtitles(&video_id, &language).await {
        Ok(cues) => WorkerEvent::CaptionsLoaded {
            token,
            text: join_cues(&cues),
        },
        Err(err) => {
            log::warn!("Failed to load captions for {video_id}: {err}");
            WorkerEvent::CaptionsFailed {
                token,
                error: err.to_string(),
            }
        }
    };

    if let Err(err) = event_sender.send(event).await {
        log::warn!("Failed to notify UI about captions: {err}");
    }
}

async fn generate_reply(
    generator: Arc<dyn TextGenerator>,
    event_sender: mpsc::Sender<WorkerEvent>,
    token: RequestToken,
    text: String,
    prompt: String,
) {
    let event = match generator.generate(&prompt).await {
        Ok(reply) => WorkerEvent::GenerationCompleted { token, text, reply },
        Err(err) => {
            log::error!("Text generation failed: {err}");
            WorkerEvent::GenerationFailed {
                token,
                error: err.to_string(),
            }
        }
    };

    if let Err(err) = event_sender.send(event).await {
        log::warn!("Failed to notify UI about generation result: {err}");
    }
}
