use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{RequestKind, WorkerCommand, WorkerEvent};

use super::components::{
    chat_area,
    input_bar::{self, InputAction},
    status_bar::{self, CaptionChoice},
    url_bar::{self, UrlAction},
};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    caption_language: String,
    command_sender: mpsc::Sender<WorkerCommand>,
    event_receiver: mpsc::Receiver<WorkerEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        caption_language: String,
        command_sender: mpsc::Sender<WorkerCommand>,
        event_receiver: mpsc::Receiver<WorkerEvent>,
    ) -> Self {
        Self {
            state: AppState::new(),
            caption_language,
            command_sender,
            event_receiver,
        }
    }

    fn handle_worker_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.apply_event(event);
        }
    }

    fn send_command(&mut self, command: WorkerCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to worker: {err}");
            self.state.last_error = Some("Background worker is unavailable".to_string());
            self.state.is_generating = false;
            self.state.is_loading_captions = false;
        }
    }

    fn handle_url(&mut self, action: UrlAction) {
        let command = match action {
            UrlAction::Learn => self.state.request_captions(&self.caption_language),
            UrlAction::Cancel => self.state.cancel(RequestKind::Captions),
        };
        if let Some(command) = command {
            self.send_command(command);
        }
    }

    fn handle_input(&mut self, action: InputAction) {
        let command = match action {
            InputAction::Send => self.state.request_generation(),
            InputAction::Cancel => self.state.cancel(RequestKind::Generation),
        };
        if let Some(command) = command {
            self.send_command(command);
        }
    }

    fn handle_caption_choice(&mut self, choice: CaptionChoice) {
        match choice {
            CaptionChoice::Replace => self.state.replace_draft_with_captions(),
            CaptionChoice::Append => self.state.append_captions_to_draft(),
            CaptionChoice::Discard => self.state.discard_captions(),
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_worker_events();

        egui::TopBottomPanel::top("url_bar").show(ctx, |ui| {
            ui.heading("Scrape Talk");
            let loading = self.state.is_loading_captions;
            if let Some(action) = url_bar::render(ui, &mut self.state.youtube_url_input, loading) {
                self.handle_url(action);
            }
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("input_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            let actions = status_bar::render(ui, &self.state);
            if actions.dismiss_error {
                self.state.dismiss_error();
            }
            if let Some(choice) = actions.caption_choice {
                self.handle_caption_choice(choice);
            }

            let generating = self.state.is_generating;
            if let Some(action) = input_bar::render(ui, &mut self.state.input_text, generating) {
                self.handle_input(action);
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            chat_area::render(ui, &self.state.messages);
        });

        // Worker results arrive over a channel; poll for them.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
