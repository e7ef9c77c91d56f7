use eframe::egui;

use crate::ui::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionChoice {
    Replace,
    Append,
    Discard,
}

#[derive(Default)]
pub struct StatusActions {
    pub dismiss_error: bool,
    pub caption_choice: Option<CaptionChoice>,
}

/// Error line and the prompt for captions that arrived while typing.
pub fn render(ui: &mut egui::Ui, state: &AppState) -> StatusActions {
    let mut actions = StatusActions::default();

    if let Some(error) = &state.last_error {
        ui.horizontal(|ui| {
            ui.colored_label(egui::Color32::RED, error.as_str());
            if ui.small_button("Dismiss").clicked() {
                actions.dismiss_error = true;
            }
        });
    }

    if let Some(captions) = &state.pending_captions {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Captions ready ({} words).",
                captions.split_whitespace().count()
            ));
            if ui.button("Replace draft").clicked() {
                actions.caption_choice = Some(CaptionChoice::Replace);
            }
            if ui.button("Append").clicked() {
                actions.caption_choice = Some(CaptionChoice::Append);
            }
            if ui.button("Discard").clicked() {
                actions.caption_choice = Some(CaptionChoice::Discard);
            }
        });
    }

    actions
}
