use eframe::egui;

/// What the user asked for from the URL row this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlAction {
    Learn,
    Cancel,
}

pub fn render(ui: &mut egui::Ui, youtube_url: &mut String, is_loading: bool) -> Option<UrlAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        ui.label("YouTube URL:");
        let response = ui.add(
            egui::TextEdit::singleline(youtube_url)
                .hint_text("https://youtu.be/...")
                .desired_width(ui.available_width() - 90.0),
        );

        if is_loading {
            ui.spinner();
            if ui.button("Cancel").clicked() {
                action = Some(UrlAction::Cancel);
            }
            return;
        }

        if ui.button("Learn").clicked() {
            action = Some(UrlAction::Learn);
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            action = Some(UrlAction::Learn);
        }
    });

    action
}
