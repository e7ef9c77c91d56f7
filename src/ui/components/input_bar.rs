use eframe::egui;

/// What the user asked for from the message row this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Send,
    Cancel,
}

pub fn render(
    ui: &mut egui::Ui,
    input_text: &mut String,
    is_generating: bool,
) -> Option<InputAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        let button_width = 90.0;
        let response = ui.add(
            egui::TextEdit::singleline(input_text)
                .hint_text("Let's talk...")
                .desired_width(ui.available_width() - button_width),
        );

        if is_generating {
            ui.spinner();
            if ui.button("Cancel").clicked() {
                action = Some(InputAction::Cancel);
            }
            return;
        }

        if ui.button("Send").clicked() {
            action = Some(InputAction::Send);
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            action = Some(InputAction::Send);
        }
    });

    action
}
