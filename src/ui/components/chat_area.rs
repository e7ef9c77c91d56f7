use chrono::{Local, TimeZone};
use eframe::egui;

use crate::common::{Message, Sender};

const USER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
const BOT_BUBBLE: egui::Color32 = egui::Color32::from_rgb(229, 231, 235);

pub fn render(ui: &mut egui::Ui, messages: &[Message]) {
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            if messages.is_empty() {
                ui.label(
                    egui::RichText::new("Paste a YouTube link and press Learn, or just ask something.")
                        .weak(),
                );
                return;
            }

            for message in messages {
                let layout = match message.sender {
                    Sender::User => egui::Layout::right_to_left(egui::Align::TOP),
                    Sender::Bot => egui::Layout::left_to_right(egui::Align::TOP),
                };
                ui.push_id(message.id, |ui| {
                    ui.with_layout(layout, |ui| bubble(ui, message));
                });
                ui.add_space(8.0);
            }
        });
}

fn bubble(ui: &mut egui::Ui, message: &Message) {
    let (fill, text_color) = match message.sender {
        Sender::User => (USER_BUBBLE, egui::Color32::WHITE),
        Sender::Bot => (BOT_BUBBLE, egui::Color32::BLACK),
    };
    let max_width = ui.available_width() * 0.75;

    egui::Frame::new()
        .fill(fill)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.set_max_width(max_width);
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(&message.text).color(text_color));
                ui.label(
                    egui::RichText::new(format_local_time(message.timestamp))
                        .small()
                        .color(text_color),
                );
            });
        });
}

/// Local wall-clock time of an epoch-millisecond timestamp.
pub fn format_local_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}
