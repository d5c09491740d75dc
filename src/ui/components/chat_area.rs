use alloy_primitives::Address;
use eframe::egui;

use crate::common::{ChatMessage, short_address};
use crate::feed::chat::HistoryState;

pub fn render(ui: &mut egui::Ui, self_address: &Address, history: &HistoryState, max_height: f32) {
    match history {
        HistoryState::Unselected => {
            ui.label("Please choose address");
        }
        HistoryState::Loading => {
            ui.vertical_centered(|ui| {
                ui.spinner();
            });
        }
        HistoryState::Failed(error) => {
            ui.colored_label(egui::Color32::RED, format!("Could not load messages: {error}"));
        }
        HistoryState::Loaded(messages) if messages.is_empty() => {
            ui.label(egui::RichText::new("No messages yet").weak());
        }
        HistoryState::Loaded(messages) => {
            egui::ScrollArea::vertical()
                .max_height(max_height)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for message in messages {
                        ui.push_id(message.original_index, |ui| {
                            render_message(ui, self_address, message);
                        });
                    }
                });
        }
    }
}

fn render_message(ui: &mut egui::Ui, self_address: &Address, message: &ChatMessage) {
    let own = message.sender == *self_address;
    let layout = if own {
        egui::Layout::right_to_left(egui::Align::TOP)
    } else {
        egui::Layout::left_to_right(egui::Align::TOP)
    };

    ui.with_layout(layout, |ui| {
        ui.vertical(|ui| {
            let who = if own {
                "You".to_string()
            } else {
                short_address(&message.sender)
            };
            let when = message
                .timestamp
                .as_datetime()
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| message.timestamp.to_string());
            ui.label(egui::RichText::new(format!("{who} · {when}")).small().weak());
            ui.label(&message.message);
        });
    });
}
