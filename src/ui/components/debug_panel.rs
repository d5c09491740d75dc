use eframe::egui;

use crate::common::PeerSelection;
use crate::feed::chat::HistoryState;
use crate::feed::status::FeedState;
use crate::ui::state::AppState;

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    ui.heading("Activity");
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Chain id:");
        match state.connected_chain {
            Some(id) => ui.label(id.to_string()),
            None => ui.label("(connecting...)"),
        };
    });

    ui.horizontal(|ui| {
        ui.label("Status feed:");
        let summary = match state.status_feed.state() {
            FeedState::Loading => "loading".to_string(),
            FeedState::Failed(_) => "failed".to_string(),
            FeedState::Ready(events) => format!(
                "{} users / {} events",
                events.len(),
                state.status_feed.observed()
            ),
        };
        ui.label(summary);
    });

    ui.horizontal(|ui| {
        ui.label("Chat:");
        let summary = match (&state.peer, &state.history) {
            (PeerSelection::Unselected, _) => "no peer".to_string(),
            (_, HistoryState::Loaded(messages)) => format!("{} messages", messages.len()),
            (_, HistoryState::Failed(_)) => "failed".to_string(),
            _ => "loading".to_string(),
        };
        ui.label(summary);
    });

    ui.separator();

    // Hiển thị log events gần đây
    ui.label("Recent Events:");
    egui::ScrollArea::vertical()
        .max_height(300.0)
        .show(ui, |ui| {
            for event in state.activity.iter().rev().take(20) {
                let time_str = event.timestamp.format("%H:%M:%S");
                let color = match event.event_type {
                    "CHAIN_CONNECTED" | "MESSAGE_SENT" | "HISTORY_LOADED" => egui::Color32::GREEN,
                    "SEND_FAILED" | "HISTORY_FAILED" | "STATUS_FAILED" => egui::Color32::RED,
                    "INVALID_ADDRESS" => egui::Color32::YELLOW,
                    _ => egui::Color32::WHITE,
                };

                ui.horizontal_wrapped(|ui| {
                    ui.colored_label(color, format!("[{}]", time_str));
                    ui.label(&event.message);
                });
            }
        });
}
