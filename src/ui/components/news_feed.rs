use eframe::egui;

use crate::common::{StatusEvent, short_address};
use crate::feed::status::FeedState;
use crate::feed::window::paginate;
use crate::ui::state::AppState;

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("News feed");
    ui.separator();

    if state.splash_active() {
        ui.vertical_centered(|ui| {
            ui.spinner();
        });
        return;
    }

    let mut show_more = false;
    match state.status_feed.state() {
        FeedState::Loading => {
            ui.vertical_centered(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new("Waiting for status events…").weak());
            });
        }
        FeedState::Failed(error) => {
            ui.colored_label(egui::Color32::RED, format!("Could not load statuses: {error}"));
        }
        FeedState::Ready([]) => {
            ui.label(egui::RichText::new("No statuses posted yet").weak());
        }
        FeedState::Ready(events) => {
            let window = state.window;
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for event in paginate(events, window.visible()) {
                        ui.push_id(event.status_id.to_decimal_string(), |ui| {
                            render_event(ui, event);
                        });
                    }
                    if window.has_more(events.len()) && ui.button("more").clicked() {
                        show_more = true;
                    }
                });
        }
    }

    if show_more {
        state.window.grow();
    }
}

fn render_event(ui: &mut egui::Ui, event: &StatusEvent) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.strong(short_address(&event.user));
            let when = event
                .timestamp
                .as_datetime()
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| event.timestamp.to_string());
            ui.label(egui::RichText::new(when).small().weak());
        });
        ui.label(&event.new_status);
    });
}
