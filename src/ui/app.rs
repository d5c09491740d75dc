use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{NetworkCommand, NetworkEvent, PeerSelection};
use crate::crypto;

use super::components::{
    chat_area, debug_panel, demo_panel, input_bar, news_feed,
    sidebar::{self, SidebarActions},
};
use super::state::{AppState, View};

const INPUT_BAR_HEIGHT: f32 = 36.0;

pub struct SocialApp {
    state: AppState,
    command_sender: mpsc::Sender<NetworkCommand>,
    event_receiver: mpsc::Receiver<NetworkEvent>,
}

impl SocialApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        state: AppState,
        command_sender: mpsc::Sender<NetworkCommand>,
        event_receiver: mpsc::Receiver<NetworkEvent>,
    ) -> Self {
        let app = Self {
            state,
            command_sender,
            event_receiver,
        };
        if app.state.view == View::NewsFeed {
            app.send_command(NetworkCommand::SubscribeStatus);
        }
        app
    }

    fn handle_network_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                NetworkEvent::ChainConnected(chain_id) => self.state.set_connected_chain(chain_id),
                NetworkEvent::HistoryLoaded { peer, state } => self.state.apply_history(peer, state),
                NetworkEvent::MessageSent { peer, result } => {
                    self.state.apply_send_result(peer, result)
                }
                NetworkEvent::StatusBatch(batch) => self.state.apply_status_batch(batch),
                NetworkEvent::StatusFailed(error) => self.state.apply_status_failure(error),
            }
        }
    }

    fn send_command(&self, command: NetworkCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to contract worker: {err}");
        }
    }

    fn switch_view(&mut self, view: View) {
        if view == self.state.view {
            return;
        }
        if self.state.view == View::NewsFeed {
            self.state.unmount_news_feed();
            self.send_command(NetworkCommand::UnsubscribeStatus);
        }
        if view == View::NewsFeed {
            self.state.mount_news_feed();
            self.send_command(NetworkCommand::SubscribeStatus);
        }
        self.state.view = view;
    }

    fn select_peer(&mut self, peer: PeerSelection) {
        if self.state.select_peer(peer) {
            self.send_command(NetworkCommand::LoadHistory { peer });
        }
    }

    fn submit_message(&mut self) {
        let Some(peer) = self.state.peer.address() else {
            return;
        };
        if let Some(body) = self.state.composer.submit() {
            self.send_command(NetworkCommand::SendMessage { peer, body });
        }
    }

    fn render_chat(&mut self, ui: &mut egui::Ui) {
        let Some(peer) = self.state.peer.address() else {
            ui.centered_and_justified(|ui| {
                ui.label("Please choose address");
            });
            return;
        };

        ui.horizontal(|ui| {
            ui.label("Address:");
            ui.monospace(peer.to_string());
            if ui.button("⟳ Refresh").clicked() {
                if let Some(peer) = self.state.refresh_history() {
                    self.send_command(NetworkCommand::LoadHistory { peer });
                }
            }
        });
        ui.separator();

        let history_height = (ui.available_height() - INPUT_BAR_HEIGHT).max(0.0);
        chat_area::render(ui, &self.state.address, &self.state.history, history_height);

        ui.separator();
        if input_bar::render(ui, &mut self.state.composer) {
            self.submit_message();
        }
    }
}

impl eframe::App for SocialApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();

        egui::TopBottomPanel::top("wallet_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("On-chain Social");
                ui.separator();
                let mut view = self.state.view;
                ui.selectable_value(&mut view, View::NewsFeed, "News feed");
                ui.selectable_value(&mut view, View::Chat, "Chat");
                ui.selectable_value(&mut view, View::Demo, "Demo");
                self.switch_view(view);
            });
        });

        egui::SidePanel::left("wallet_sidebar")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                let actions: SidebarActions = sidebar::render(ui, &mut self.state);
                if let Some(peer) = actions.selected_peer {
                    self.switch_view(View::Chat);
                    self.select_peer(peer);
                }
            });

        egui::SidePanel::right("activity_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                debug_panel::render(ui, &self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::NewsFeed => news_feed::render(ui, &mut self.state),
            View::Chat => self.render_chat(ui),
            View::Demo => {
                if demo_panel::render(ui, self.state.demo.as_ref()) {
                    let report = crypto::run_demo().map_err(|err| err.to_string());
                    match &report {
                        Ok(report) if report.succeeded() => log::info!("Encryption demo: success"),
                        Ok(_) => log::warn!("Encryption demo: round trip mismatch"),
                        Err(err) => log::error!("Encryption demo failed: {err}"),
                    }
                    self.state.demo = Some(report);
                }
            }
        });

        ctx.request_repaint();
    }
}
