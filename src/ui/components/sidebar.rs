use eframe::egui;

use crate::common::{PeerSelection, short_address};
use crate::ui::state::AppState;

#[derive(Default)]
pub struct SidebarActions {
    pub selected_peer: Option<PeerSelection>,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.heading("Wallet");
    ui.separator();
    ui.label(egui::RichText::new(state.address.to_string()).monospace().small());
    ui.horizontal(|ui| {
        ui.label("Chain:");
        let color = match state.connected_chain {
            Some(id) if id == state.chain.id() => egui::Color32::GREEN,
            Some(_) => egui::Color32::YELLOW,
            None => egui::Color32::GRAY,
        };
        ui.colored_label(color, "●");
        ui.label(format!("{} ({})", state.chain, state.chain.id()));
    });

    ui.separator();
    ui.label("Chat with address:");
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut state.peer_input);
        if ui.button("Open").clicked() {
            match state.peer_input.parse::<PeerSelection>() {
                Ok(peer) => {
                    state.peer_input.clear();
                    actions.selected_peer = Some(peer);
                }
                Err(err) => state.add_activity("INVALID_ADDRESS", err.to_string()),
            }
        }
    });

    ui.separator();
    ui.label("Contacts:");
    if state.contacts.is_empty() {
        ui.label(egui::RichText::new("No contacts yet").weak());
    }
    for contact in &state.contacts {
        let selected = state.peer == PeerSelection::Peer(*contact);
        if ui.selectable_label(selected, short_address(contact)).clicked() {
            actions.selected_peer = Some(PeerSelection::Peer(*contact));
        }
    }
    if state.peer != PeerSelection::Unselected && ui.button("Close chat").clicked() {
        actions.selected_peer = Some(PeerSelection::Unselected);
    }

    actions
}
