use eframe::egui;

use crate::feed::chat::Composer;

/// Returns true when the user asked to send.
pub fn render(ui: &mut egui::Ui, composer: &mut Composer) -> bool {
    let mut send = false;
    let placeholder = composer.placeholder();
    let pending = composer.is_pending();

    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            !pending,
            egui::TextEdit::singleline(&mut composer.input).hint_text(placeholder),
        );
        if ui.add_enabled(!pending, egui::Button::new("Send")).clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
        if pending {
            ui.spinner();
        }
    });

    send
}
