use eframe::egui;

use crate::crypto::{DEMO_MESSAGE, DemoReport};

/// Returns true when the demo button was clicked.
pub fn render(ui: &mut egui::Ui, last_run: Option<&Result<DemoReport, String>>) -> bool {
    ui.heading("Encryption demo");
    ui.separator();
    ui.label(format!("Encrypts \"{DEMO_MESSAGE}\" to a fixed secp256k1 identity and decrypts it again."));

    let clicked = ui.button("Run demo").clicked();

    match last_run {
        None => {}
        Some(Ok(report)) => {
            ui.separator();
            let (color, verdict) = if report.succeeded() {
                (egui::Color32::GREEN, "success")
            } else {
                (egui::Color32::RED, "mismatch")
            };
            ui.colored_label(color, verdict);
            ui.label("Public key:");
            ui.monospace(&report.public_key);
            ui.label("Ciphertext:");
            ui.add(
                egui::Label::new(egui::RichText::new(report.encrypted.to_hex_string()).monospace())
                    .wrap(),
            );
            ui.label(format!("Decrypted: {}", report.decrypted));
        }
        Some(Err(error)) => {
            ui.colored_label(egui::Color32::RED, error);
        }
    }

    clicked
}
