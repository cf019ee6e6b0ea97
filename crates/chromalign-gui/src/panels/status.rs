use crate::app::AlignApp;

pub fn show(ctx: &egui::Context, app: &mut AlignApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Log area — fixed height for 4 lines, scrollable.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    // Reserve space for 4 empty lines to prevent layout jump.
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        // Status line
        ui.horizontal(|ui| {
            if let Some((w, h)) = app.ui_state.image_size {
                ui.label(format!("{w}x{h}"));
                ui.separator();
            }
            if let Some(session) = &app.session {
                ui.label(format!("Zoom: {:.0}%", session.viewport.zoom * 100.0));
                ui.separator();
                let t = session.transforms()[session.active()];
                ui.label(format!(
                    "Ch {}: dx {:+.2} dy {:+.2} rot {:+.2}°",
                    session.active() + 1,
                    t.dx,
                    t.dy,
                    t.angle_deg
                ));
                ui.separator();
            }
            if app.ui_state.is_exporting {
                ui.spinner();
            }
            ui.label(&app.ui_state.status);
        });

        ui.add_space(2.0);
    });
}
