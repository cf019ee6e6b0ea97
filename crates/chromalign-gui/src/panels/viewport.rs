use chromalign_core::session::Event;
use chromalign_core::viewport::RenderQuality;

use crate::app::AlignApp;

pub fn show(ctx: &egui::Context, app: &mut AlignApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let rect = ui.available_rect_before_wrap();
        paint_background(ui, rect);

        // The composite is rendered at exactly this many pixels.
        let size = (rect.width().max(1.0) as usize, rect.height().max(1.0) as usize);
        app.viewport.panel_size = size;
        app.push_event(Event::Resize {
            width: size.0,
            height: size.1,
        });

        let Some(texture_id) = app.viewport.texture.as_ref().map(|t| t.id()) else {
            show_placeholder(ui, app);
            return;
        };

        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        handle_zoom(ui, &response, app, rect);
        handle_pan(&response, app);
        if response.double_clicked() {
            app.push_event(Event::ZoomToFit);
        }

        draw_composite(ui, texture_id, rect);
        draw_overlay_label(ui, rect, app);
    });
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(20));
}

fn handle_zoom(ui: &egui::Ui, response: &egui::Response, app: &mut AlignApp, rect: egui::Rect) {
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
    if scroll_delta == 0.0 || !response.hovered() {
        return;
    }

    let factor = (scroll_delta * 0.005).exp();
    // Zoom toward the cursor.
    let anchor = ui
        .input(|i| i.pointer.hover_pos())
        .map(|pos| (pos.x - rect.min.x, pos.y - rect.min.y));
    app.push_event(Event::ZoomBy { factor, anchor });
}

fn handle_pan(response: &egui::Response, app: &mut AlignApp) {
    let dragging = response.dragged_by(egui::PointerButton::Primary)
        || response.dragged_by(egui::PointerButton::Middle);
    if !dragging {
        return;
    }
    let delta = response.drag_delta();
    if delta == egui::Vec2::ZERO {
        return;
    }
    let zoom = app
        .session
        .as_ref()
        .map(|s| s.viewport.zoom)
        .unwrap_or(1.0)
        .max(f32::EPSILON);
    // Dragging moves the image with the pointer, so the pan runs opposite.
    app.push_event(Event::Pan {
        dx: -delta.x / zoom,
        dy: -delta.y / zoom,
    });
}

fn draw_composite(ui: &egui::Ui, texture_id: egui::TextureId, rect: egui::Rect) {
    ui.painter().image(
        texture_id,
        rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

fn draw_overlay_label(ui: &egui::Ui, rect: egui::Rect, app: &AlignApp) {
    let Some(session) = &app.session else {
        return;
    };
    let mut label = format!("Channel {}", session.active() + 1);
    if app.viewport.shown_quality == Some(RenderQuality::Draft) {
        label.push_str(" (draft)");
    }
    ui.painter().text(
        rect.left_top() + egui::vec2(8.0, 8.0),
        egui::Align2::LEFT_TOP,
        label,
        egui::FontId::proportional(14.0),
        egui::Color32::from_white_alpha(200),
    );
}

fn show_placeholder(ui: &mut egui::Ui, app: &AlignApp) {
    let text = if app.ui_state.is_loading {
        "Loading images..."
    } else {
        "Open images to begin"
    };
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new(text)
                .size(18.0)
                .color(egui::Color32::from_gray(100)),
        );
    });
}
