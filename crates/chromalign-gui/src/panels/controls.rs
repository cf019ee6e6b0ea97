use chromalign_core::display::Levels;
use chromalign_core::session::Event;

use crate::app::AlignApp;

const LEFT_PANEL_WIDTH: f32 = 300.0;

pub fn show(ctx: &egui::Context, app: &mut AlignApp) {
    egui::SidePanel::left("controls")
        .default_width(LEFT_PANEL_WIDTH)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_min_width(LEFT_PANEL_WIDTH - 20.0);

                file_section(ui, app);
                ui.separator();
                channel_section(ui, app);
                ui.separator();
                step_section(ui, app);
                ui.separator();
                display_section(ui, app);
                ui.separator();
                view_section(ui, app);
                ui.separator();
                actions_section(ui, app);
            });
        });
}

fn section_header(ui: &mut egui::Ui, label: &str, status: Option<&str>) {
    ui.horizontal(|ui| {
        ui.strong(label);
        if let Some(s) = status {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(s);
            });
        }
    });
}

fn file_section(ui: &mut egui::Ui, app: &mut AlignApp) {
    section_header(ui, "Input", None);

    if ui.button("Open Images...").clicked() {
        app.open_images();
    }

    if let Some((w, h)) = app.ui_state.image_size {
        ui.label(format!("{w}x{h}, {} bit", app.ui_state.bit_depth));
        for path in &app.ui_state.source_paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ui.small(name);
        }
        if let Some(description) = &app.ui_state.description {
            ui.small(format!("Description: {description}"));
        }
    } else {
        ui.small("No images loaded.");
    }
}

fn channel_section(ui: &mut egui::Ui, app: &mut AlignApp) {
    let Some(session) = app.session.as_ref() else {
        section_header(ui, "Channels", None);
        ui.small("Load images first.");
        return;
    };
    let active = session.active();
    let count = session.channel_count();
    let opacities = session.style.opacities.clone();
    let transforms = session.transforms().to_vec();

    section_header(ui, "Channels", Some("Tab cycles active"));

    let mut events = Vec::new();
    for index in 0..count {
        ui.horizontal(|ui| {
            let marker = if index == active { "▶" } else { " " };
            if ui
                .selectable_label(index == active, format!("{marker} Channel {}", index + 1))
                .clicked()
            {
                events.push(Event::SetActive { index });
            }
            let t = transforms[index];
            if !t.is_identity() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(format!("{:+.1},{:+.1},{:+.2}°", t.dx, t.dy, t.angle_deg));
                });
            }
        });

        let mut value = opacities[index];
        if ui
            .add(
                egui::Slider::new(&mut value, 0.0..=1.0)
                    .text("opacity")
                    .fixed_decimals(2),
            )
            .changed()
        {
            events.push(Event::SetOpacity { index, value });
        }
    }
    for event in events {
        app.push_event(event);
    }
}

fn step_section(ui: &mut egui::Ui, app: &mut AlignApp) {
    section_header(ui, "Steps", Some("Shift coarse / Alt fine"));
    let Some(session) = app.session.as_mut() else {
        ui.small("Load images first.");
        return;
    };

    ui.horizontal(|ui| {
        ui.label("Move (px)");
        ui.add(
            egui::DragValue::new(&mut session.steps.translate)
                .speed(0.1)
                .range(0.01..=500.0),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Rotate (°)");
        ui.add(
            egui::DragValue::new(&mut session.steps.rotate)
                .speed(0.01)
                .range(0.001..=45.0),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Coarse x");
        ui.add(
            egui::DragValue::new(&mut session.steps.coarse)
                .speed(0.5)
                .range(1.0..=100.0),
        );
        ui.label("Fine x");
        ui.add(
            egui::DragValue::new(&mut session.steps.fine)
                .speed(0.05)
                .range(0.01..=1.0),
        );
    });
}

fn display_section(ui: &mut egui::Ui, app: &mut AlignApp) {
    section_header(ui, "Display", None);
    let Some(session) = app.session.as_ref() else {
        ui.small("Load images first.");
        return;
    };
    let mut brightness = session.style.brightness;
    let levels = session.style.levels;

    let mut events = Vec::new();

    if ui
        .add(
            egui::Slider::new(&mut brightness, 0.2..=3.0)
                .text("brightness")
                .fixed_decimals(2),
        )
        .changed()
    {
        events.push(Event::SetBrightness { value: brightness });
    }

    let mut auto = matches!(levels, Levels::Auto);
    if ui.checkbox(&mut auto, "Auto levels").changed() {
        let next = if auto {
            Levels::Auto
        } else {
            Levels::Manual {
                black: 0.0,
                white: 1.0,
            }
        };
        events.push(Event::SetLevels { levels: next });
    }

    if let Levels::Manual { black, white } = levels {
        let mut black = black;
        let mut white = white;
        let mut changed = false;
        changed |= ui
            .add(egui::Slider::new(&mut black, 0.0..=1.0).text("black point"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut white, 0.0..=1.0).text("white point"))
            .changed();
        if changed {
            // Keep the range non-degenerate.
            let white = white.max(black + 1.0 / 65535.0);
            events.push(Event::SetLevels {
                levels: Levels::Manual { black, white },
            });
        }
    }

    for event in events {
        app.push_event(event);
    }
}

fn view_section(ui: &mut egui::Ui, app: &mut AlignApp) {
    section_header(ui, "View", None);
    let Some(session) = app.session.as_ref() else {
        ui.small("Load images first.");
        return;
    };
    let zoom = session.viewport.zoom;
    let full_resolution = session.viewport.full_resolution;

    let mut events = Vec::new();

    ui.horizontal(|ui| {
        ui.label(format!("Zoom: {:.0}%", zoom * 100.0));
        if ui.button("Fit").clicked() {
            events.push(Event::ZoomToFit);
        }
    });

    let mut full = full_resolution;
    if ui
        .checkbox(&mut full, "Full-resolution viewport")
        .on_hover_text("Sample native pixels for the visible region only")
        .changed()
    {
        events.push(Event::ToggleFullResolution);
    }

    if !full_resolution && app.ui_state.preview_scale < 0.999 {
        ui.small(format!(
            "Preview: {:.0}% (export is always full res)",
            app.ui_state.preview_scale * 100.0
        ));
    }

    for event in events {
        app.push_event(event);
    }
}

fn actions_section(ui: &mut egui::Ui, app: &mut AlignApp) {
    section_header(ui, "Actions", None);
    let loaded = app.session.is_some();

    ui.horizontal(|ui| {
        if ui
            .add_enabled(loaded, egui::Button::new("Reset Active"))
            .clicked()
        {
            app.push_event(Event::ResetActive);
        }
        if ui
            .add_enabled(loaded, egui::Button::new("Reset All"))
            .clicked()
        {
            app.push_event(Event::ResetAll);
        }
    });

    let can_save = loaded && !app.ui_state.is_exporting;
    if ui
        .add_enabled(can_save, egui::Button::new("Save Aligned..."))
        .clicked()
    {
        app.begin_export();
    }
    if app.ui_state.is_exporting {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.small("Exporting at full resolution...");
        });
    }
}
