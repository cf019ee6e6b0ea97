use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

use chromalign_core::session::{Event, Redraw, RenderDebounce, SessionState, StepModifier};
use chromalign_core::viewport::RenderQuality;

use crate::convert::composite_to_color_image;
use crate::messages::{WorkerCommand, WorkerResult};
use crate::panels;
use crate::state::{UiState, ViewportUi};
use crate::worker;

pub struct AlignApp {
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub result_tx: mpsc::Sender<WorkerResult>,
    pub result_rx: mpsc::Receiver<WorkerResult>,
    /// Alignment state; `None` until the first load completes.
    pub session: Option<SessionState>,
    pub ui_state: UiState,
    pub viewport: ViewportUi,
    pub debounce: RenderDebounce,
    pub show_about: bool,
}

impl AlignApp {
    pub fn new(ctx: &egui::Context, paths: Vec<PathBuf>) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        let cmd_tx = worker::spawn_worker(result_tx.clone(), ctx.clone());

        let mut app = Self {
            cmd_tx,
            result_tx,
            result_rx,
            session: None,
            ui_state: UiState::default(),
            viewport: ViewportUi::default(),
            debounce: RenderDebounce::default(),
            show_about: false,
        };
        app.ui_state.status = "Open images to begin.".into();
        if !paths.is_empty() {
            app.load_paths(paths);
        }
        app
    }

    pub fn send_command(&self, cmd: WorkerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn load_paths(&mut self, paths: Vec<PathBuf>) {
        self.ui_state.is_loading = true;
        self.ui_state.add_log(format!("Loading {} file(s)...", paths.len()));
        self.send_command(WorkerCommand::Load { paths });
    }

    /// Route one session event and schedule the renders it requires:
    /// interactive events draw a draft now and a full pass once input
    /// settles; structural events draw one full pass directly.
    pub fn push_event(&mut self, event: Event) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.apply(event) {
            Redraw::None => {}
            Redraw::Draft => {
                self.request_render(RenderQuality::Draft);
                self.debounce.touch(Instant::now());
            }
            Redraw::Full => {
                self.debounce.cancel();
                self.request_render(RenderQuality::Full);
            }
        }
    }

    pub fn request_render(&self, quality: RenderQuality) {
        if let Some(session) = &self.session {
            self.send_command(WorkerCommand::Render {
                transforms: session.transforms().to_vec(),
                viewport: session.viewport_for(quality),
                style: session.style.clone(),
                generation: session.generation(),
            });
        }
    }

    /// Pick input images on a dialog thread (never blocks the UI loop).
    pub fn open_images(&self) {
        let result_tx = self.result_tx.clone();
        std::thread::spawn(move || {
            if let Some(paths) = rfd::FileDialog::new()
                .add_filter("Images", chromalign_core::io::SUPPORTED_EXTENSIONS)
                .add_filter("All files", &["*"])
                .pick_files()
            {
                if !paths.is_empty() {
                    let _ = result_tx.send(WorkerResult::OpenRequested { paths });
                }
            }
        });
    }

    /// Ask for an export destination, refusing source paths, then hand the
    /// chosen path back to the UI thread to start the export.
    pub fn begin_export(&mut self) {
        if self.session.is_none() || self.ui_state.is_exporting {
            return;
        }
        let sources = self.ui_state.source_paths.clone();
        let default_name =
            default_output_name(&sources, self.ui_state.last_export.as_deref());
        let result_tx = self.result_tx.clone();

        std::thread::spawn(move || loop {
            let Some(path) = rfd::FileDialog::new()
                .add_filter("TIFF", &["tif", "tiff"])
                .set_file_name(default_name.as_str())
                .save_file()
            else {
                return;
            };
            if is_source_conflict(&path, &sources) {
                rfd::MessageDialog::new()
                    .set_level(rfd::MessageLevel::Error)
                    .set_title("Save failed")
                    .set_description("Pick a new filename. Original images are never overwritten.")
                    .show();
                continue;
            }
            let _ = result_tx.send(WorkerResult::ExportRequested { path });
            return;
        });
    }

    /// Drain all pending results from the worker and dialog threads.
    fn poll_results(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                WorkerResult::Loaded {
                    channel_count,
                    width,
                    height,
                    bit_depth,
                    description,
                    preview_scale,
                    source_paths,
                } => {
                    self.ui_state.is_loading = false;
                    self.ui_state.image_size = Some((width, height));
                    self.ui_state.bit_depth = bit_depth;
                    self.ui_state.preview_scale = preview_scale;
                    self.ui_state.description = description;
                    self.ui_state.source_paths = source_paths;
                    self.ui_state.last_export = None;
                    self.ui_state.add_log(format!(
                        "Loaded {channel_count} channels ({width}x{height}, {bit_depth} bit)"
                    ));
                    self.ui_state.status =
                        "Images loaded. Arrow keys move the active channel.".into();

                    self.session = Some(SessionState::new(
                        channel_count,
                        (width, height),
                        self.viewport.panel_size,
                    ));
                    self.debounce.cancel();
                    self.request_render(RenderQuality::Full);
                }
                WorkerResult::Rendered {
                    composite,
                    generation,
                    quality,
                } => {
                    // Only the latest state's render may reach the screen;
                    // anything else is a superseded in-flight result.
                    let accept = !self.ui_state.is_loading
                        && self
                            .session
                            .as_ref()
                            .is_some_and(|s| s.accepts(generation));
                    if accept {
                        let image = composite_to_color_image(&composite);
                        let texture =
                            ctx.load_texture("viewport", image, egui::TextureOptions::NEAREST);
                        self.viewport.texture = Some(texture);
                        self.viewport.shown_quality = Some(quality);
                    } else {
                        tracing::trace!(generation, "dropping stale render");
                    }
                }
                WorkerResult::Exported { report } => {
                    self.ui_state.is_exporting = false;
                    self.ui_state.last_export = Some(report.path.clone());
                    self.ui_state.add_log(format!(
                        "Saved {} pages: {}",
                        report.pages,
                        report.path.display()
                    ));
                    self.ui_state.status = format!("Saved aligned stack ({}).", report.description);
                    // The worker skips preview renders queued behind an
                    // export; make sure the screen matches current state.
                    self.request_render(RenderQuality::Full);
                }
                WorkerResult::OpenRequested { paths } => self.load_paths(paths),
                WorkerResult::ExportRequested { path } => {
                    if let Some(session) = &self.session {
                        self.ui_state.is_exporting = true;
                        self.ui_state.status = format!("Saving {}...", path.display());
                        self.send_command(WorkerCommand::Export {
                            transforms: session.transforms().to_vec(),
                            path,
                        });
                    }
                }
                WorkerResult::Error { message } => {
                    self.ui_state.is_loading = false;
                    self.ui_state.is_exporting = false;
                    self.ui_state.status = message.clone();
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
                WorkerResult::Log { message } => self.ui_state.add_log(message),
            }
        }
    }

    /// Translate the keyboard surface into session events.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if self.session.is_none() || ctx.wants_keyboard_input() {
            return;
        }
        let (view_w, view_h) = self
            .session
            .as_ref()
            .map(|s| s.viewport.size)
            .unwrap_or((1, 1));
        let zoom = self.session.as_ref().map(|s| s.viewport.zoom).unwrap_or(1.0);

        let mut events = Vec::new();
        let mut save = false;
        let mut quit = false;

        ctx.input(|i| {
            let modifier = if i.modifiers.shift {
                StepModifier::Coarse
            } else if i.modifiers.alt {
                StepModifier::Fine
            } else {
                StepModifier::Normal
            };

            for (key, dx, dy) in [
                (egui::Key::ArrowLeft, -1.0, 0.0),
                (egui::Key::ArrowRight, 1.0, 0.0),
                (egui::Key::ArrowUp, 0.0, -1.0),
                (egui::Key::ArrowDown, 0.0, 1.0),
            ] {
                if i.key_pressed(key) {
                    events.push(Event::Nudge { dx, dy, modifier });
                }
            }

            if i.key_pressed(egui::Key::Q) {
                events.push(Event::Rotate {
                    direction: -1,
                    modifier,
                });
            }
            if i.key_pressed(egui::Key::E) {
                events.push(Event::Rotate {
                    direction: 1,
                    modifier,
                });
            }
            if i.key_pressed(egui::Key::Tab) {
                events.push(Event::CycleActive);
            }
            if i.key_pressed(egui::Key::R) {
                if i.modifiers.command {
                    events.push(Event::ResetAll);
                } else {
                    events.push(Event::ResetActive);
                }
            }

            // Pan keys move 5% of the viewport per tap, tripled with Shift.
            let step_x = (view_w as f32 * 0.05).max(20.0) / zoom;
            let step_y = (view_h as f32 * 0.05).max(20.0) / zoom;
            let pan_mul = if i.modifiers.shift { 3.0 } else { 1.0 };
            for (key, dx, dy) in [
                (egui::Key::A, -1.0, 0.0),
                (egui::Key::D, 1.0, 0.0),
                (egui::Key::W, 0.0, -1.0),
                (egui::Key::S, 0.0, 1.0),
                (egui::Key::H, -1.0, 0.0),
                (egui::Key::L, 1.0, 0.0),
                (egui::Key::K, 0.0, -1.0),
                (egui::Key::J, 0.0, 1.0),
            ] {
                if i.key_pressed(key) {
                    events.push(Event::Pan {
                        dx: dx * step_x * pan_mul,
                        dy: dy * step_y * pan_mul,
                    });
                }
            }

            if i.key_pressed(egui::Key::Enter) {
                save = true;
            }
            if i.key_pressed(egui::Key::Escape) {
                quit = true;
            }
        });

        for event in events {
            self.push_event(event);
        }
        if save && !self.ui_state.is_exporting {
            self.begin_export();
        }
        if quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for AlignApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results(ctx);
        self.handle_keys(ctx);

        // Input settled: upgrade the draft on screen to full quality.
        let now = Instant::now();
        if self.debounce.fire(now) {
            self.request_render(RenderQuality::Full);
        }
        if let Some(deadline) = self.debounce.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::controls::show(ctx, self);
        panels::viewport::show(ctx, self);

        if self.show_about {
            egui::Window::new("About Chromalign")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Chromalign");
                        ui.label("Manual Image Channel Alignment");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }
}

fn default_output_name(sources: &[PathBuf], last_export: Option<&Path>) -> String {
    if let Some(name) = last_export.and_then(|p| p.file_name()) {
        return name.to_string_lossy().into_owned();
    }
    sources
        .first()
        .and_then(|p| p.file_stem())
        .map(|stem| format!("{}_manual_aligned.tif", stem.to_string_lossy()))
        .unwrap_or_else(|| "manual_aligned.tif".into())
}

fn is_source_conflict(path: &Path, sources: &[PathBuf]) -> bool {
    let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    sources
        .iter()
        .any(|src| src.canonicalize().unwrap_or_else(|_| src.clone()) == target)
}
