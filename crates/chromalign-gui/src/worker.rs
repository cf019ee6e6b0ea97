use std::path::{Path, PathBuf};
use std::sync::mpsc;

use chromalign_core::channel::{ChannelSet, Transform};
use chromalign_core::display::DisplayStyle;
use chromalign_core::io::{export_aligned, load_channels};
use chromalign_core::viewport::{Renderer, ViewportState};

use crate::messages::{WorkerCommand, WorkerResult};

/// Spawn the render worker thread. Returns the command sender.
pub fn spawn_worker(
    result_tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) -> mpsc::Sender<WorkerCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();

    std::thread::Builder::new()
        .name("chromalign-render".into())
        .spawn(move || {
            worker_loop(cmd_rx, result_tx, ctx);
        })
        .expect("Failed to spawn render thread");

    cmd_tx
}

fn send(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, result: WorkerResult) {
    let _ = tx.send(result);
    ctx.request_repaint();
}

fn send_error(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, msg: impl Into<String>) {
    send(tx, ctx, WorkerResult::Error { message: msg.into() });
}

/// The loaded channel pixels and their preview cache, owned by the worker.
struct LoadedStack {
    set: ChannelSet,
    renderer: Renderer,
}

fn worker_loop(
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) {
    let mut loaded: Option<LoadedStack> = None;

    while let Ok(mut cmd) = cmd_rx.recv() {
        // A render for state the UI has already moved past is wasted work
        // (and its result would be discarded as stale anyway): skip ahead
        // to the newest queued command.
        while matches!(cmd, WorkerCommand::Render { .. }) {
            match cmd_rx.try_recv() {
                Ok(newer) => cmd = newer,
                Err(_) => break,
            }
        }

        match cmd {
            WorkerCommand::Load { paths } => handle_load(&paths, &mut loaded, &tx, &ctx),
            WorkerCommand::Render {
                transforms,
                viewport,
                style,
                generation,
            } => handle_render(
                loaded.as_ref(),
                &transforms,
                &viewport,
                &style,
                generation,
                &tx,
                &ctx,
            ),
            WorkerCommand::Export { transforms, path } => {
                handle_export(loaded.as_ref(), &transforms, &path, &tx, &ctx)
            }
        }
    }
}

fn handle_load(
    paths: &[PathBuf],
    loaded: &mut Option<LoadedStack>,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    match load_channels(paths) {
        Ok(set) => {
            let renderer = Renderer::new(&set);
            let result = WorkerResult::Loaded {
                channel_count: set.len(),
                width: set.width(),
                height: set.height(),
                bit_depth: set.channels()[0].original_bit_depth,
                description: set.description().map(str::to_owned),
                preview_scale: renderer.preview_scale(),
                source_paths: set.source_paths().to_vec(),
            };
            *loaded = Some(LoadedStack { set, renderer });
            send(tx, ctx, result);
        }
        Err(e) => send_error(tx, ctx, format!("Failed to load images: {e}")),
    }
}

fn handle_render(
    loaded: Option<&LoadedStack>,
    transforms: &[Transform],
    viewport: &ViewportState,
    style: &DisplayStyle,
    generation: u64,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let Some(stack) = loaded else {
        return;
    };
    match stack.renderer.render(&stack.set, transforms, viewport, style) {
        Ok(composite) => send(
            tx,
            ctx,
            WorkerResult::Rendered {
                composite,
                generation,
                quality: viewport.quality,
            },
        ),
        Err(e) => send_error(tx, ctx, format!("Render failed: {e}")),
    }
}

fn handle_export(
    loaded: Option<&LoadedStack>,
    transforms: &[Transform],
    path: &Path,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let Some(stack) = loaded else {
        send_error(tx, ctx, "No images loaded.");
        return;
    };
    match export_aligned(&stack.set, transforms, path) {
        Ok(report) => send(tx, ctx, WorkerResult::Exported { report }),
        Err(e) => send_error(tx, ctx, format!("Export failed: {e}")),
    }
}
