use std::path::PathBuf;

use chromalign_core::channel::Transform;
use chromalign_core::display::DisplayStyle;
use chromalign_core::io::ExportReport;
use chromalign_core::viewport::{CompositeFrame, RenderQuality, ViewportState};

/// Commands sent from the UI thread to the render worker.
pub enum WorkerCommand {
    /// Load input files and build the preview cache.
    Load { paths: Vec<PathBuf> },

    /// Composite the channels for the given state. Requests queued behind a
    /// newer command are stale and get skipped by the worker.
    Render {
        transforms: Vec<Transform>,
        viewport: ViewportState,
        style: DisplayStyle,
        generation: u64,
    },

    /// Apply transforms at full resolution and write the aligned stack.
    Export {
        transforms: Vec<Transform>,
        path: PathBuf,
    },
}

/// Results sent back to the UI thread, from the worker and from file-dialog
/// threads.
pub enum WorkerResult {
    Loaded {
        channel_count: usize,
        width: usize,
        height: usize,
        bit_depth: u8,
        description: Option<String>,
        preview_scale: f32,
        source_paths: Vec<PathBuf>,
    },

    /// One composited frame; dropped by the app when `generation` is stale.
    Rendered {
        composite: CompositeFrame,
        generation: u64,
        quality: RenderQuality,
    },

    Exported {
        report: ExportReport,
    },

    /// A file dialog picked input images (sent from a dialog thread).
    OpenRequested { paths: Vec<PathBuf> },

    /// A file dialog picked an export destination (sent from a dialog thread).
    ExportRequested { path: PathBuf },

    Error {
        message: String,
    },
    Log {
        message: String,
    },
}
