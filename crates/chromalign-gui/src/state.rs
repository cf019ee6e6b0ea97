use std::path::PathBuf;

use chromalign_core::viewport::RenderQuality;

/// Overall UI state.
#[derive(Default)]
pub struct UiState {
    pub source_paths: Vec<PathBuf>,
    pub image_size: Option<(usize, usize)>,
    pub bit_depth: u8,
    /// Scale of the worker's preview cache (1.0 = native).
    pub preview_scale: f32,
    pub description: Option<String>,

    pub is_loading: bool,
    pub is_exporting: bool,
    pub last_export: Option<PathBuf>,

    pub status: String,
    pub log_messages: Vec<String>,
}

impl UiState {
    pub fn has_channels(&self) -> bool {
        self.image_size.is_some()
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }
}

/// Viewport display state.
pub struct ViewportUi {
    pub texture: Option<egui::TextureHandle>,
    /// Quality tier of the frame currently on screen.
    pub shown_quality: Option<RenderQuality>,
    /// Most recent size of the central panel, used to size new sessions.
    pub panel_size: (usize, usize),
}

impl Default for ViewportUi {
    fn default() -> Self {
        Self {
            texture: None,
            shown_quality: None,
            panel_size: (960, 720),
        }
    }
}
