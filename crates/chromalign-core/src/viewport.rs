use ndarray::parallel::prelude::*;
use ndarray::{Array2, Array3};

use crate::channel::{ChannelSet, Transform};
use crate::display::{auto_range, map_level, DisplayStyle, Levels};
use crate::error::{AlignError, Result};
use crate::transform::{bilinear_sample, inverse_coefficients, sample, Interpolation};

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 32.0;

/// Largest edge of a cached preview plane.
pub const PREVIEW_MAX_DIM: usize = 1600;
/// Pixel budget for each cached preview plane.
pub const PREVIEW_MAX_PIXELS: usize = 2_000_000;

/// Resampling tier for a single redraw: `Draft` renders immediately during
/// interaction, `Full` is the deferred high-quality pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderQuality {
    Draft,
    Full,
}

impl RenderQuality {
    pub fn interpolation(self) -> Interpolation {
        match self {
            RenderQuality::Draft => Interpolation::Nearest,
            RenderQuality::Full => Interpolation::Bilinear,
        }
    }
}

/// The visible window into the composite. Rebuilt for every redraw.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportState {
    /// Display pixels per image pixel.
    pub zoom: f32,
    /// Image-space coordinates of the viewport's top-left corner.
    pub pan: (f32, f32),
    /// Output size in display pixels (width, height).
    pub size: (usize, usize),
    pub quality: RenderQuality,
    /// Sample native-resolution planes instead of the preview cache.
    pub full_resolution: bool,
}

impl ViewportState {
    pub fn new(size: (usize, usize)) -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
            size,
            quality: RenderQuality::Full,
            full_resolution: false,
        }
    }

    pub fn clamp_zoom(zoom: f32) -> f32 {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Zoom that fits the whole image inside the viewport (never upscales).
    pub fn fit_zoom(image: (usize, usize), viewport: (usize, usize)) -> f32 {
        if image.0 == 0 || image.1 == 0 || viewport.0 == 0 || viewport.1 == 0 {
            return 1.0;
        }
        let fit_x = viewport.0 as f32 / image.0 as f32;
        let fit_y = viewport.1 as f32 / image.1 as f32;
        Self::clamp_zoom(fit_x.min(fit_y).min(1.0))
    }

    /// Pan that centers the image in the viewport at the given zoom.
    pub fn centered_pan(image: (usize, usize), viewport: (usize, usize), zoom: f32) -> (f32, f32) {
        let zoom = zoom.max(MIN_ZOOM);
        (
            (image.0 as f32 - viewport.0 as f32 / zoom) / 2.0,
            (image.1 as f32 - viewport.1 as f32 / zoom) / 2.0,
        )
    }
}

/// A composited preview: RGB pixels, shape = (height, width, 3), values in
/// [0.0, 1.0]. Dimensions always equal the viewport size it was rendered for.
#[derive(Clone, Debug)]
pub struct CompositeFrame {
    pub data: Array3<f32>,
}

impl CompositeFrame {
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }
}

/// Composites transformed channels into viewport-sized preview frames.
///
/// Holds the downscaled preview planes used while `full_resolution` is off
/// and the per-channel auto-level ranges, both derived once per channel set.
pub struct Renderer {
    /// Downscaled copies of the channel planes; `None` when the source
    /// already fits the preview budget.
    preview: Option<Vec<Array2<f32>>>,
    preview_scale: f32,
    auto_ranges: Vec<Option<(f32, f32)>>,
}

impl Renderer {
    pub fn new(set: &ChannelSet) -> Self {
        Self::with_budget(set, PREVIEW_MAX_DIM, PREVIEW_MAX_PIXELS)
    }

    /// Build with an explicit preview budget (the default budget suits
    /// interactive use; smaller budgets make the preview path cheap to test).
    pub fn with_budget(set: &ChannelSet, max_dim: usize, max_pixels: usize) -> Self {
        let scale = preview_scale_for(set.width(), set.height(), max_dim, max_pixels);
        let (preview, preview_scale) = if scale >= 0.999 {
            (None, 1.0)
        } else {
            let planes = set
                .channels()
                .iter()
                .map(|c| downscale(&c.data, scale))
                .collect();
            (Some(planes), scale)
        };
        let auto_ranges = set.channels().iter().map(|c| auto_range(&c.data)).collect();
        Self {
            preview,
            preview_scale,
            auto_ranges,
        }
    }

    /// Scale of the cached preview planes relative to the source (1.0 when
    /// the source is used directly).
    pub fn preview_scale(&self) -> f32 {
        self.preview_scale
    }

    /// Composite all channels into the viewport.
    ///
    /// Never touches the source planes; the output dimensions always equal
    /// `view.size`.
    pub fn render(
        &self,
        set: &ChannelSet,
        transforms: &[Transform],
        view: &ViewportState,
        style: &DisplayStyle,
    ) -> Result<CompositeFrame> {
        if transforms.len() != set.len() {
            return Err(AlignError::TransformCountMismatch {
                transforms: transforms.len(),
                channels: set.len(),
            });
        }

        let (vw, vh) = view.size;
        let interp = view.quality.interpolation();
        let zoom = f64::from(view.zoom.max(MIN_ZOOM));
        let pan = (f64::from(view.pan.0), f64::from(view.pan.1));

        let use_native = view.full_resolution || self.preview.is_none();
        let sources: Vec<ChannelSource> = (0..set.len())
            .map(|i| {
                let (plane, scale) = if use_native {
                    (&set.channels()[i].data, 1.0)
                } else {
                    (
                        &self.preview.as_ref().expect("preview planes exist")[i],
                        f64::from(self.preview_scale),
                    )
                };
                let (ph, pw) = plane.dim();
                let scaled = transforms[i].scaled(scale);
                let (black, white) = match style.levels {
                    Levels::Manual { black, white } => (black, white),
                    Levels::Auto => self.auto_ranges[i].unwrap_or((0.0, 1.0)),
                };
                ChannelSource {
                    plane,
                    matrix: inverse_coefficients(&scaled, pw, ph),
                    scale,
                    black,
                    white,
                    opacity: style.opacities.get(i).copied().unwrap_or(1.0).clamp(0.0, 1.0),
                    tint: style.tints.get(i).copied().unwrap_or([1.0; 3]),
                }
            })
            .collect();

        let brightness = style.brightness.max(0.0);
        let mut data = Array3::<f32>::zeros((vh, vw, 3));
        data.outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .for_each(|(oy, mut row)| {
                let iy = pan.1 + (oy as f64 + 0.5) / zoom - 0.5;
                for ox in 0..vw {
                    let ix = pan.0 + (ox as f64 + 0.5) / zoom - 0.5;
                    let mut px = [0.0f32; 3];
                    for src in &sources {
                        let x = ix * src.scale;
                        let y = iy * src.scale;
                        let sx = src.matrix[0] * x + src.matrix[1] * y + src.matrix[2];
                        let sy = src.matrix[3] * x + src.matrix[4] * y + src.matrix[5];
                        let v = sample(src.plane, sx, sy, interp);
                        let g = map_level(v, src.black, src.white) * brightness * src.opacity;
                        px[0] += g * src.tint[0];
                        px[1] += g * src.tint[1];
                        px[2] += g * src.tint[2];
                    }
                    row[[ox, 0]] = px[0].clamp(0.0, 1.0);
                    row[[ox, 1]] = px[1].clamp(0.0, 1.0);
                    row[[ox, 2]] = px[2].clamp(0.0, 1.0);
                }
            });

        Ok(CompositeFrame { data })
    }
}

struct ChannelSource<'a> {
    plane: &'a Array2<f32>,
    matrix: [f64; 6],
    scale: f64,
    black: f32,
    white: f32,
    opacity: f32,
    tint: [f32; 3],
}

/// Preview scale honoring both the max-dimension and total-pixel budgets.
fn preview_scale_for(width: usize, height: usize, max_dim: usize, max_pixels: usize) -> f32 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    let longest = width.max(height) as f32;
    let scale_dim = (max_dim as f32 / longest).min(1.0);
    let scale_area = (max_pixels as f32 / (width * height) as f32)
        .sqrt()
        .min(1.0);
    scale_dim.min(scale_area).max(MIN_ZOOM)
}

fn downscale(data: &Array2<f32>, scale: f32) -> Array2<f32> {
    let (h, w) = data.dim();
    let nw = ((w as f32 * scale).round() as usize).max(1);
    let nh = ((h as f32 * scale).round() as usize).max(1);
    let sx = w as f64 / nw as f64;
    let sy = h as f64 / nh as f64;
    Array2::from_shape_fn((nh, nw), |(row, col)| {
        let x = (col as f64 + 0.5) * sx - 0.5;
        let y = (row as f64 + 0.5) * sy - 0.5;
        bilinear_sample(data, y, x)
    })
}
