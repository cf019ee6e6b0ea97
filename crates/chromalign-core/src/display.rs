use ndarray::Array2;

/// Display-range mapping for a channel. Applied only while compositing the
/// preview and never written back to channel data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Levels {
    /// Stretch each channel's observed min/max to the full display range.
    Auto,
    /// Fixed black/white points in normalized units.
    Manual { black: f32, white: f32 },
}

impl Default for Levels {
    fn default() -> Self {
        Levels::Auto
    }
}

/// Observed value range of a plane, `None` when the plane is flat.
pub fn auto_range(data: &Array2<f32>) -> Option<(f32, f32)> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in data.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

/// Map a value through black/white points into [0, 1].
#[inline]
pub fn map_level(v: f32, black: f32, white: f32) -> f32 {
    if white <= black {
        return v.clamp(0.0, 1.0);
    }
    ((v - black) / (white - black)).clamp(0.0, 1.0)
}

/// Tint colors assigned to channels in load order; the first channel stays
/// neutral so alignment offsets read as color fringes against it.
pub const TINT_PALETTE: &[[f32; 3]] = &[
    [1.0, 1.0, 1.0],
    [0.941, 0.353, 0.353],
    [0.353, 0.863, 0.471],
    [0.431, 0.549, 1.0],
    [0.980, 0.784, 0.314],
    [0.824, 0.431, 0.902],
    [0.353, 0.824, 0.863],
];

/// Display-only adjustments applied while compositing channels.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayStyle {
    /// Blend weight per channel, in [0, 1].
    pub opacities: Vec<f32>,
    /// Tint color per channel (linear RGB).
    pub tints: Vec<[f32; 3]>,
    /// Multiplier applied after level mapping.
    pub brightness: f32,
    pub levels: Levels,
}

impl DisplayStyle {
    pub fn for_channels(count: usize) -> Self {
        let mut opacities = vec![0.6; count];
        if let Some(first) = opacities.first_mut() {
            *first = 1.0;
        }
        Self {
            opacities,
            tints: (0..count)
                .map(|i| TINT_PALETTE[i % TINT_PALETTE.len()])
                .collect(),
            brightness: 1.0,
            levels: Levels::Auto,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.opacities.len()
    }
}
