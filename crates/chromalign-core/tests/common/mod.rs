use ndarray::Array2;

use chromalign_core::channel::{Channel, ChannelSet};

/// A plane filled with a constant value.
#[allow(dead_code)]
pub fn make_plane(h: usize, w: usize, fill: f32) -> Array2<f32> {
    Array2::from_elem((h, w), fill)
}

/// A plane with a single bright pixel at (x, y).
#[allow(dead_code)]
pub fn make_point_plane(h: usize, w: usize, x: usize, y: usize) -> Array2<f32> {
    let mut data = Array2::<f32>::zeros((h, w));
    data[[y, x]] = 1.0;
    data
}

/// A monotonically increasing ramp covering [0, 1).
#[allow(dead_code)]
pub fn make_ramp_plane(h: usize, w: usize) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(row, col)| (row * w + col) as f32 / (h * w) as f32)
}

/// A ramp whose values are exact 8-bit levels (k/255), so an 8-bit file
/// round-trip reproduces them without quantization error.
#[allow(dead_code)]
pub fn make_u8_plane(h: usize, w: usize) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(row, col)| ((row * w + col) % 256) as f32 / 255.0)
}

#[allow(dead_code)]
pub fn make_set(channels: Vec<Channel>) -> ChannelSet {
    ChannelSet::new(channels, Vec::new(), None).expect("valid channel set")
}
