use chromalign_core::viewport::CompositeFrame;

/// Convert a composite (RGB f32 in [0.0, 1.0]) to an egui ColorImage.
pub fn composite_to_color_image(frame: &CompositeFrame) -> egui::ColorImage {
    let w = frame.width();
    let h = frame.height();
    let slice = frame.data.as_slice().expect("composite is contiguous");

    let mut pixels = Vec::with_capacity(w * h);
    for rgb in slice.chunks_exact(3) {
        pixels.push(egui::Color32::from_rgb(
            to_u8(rgb[0]),
            to_u8(rgb[1]),
            to_u8(rgb[2]),
        ));
    }

    egui::ColorImage {
        size: [w, h],
        pixels,
        source_size: Default::default(),
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}
