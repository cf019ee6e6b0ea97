use ndarray::Array2;

use crate::channel::Transform;

/// Sampling filter used when resampling a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Bilinear,
}

/// Coefficients (a0, a1, a2, b0, b1, b2) of the output-to-source affine map
/// for `t` applied to a plane of the given size:
///
///   src_x = a0 * x + a1 * y + a2
///   src_y = b0 * x + b1 * y + b2
///
/// Inverse of: rotate about the plane center by `angle_deg`, then translate
/// by `(dx, dy)`.
pub fn inverse_coefficients(t: &Transform, width: usize, height: usize) -> [f64; 6] {
    let angle = t.angle_deg.to_radians();
    let (sa, ca) = angle.sin_cos();
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let a2 = (-ca * t.dx) - (ca * cx) + (sa * t.dy) + (sa * cy) + cx;
    let b2 = (-sa * t.dx) - (sa * cx) - (ca * t.dy) - (ca * cy) + cy;
    [ca, -sa, a2, sa, ca, b2]
}

/// Apply `t` to a full plane, producing a plane of the same dimensions.
/// Pixels that map outside the source are filled with 0 (black).
pub fn apply_transform(data: &Array2<f32>, t: &Transform, interp: Interpolation) -> Array2<f32> {
    if t.is_identity() {
        return data.clone();
    }
    let (h, w) = data.dim();
    let m = inverse_coefficients(t, w, h);
    let mut out = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let x = col as f64;
            let y = row as f64;
            let sx = m[0] * x + m[1] * y + m[2];
            let sy = m[3] * x + m[4] * y + m[5];
            out[[row, col]] = sample(data, sx, sy, interp);
        }
    }
    out
}

/// Sample `data` at fractional coordinates (x = col, y = row), zero outside
/// the plane.
pub fn sample(data: &Array2<f32>, x: f64, y: f64, interp: Interpolation) -> f32 {
    match interp {
        Interpolation::Nearest => {
            let (h, w) = data.dim();
            let col = x.round();
            let row = y.round();
            if col < 0.0 || row < 0.0 || col >= w as f64 || row >= h as f64 {
                return 0.0;
            }
            data[[row as usize, col as usize]]
        }
        Interpolation::Bilinear => bilinear_sample(data, y, x),
    }
}

/// Bilinear sample at fractional (row = y, col = x), zero outside the plane.
pub fn bilinear_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let at = |r: i64, c: i64| -> f32 {
        if r >= 0 && r < h as i64 && c >= 0 && c < w as i64 {
            data[[r as usize, c as usize]]
        } else {
            0.0
        }
    };

    let v00 = at(y0, x0);
    let v10 = at(y0, x1);
    let v01 = at(y1, x0);
    let v11 = at(y1, x1);

    let top = v00 * (1.0 - fx) + v10 * fx;
    let bottom = v01 * (1.0 - fx) + v11 * fx;
    top * (1.0 - fy) + bottom * fy
}
