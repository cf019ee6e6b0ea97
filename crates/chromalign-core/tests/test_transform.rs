use approx::assert_abs_diff_eq;

use chromalign_core::channel::Transform;
use chromalign_core::transform::{apply_transform, inverse_coefficients, Interpolation};

mod common;
use common::{make_point_plane, make_ramp_plane};

#[test]
fn translation_moves_point_exactly() {
    // Bright pixel at (2, 2); dx=1, dy=-1 moves it to (3, 1).
    let plane = make_point_plane(5, 5, 2, 2);
    let t = Transform {
        dx: 1.0,
        dy: -1.0,
        angle_deg: 0.0,
    };
    let out = apply_transform(&plane, &t, Interpolation::Nearest);
    assert_eq!(out[[1, 3]], 1.0);
    assert_eq!(out[[2, 2]], 0.0);
}

#[test]
fn identity_is_a_noop() {
    let plane = make_ramp_plane(4, 4);
    let out = apply_transform(&plane, &Transform::default(), Interpolation::Nearest);
    assert_eq!(out, plane);
}

#[test]
fn quarter_turn_rotates_about_center() {
    // Even-sized plane so the center sits on a pixel corner: the source
    // pixel at (2, 3) lands at (3, 2) after a 90-degree turn.
    let plane = make_point_plane(4, 4, 2, 3);
    let t = Transform {
        dx: 0.0,
        dy: 0.0,
        angle_deg: 90.0,
    };
    let out = apply_transform(&plane, &t, Interpolation::Nearest);
    assert_eq!(out[[2, 3]], 1.0);
    assert_eq!(out[[3, 2]], 0.0);
}

#[test]
fn rotation_then_translation_composes() {
    let plane = make_point_plane(4, 4, 2, 3);
    let t = Transform {
        dx: 1.0,
        dy: 0.0,
        angle_deg: 90.0,
    };
    let out = apply_transform(&plane, &t, Interpolation::Nearest);
    // Quarter turn puts the point at (3, 2); the translation carries it
    // off the right edge, so nothing remains.
    assert!(out.iter().all(|&v| v == 0.0));

    let t_back = Transform {
        dx: -1.0,
        dy: 0.0,
        angle_deg: 90.0,
    };
    let out = apply_transform(&plane, &t_back, Interpolation::Nearest);
    assert_eq!(out[[2, 2]], 1.0);
}

#[test]
fn bilinear_splits_half_pixel_shifts() {
    let plane = make_point_plane(3, 3, 1, 1);
    let t = Transform {
        dx: 0.5,
        dy: 0.0,
        angle_deg: 0.0,
    };
    let out = apply_transform(&plane, &t, Interpolation::Bilinear);
    assert_abs_diff_eq!(out[[1, 1]], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(out[[1, 2]], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(out[[0, 1]], 0.0, epsilon = 1e-6);
}

#[test]
fn shifted_out_pixels_fill_black() {
    let plane = make_ramp_plane(4, 4);
    let t = Transform {
        dx: 10.0,
        dy: 0.0,
        angle_deg: 0.0,
    };
    let out = apply_transform(&plane, &t, Interpolation::Bilinear);
    assert!(out.iter().all(|&v| v == 0.0));
}

#[test]
fn identity_coefficients_are_unit() {
    let m = inverse_coefficients(&Transform::default(), 7, 5);
    let expected = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    for (got, want) in m.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
    }
}

#[test]
fn translation_coefficients_invert_the_offset() {
    let t = Transform {
        dx: 3.0,
        dy: -2.0,
        angle_deg: 0.0,
    };
    let m = inverse_coefficients(&t, 8, 8);
    // Output (5, 1) must sample source (2, 3).
    let sx = m[0] * 5.0 + m[1] * 1.0 + m[2];
    let sy = m[3] * 5.0 + m[4] * 1.0 + m[5];
    assert_abs_diff_eq!(sx, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(sy, 3.0, epsilon = 1e-12);
}
