use std::fs;
use std::path::PathBuf;

use approx::assert_abs_diff_eq;

use chromalign_core::channel::{Channel, ChannelSet, Transform};
use chromalign_core::error::AlignError;
use chromalign_core::io::{alignment_description, export_aligned, load_channels, ALIGNED_TAG};
use chromalign_core::transform::{apply_transform, Interpolation};

mod common;
use common::{make_set, make_u8_plane};

fn shifted(dx: f64) -> Transform {
    Transform {
        dx,
        dy: 0.0,
        angle_deg: 0.0,
    }
}

#[test]
fn export_then_reload_round_trips_pixels_and_tag() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("aligned.tif");

    let set = make_set(vec![
        Channel::new(make_u8_plane(6, 5), 8),
        Channel::new(make_u8_plane(6, 5), 8),
    ]);
    let transforms = vec![Transform::default(), shifted(1.0)];

    let report = export_aligned(&set, &transforms, &out).unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(report.description, ALIGNED_TAG);

    let reloaded = load_channels(&[out]).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.description(), Some(ALIGNED_TAG));
    assert_eq!(reloaded.channels()[0].original_bit_depth, 8);

    // Page 0 was exported untransformed: exact round trip.
    for (got, want) in reloaded.channels()[0]
        .data
        .iter()
        .zip(set.channels()[0].data.iter())
    {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
    }

    // Page 1 matches the full-resolution transform of its source.
    let expected = apply_transform(&set.channels()[1].data, &transforms[1], Interpolation::Bilinear);
    for (got, want) in reloaded.channels()[1].data.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-3);
    }
}

#[test]
fn sixteen_bit_stacks_keep_their_depth() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("deep.tif");

    let plane = ndarray::Array2::from_shape_fn((4, 4), |(row, col)| {
        ((row * 4 + col) * 4000) as f32 / 65535.0
    });
    let set = make_set(vec![Channel::new(plane.clone(), 16)]);

    export_aligned(&set, &[Transform::default()], &out).unwrap();
    let reloaded = load_channels(&[out]).unwrap();

    assert_eq!(reloaded.channels()[0].original_bit_depth, 16);
    for (got, want) in reloaded.channels()[0].data.iter().zip(plane.iter()) {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
    }
}

#[test]
fn export_refuses_source_paths_and_never_touches_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.tif");

    // Build an on-disk source stack first.
    let seed = make_set(vec![Channel::new(make_u8_plane(4, 4), 8)]);
    export_aligned(&seed, &[Transform::default()], &input).unwrap();
    let bytes_before = fs::read(&input).unwrap();

    let set = load_channels(&[input.clone()]).unwrap();
    let err = export_aligned(&set, &[shifted(2.0)], &input).unwrap_err();
    assert!(matches!(err, AlignError::OutputOverwritesInput(_)));
    assert_eq!(fs::read(&input).unwrap(), bytes_before);

    // A distinct destination succeeds and still leaves the input alone.
    let out = dir.path().join("output.tif");
    export_aligned(&set, &[shifted(2.0)], &out).unwrap();
    assert_eq!(fs::read(&input).unwrap(), bytes_before);
}

#[test]
fn existing_descriptions_are_preserved_and_tagged() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tagged.tif");

    let set = ChannelSet::new(
        vec![Channel::new(make_u8_plane(4, 4), 8)],
        Vec::new(),
        Some("two-photon stack".into()),
    )
    .unwrap();
    export_aligned(&set, &[Transform::default()], &out).unwrap();

    let reloaded = load_channels(&[out.clone()]).unwrap();
    assert_eq!(
        reloaded.description(),
        Some("two-photon stack | Manual Aligned")
    );

    // Re-exporting an already tagged stack does not duplicate the marker.
    let out2 = dir.path().join("tagged2.tif");
    export_aligned(&reloaded, &[Transform::default()], &out2).unwrap();
    let again = load_channels(&[out2]).unwrap();
    assert_eq!(
        again.description(),
        Some("two-photon stack | Manual Aligned")
    );
}

#[test]
fn alignment_description_merging() {
    assert_eq!(alignment_description(None), ALIGNED_TAG);
    assert_eq!(alignment_description(Some("")), ALIGNED_TAG);
    assert_eq!(
        alignment_description(Some("scope A")),
        "scope A | Manual Aligned"
    );
    // Case-insensitive: an existing marker is left as-is.
    assert_eq!(
        alignment_description(Some("already MANUAL ALIGNED")),
        "already MANUAL ALIGNED"
    );
}

#[test]
fn rgb_images_split_into_three_channels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("color.png");

    let img = image::RgbImage::from_fn(5, 4, |x, _y| image::Rgb([x as u8 * 10, 128, 200]));
    img.save(&path).unwrap();

    let set = load_channels(&[path]).unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set.width(), 5);
    assert_eq!(set.height(), 4);
    assert_abs_diff_eq!(set.channels()[1].data[[0, 0]], 128.0 / 255.0, epsilon = 1e-6);
    assert_abs_diff_eq!(set.channels()[2].data[[0, 0]], 200.0 / 255.0, epsilon = 1e-6);
    assert_abs_diff_eq!(set.channels()[0].data[[0, 3]], 30.0 / 255.0, epsilon = 1e-6);
}

#[test]
fn separate_files_become_grayscale_channels() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");

    image::GrayImage::from_pixel(4, 4, image::Luma([60])).save(&a).unwrap();
    image::RgbImage::from_pixel(4, 4, image::Rgb([255, 0, 0])).save(&b).unwrap();

    let set = load_channels(&[a, b]).unwrap();
    assert_eq!(set.len(), 2);
    assert_abs_diff_eq!(set.channels()[0].data[[1, 1]], 60.0 / 255.0, epsilon = 1e-6);
    // The color file collapses to luma.
    let red_luma = set.channels()[1].data[[1, 1]];
    assert!(red_luma > 0.2 && red_luma < 0.4, "got {red_luma}");
}

#[test]
fn mismatched_files_fail_without_partial_load() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");

    image::GrayImage::from_pixel(4, 4, image::Luma([10])).save(&a).unwrap();
    image::GrayImage::from_pixel(5, 4, image::Luma([10])).save(&b).unwrap();

    let err = load_channels(&[a, b]).unwrap_err();
    assert!(matches!(err, AlignError::DimensionMismatch { .. }));
}

#[test]
fn empty_and_unsupported_inputs_are_rejected() {
    let err = load_channels(&[]).unwrap_err();
    assert!(matches!(err, AlignError::EmptyInput));

    let err = load_channels(&[PathBuf::from("notes.txt")]).unwrap_err();
    assert!(matches!(err, AlignError::UnsupportedFormat(_)));
}
