use chromalign_core::channel::{Channel, ChannelSet, Transform};
use chromalign_core::error::AlignError;

mod common;
use common::{make_plane, make_set};

#[test]
fn set_rejects_mismatched_dimensions() {
    let channels = vec![
        Channel::new(make_plane(4, 4, 0.1), 8),
        Channel::new(make_plane(4, 5, 0.2), 8),
    ];
    let err = ChannelSet::new(channels, Vec::new(), None).unwrap_err();
    match err {
        AlignError::DimensionMismatch {
            expected_width,
            expected_height,
            width,
            height,
        } => {
            assert_eq!((expected_width, expected_height), (4, 4));
            assert_eq!((width, height), (5, 4));
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn set_rejects_empty_input() {
    let err = ChannelSet::new(Vec::new(), Vec::new(), None).unwrap_err();
    assert!(matches!(err, AlignError::EmptyInput));
}

#[test]
fn channel_accessor_checks_bounds() {
    let set = make_set(vec![
        Channel::new(make_plane(4, 4, 0.1), 8),
        Channel::new(make_plane(4, 4, 0.2), 8),
    ]);
    assert!(set.channel(1).is_ok());
    let err = set.channel(2).unwrap_err();
    assert!(matches!(
        err,
        AlignError::ChannelIndexOutOfRange { index: 2, total: 2 }
    ));
}

#[test]
fn transform_identity_and_scaling() {
    assert!(Transform::default().is_identity());

    let t = Transform {
        dx: 4.0,
        dy: -2.0,
        angle_deg: 1.5,
    };
    assert!(!t.is_identity());

    let half = t.scaled(0.5);
    assert_eq!(half.dx, 2.0);
    assert_eq!(half.dy, -1.0);
    // Rotation is about the (scaled) center; the angle itself is unchanged.
    assert_eq!(half.angle_deg, 1.5);
}

#[test]
fn set_dimensions_match_channels() {
    let set = make_set(vec![Channel::new(make_plane(6, 9, 0.0), 16)]);
    assert_eq!(set.width(), 9);
    assert_eq!(set.height(), 6);
    assert_eq!(set.len(), 1);
    assert_eq!(set.channels()[0].original_bit_depth, 16);
}
