use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{AlignError, Result};

/// A single image channel awaiting alignment.
/// Pixel values are f32 in [0.0, 1.0]; the source buffer is never mutated.
#[derive(Clone, Debug)]
pub struct Channel {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth before conversion (8 or 16)
    pub original_bit_depth: u8,
}

impl Channel {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Manual alignment of one channel: rotation about the channel center by
/// `angle_deg` (counter-clockwise), then translation by `(dx, dy)`.
/// Display-space only; applied to pixels at render and export time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub dx: f64,
    pub dy: f64,
    pub angle_deg: f64,
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.angle_deg == 0.0
    }

    /// The equivalent transform on a plane resized by `scale`.
    /// Translation scales with the plane; the rotation angle does not.
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            dx: self.dx * scale,
            dy: self.dy * scale,
            angle_deg: self.angle_deg,
        }
    }
}

/// The loaded channels of one alignment session.
///
/// All channels share identical dimensions (checked on construction) and the
/// pixel buffers stay immutable for the lifetime of the set.
#[derive(Clone, Debug)]
pub struct ChannelSet {
    channels: Vec<Channel>,
    source_paths: Vec<PathBuf>,
    description: Option<String>,
}

impl ChannelSet {
    pub fn new(
        channels: Vec<Channel>,
        source_paths: Vec<PathBuf>,
        description: Option<String>,
    ) -> Result<Self> {
        let first = channels.first().ok_or(AlignError::EmptyInput)?;
        let (expected_width, expected_height) = (first.width(), first.height());
        for channel in &channels {
            if channel.width() != expected_width || channel.height() != expected_height {
                return Err(AlignError::DimensionMismatch {
                    expected_width,
                    expected_height,
                    width: channel.width(),
                    height: channel.height(),
                });
            }
        }
        Ok(Self {
            channels,
            source_paths,
            description,
        })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn width(&self) -> usize {
        self.channels[0].width()
    }

    pub fn height(&self) -> usize {
        self.channels[0].height()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Result<&Channel> {
        self.channels
            .get(index)
            .ok_or(AlignError::ChannelIndexOutOfRange {
                index,
                total: self.channels.len(),
            })
    }

    pub fn source_paths(&self) -> &[PathBuf] {
        &self.source_paths
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// True when `path` names one of the source images this set was loaded
    /// from. Used to guard exports: originals are never overwritten.
    pub fn contains_path(&self, path: &Path) -> bool {
        let target = absolute(path);
        self.source_paths.iter().any(|src| absolute(src) == target)
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}
