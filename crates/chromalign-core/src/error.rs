use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("No input images given")]
    EmptyInput,

    #[error(
        "Channel dimensions differ: expected {expected_width}x{expected_height}, \
         got {width}x{height}"
    )]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    #[error("Channel index {index} out of range (total: {total})")]
    ChannelIndexOutOfRange { index: usize, total: usize },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Output path {} would overwrite an input image", .0.display())]
    OutputOverwritesInput(PathBuf),

    #[error("Transform count {transforms} does not match channel count {channels}")]
    TransformCountMismatch { transforms: usize, channels: usize },
}

pub type Result<T> = std::result::Result<T, AlignError>;
