pub(crate) mod tiff;

use std::path::{Path, PathBuf};

use ndarray::Array2;
use rayon::prelude::*;

use self::tiff::{read_stack, write_stack, TiffPage};
use crate::channel::{Channel, ChannelSet, Transform};
use crate::error::{AlignError, Result};
use crate::transform::{apply_transform, Interpolation};

/// Marker merged into the ImageDescription of every exported stack.
pub const ALIGNED_TAG: &str = "Manual Aligned";

pub const SUPPORTED_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg", "bmp"];

const LUMINANCE_R: f32 = 0.299;
const LUMINANCE_G: f32 = 0.587;
const LUMINANCE_B: f32 = 0.114;

/// Load alignment channels from input files.
///
/// A single multi-page TIFF contributes one channel per page; a single RGB
/// image is split into its three color planes; multiple paths contribute one
/// grayscale channel each (color files are converted to luma). All channels
/// must agree on dimensions.
pub fn load_channels(paths: &[PathBuf]) -> Result<ChannelSet> {
    if paths.is_empty() {
        return Err(AlignError::EmptyInput);
    }

    if paths.len() == 1 {
        let path = &paths[0];
        let (channels, description) = load_single(path)?;
        tracing::info!(
            path = %path.display(),
            channels = channels.len(),
            "loaded channel stack"
        );
        return ChannelSet::new(channels, paths.to_vec(), description);
    }

    let mut channels = Vec::with_capacity(paths.len());
    let mut description = None;
    for (index, path) in paths.iter().enumerate() {
        let (channel, desc) = load_gray(path)?;
        if index == 0 {
            description = desc;
        }
        channels.push(channel);
    }
    tracing::info!(files = paths.len(), "loaded channels from separate files");
    ChannelSet::new(channels, paths.to_vec(), description)
}

fn load_single(path: &Path) -> Result<(Vec<Channel>, Option<String>)> {
    match extension(path)?.as_str() {
        "tif" | "tiff" => {
            let stack = read_stack(path)?;
            let description = stack.description;
            let single_page = stack.pages.len() == 1;
            let mut channels = Vec::new();
            for page in stack.pages {
                match page {
                    TiffPage::Gray(channel) => channels.push(channel),
                    TiffPage::Rgb(planes) if single_page => channels.extend(planes),
                    TiffPage::Rgb(planes) => {
                        tracing::warn!(
                            path = %path.display(),
                            "color page in multi-page stack; converting to luma"
                        );
                        channels.push(luma(&planes));
                    }
                }
            }
            Ok((channels, description))
        }
        _ => Ok((channels_via_image(path)?, None)),
    }
}

/// Load one file as a single grayscale channel (multi-path mode).
fn load_gray(path: &Path) -> Result<(Channel, Option<String>)> {
    match extension(path)?.as_str() {
        "tif" | "tiff" => {
            let stack = read_stack(path)?;
            if stack.pages.len() > 1 {
                tracing::warn!(
                    path = %path.display(),
                    pages = stack.pages.len(),
                    "multiple pages in a per-file channel; using the first"
                );
            }
            let page = stack
                .pages
                .into_iter()
                .next()
                .ok_or_else(|| AlignError::UnsupportedFormat(path.display().to_string()))?;
            let channel = match page {
                TiffPage::Gray(channel) => channel,
                TiffPage::Rgb(planes) => luma(&planes),
            };
            Ok((channel, stack.description))
        }
        _ => {
            let img = image::open(path)?;
            let channel = match &img {
                image::DynamicImage::ImageLuma8(_)
                | image::DynamicImage::ImageLumaA8(_)
                | image::DynamicImage::ImageRgb8(_)
                | image::DynamicImage::ImageRgba8(_) => luma8_channel(&img.to_luma8()),
                _ => luma16_channel(&img.to_luma16()),
            };
            Ok((channel, None))
        }
    }
}

/// Decode a non-TIFF file into channels via the `image` crate; RGB images
/// split into their color planes.
fn channels_via_image(path: &Path) -> Result<Vec<Channel>> {
    let img = image::open(path)?;
    Ok(match &img {
        image::DynamicImage::ImageLuma8(_) | image::DynamicImage::ImageLumaA8(_) => {
            vec![luma8_channel(&img.to_luma8())]
        }
        image::DynamicImage::ImageLuma16(_) | image::DynamicImage::ImageLumaA16(_) => {
            vec![luma16_channel(&img.to_luma16())]
        }
        image::DynamicImage::ImageRgb8(_) | image::DynamicImage::ImageRgba8(_) => {
            let rgb = img.to_rgb8();
            split_rgb(rgb.dimensions(), 8, |col, row, band| {
                f32::from(rgb.get_pixel(col, row).0[band]) / 255.0
            })
        }
        image::DynamicImage::ImageRgb16(_) | image::DynamicImage::ImageRgba16(_) => {
            let rgb = img.to_rgb16();
            split_rgb(rgb.dimensions(), 16, |col, row, band| {
                f32::from(rgb.get_pixel(col, row).0[band]) / 65535.0
            })
        }
        _ => vec![luma16_channel(&img.to_luma16())],
    })
}

fn split_rgb<F>(dims: (u32, u32), bit_depth: u8, get: F) -> Vec<Channel>
where
    F: Fn(u32, u32, usize) -> f32,
{
    let (w, h) = dims;
    (0..3)
        .map(|band| {
            let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
                get(col as u32, row as u32, band)
            });
            Channel::new(data, bit_depth)
        })
        .collect()
}

fn luma8_channel(gray: &image::GrayImage) -> Channel {
    let (w, h) = gray.dimensions();
    let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        f32::from(gray.get_pixel(col as u32, row as u32).0[0]) / 255.0
    });
    Channel::new(data, 8)
}

fn luma16_channel(gray: &image::ImageBuffer<image::Luma<u16>, Vec<u16>>) -> Channel {
    let (w, h) = gray.dimensions();
    let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        f32::from(gray.get_pixel(col as u32, row as u32).0[0]) / 65535.0
    });
    Channel::new(data, 16)
}

fn luma(planes: &[Channel; 3]) -> Channel {
    let (h, w) = planes[0].data.dim();
    let data = Array2::from_shape_fn((h, w), |(row, col)| {
        LUMINANCE_R * planes[0].data[[row, col]]
            + LUMINANCE_G * planes[1].data[[row, col]]
            + LUMINANCE_B * planes[2].data[[row, col]]
    });
    Channel::new(data, planes[0].original_bit_depth)
}

fn extension(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| AlignError::UnsupportedFormat(path.display().to_string()))?;
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AlignError::UnsupportedFormat(format!(
            "{}: .{ext}",
            path.display()
        )))
    }
}

/// Result of a successful export.
#[derive(Clone, Debug)]
pub struct ExportReport {
    pub path: PathBuf,
    pub pages: usize,
    pub description: String,
}

/// Write the aligned stack as one multi-page TIFF at `path`.
///
/// Transforms are applied at full resolution with bilinear sampling; the
/// original bit depth of each channel is kept. Refuses to write over any
/// of the set's source files.
pub fn export_aligned(
    set: &ChannelSet,
    transforms: &[Transform],
    path: &Path,
) -> Result<ExportReport> {
    if transforms.len() != set.len() {
        return Err(AlignError::TransformCountMismatch {
            transforms: transforms.len(),
            channels: set.len(),
        });
    }
    if set.contains_path(path) {
        return Err(AlignError::OutputOverwritesInput(path.to_path_buf()));
    }

    let description = alignment_description(set.description());

    let pages: Vec<(Array2<f32>, u8)> = set
        .channels()
        .par_iter()
        .zip(transforms.par_iter())
        .map(|(channel, t)| {
            (
                apply_transform(&channel.data, t, Interpolation::Bilinear),
                channel.original_bit_depth,
            )
        })
        .collect();

    write_stack(path, &pages, &description)?;
    tracing::info!(
        path = %path.display(),
        pages = pages.len(),
        "exported aligned stack"
    );

    Ok(ExportReport {
        path: path.to_path_buf(),
        pages: pages.len(),
        description,
    })
}

/// Merge the alignment marker into an existing description, keeping the
/// original text and skipping the append when the marker is already there.
pub fn alignment_description(existing: Option<&str>) -> String {
    match existing {
        Some(text) if !text.trim().is_empty() => {
            if text.to_lowercase().contains(&ALIGNED_TAG.to_lowercase()) {
                text.to_string()
            } else {
                format!("{text} | {ALIGNED_TAG}")
            }
        }
        _ => ALIGNED_TAG.to_string(),
    }
}
