//! Multi-page TIFF decode/encode for channel stacks.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek};
use std::path::Path;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use crate::channel::Channel;
use crate::error::{AlignError, Result};

/// Decoded pages of one TIFF file plus the ImageDescription of the first
/// page, kept for re-tagging on export.
pub(crate) struct TiffStack {
    pub pages: Vec<TiffPage>,
    pub description: Option<String>,
}

/// One decoded page in its source layout.
pub(crate) enum TiffPage {
    Gray(Channel),
    Rgb([Channel; 3]),
}

pub(crate) fn read_stack(path: &Path) -> Result<TiffStack> {
    let file = File::open(path)?;

    // Raise the default limits; full-resolution microscopy scans easily
    // exceed them.
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1 << 30;
    limits.ifd_value_size = 1 << 30;
    limits.intermediate_buffer_size = 1 << 30;

    let mut decoder = Decoder::new(BufReader::new(file))?.with_limits(limits);
    let description = decoder.get_tag_ascii_string(Tag::ImageDescription).ok();

    let mut pages = Vec::new();
    loop {
        pages.push(read_page(&mut decoder, path)?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    Ok(TiffStack { pages, description })
}

fn read_page<R: Read + Seek>(decoder: &mut Decoder<R>, path: &Path) -> Result<TiffPage> {
    let (width, height) = decoder.dimensions()?;
    let color = decoder.colortype()?;
    let image = decoder.read_image()?;
    let (w, h) = (width as usize, height as usize);

    match (color, image) {
        (tiff::ColorType::Gray(8), DecodingResult::U8(buf)) => {
            let plane = plane_from(&buf, w, h, 1, 0, 255.0, path)?;
            Ok(TiffPage::Gray(Channel::new(plane, 8)))
        }
        (tiff::ColorType::Gray(16), DecodingResult::U16(buf)) => {
            let plane = plane_from(&buf, w, h, 1, 0, 65535.0, path)?;
            Ok(TiffPage::Gray(Channel::new(plane, 16)))
        }
        (tiff::ColorType::RGB(8), DecodingResult::U8(buf)) => {
            let planes = [
                Channel::new(plane_from(&buf, w, h, 3, 0, 255.0, path)?, 8),
                Channel::new(plane_from(&buf, w, h, 3, 1, 255.0, path)?, 8),
                Channel::new(plane_from(&buf, w, h, 3, 2, 255.0, path)?, 8),
            ];
            Ok(TiffPage::Rgb(planes))
        }
        (tiff::ColorType::RGB(16), DecodingResult::U16(buf)) => {
            let planes = [
                Channel::new(plane_from(&buf, w, h, 3, 0, 65535.0, path)?, 16),
                Channel::new(plane_from(&buf, w, h, 3, 1, 65535.0, path)?, 16),
                Channel::new(plane_from(&buf, w, h, 3, 2, 65535.0, path)?, 16),
            ];
            Ok(TiffPage::Rgb(planes))
        }
        (color, _) => Err(AlignError::UnsupportedFormat(format!(
            "{}: TIFF color type {color:?} is not supported",
            path.display()
        ))),
    }
}

/// Extract one interleaved plane from a decoded buffer, normalized to [0, 1].
fn plane_from<T: Copy + Into<f64>>(
    buf: &[T],
    width: usize,
    height: usize,
    stride: usize,
    offset: usize,
    full_scale: f64,
    path: &Path,
) -> Result<Array2<f32>> {
    if buf.len() < width * height * stride {
        return Err(AlignError::UnsupportedFormat(format!(
            "{}: truncated TIFF page",
            path.display()
        )));
    }
    Ok(Array2::from_shape_fn((height, width), |(row, col)| {
        let v: f64 = buf[(row * width + col) * stride + offset].into();
        (v / full_scale) as f32
    }))
}

/// Write planes as pages of one TIFF file. The description tag lands on the
/// first page, where readers (and `read_stack`) look for it.
pub(crate) fn write_stack(
    path: &Path,
    pages: &[(Array2<f32>, u8)],
    description: &str,
) -> Result<()> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;

    for (index, (plane, bit_depth)) in pages.iter().enumerate() {
        let (h, w) = plane.dim();
        match bit_depth {
            8 => {
                let buf: Vec<u8> = plane
                    .iter()
                    .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
                    .collect();
                let mut image = encoder.new_image::<colortype::Gray8>(w as u32, h as u32)?;
                if index == 0 {
                    image.encoder().write_tag(Tag::ImageDescription, description)?;
                }
                image.write_data(&buf)?;
            }
            _ => {
                let buf: Vec<u16> = plane
                    .iter()
                    .map(|v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16)
                    .collect();
                let mut image = encoder.new_image::<colortype::Gray16>(w as u32, h as u32)?;
                if index == 0 {
                    image.encoder().write_tag(Tag::ImageDescription, description)?;
                }
                image.write_data(&buf)?;
            }
        }
    }

    Ok(())
}
