// synothumb/src/processors/raw.rs
//! Camera RAW development: sensor decode through rawloader, followed by a
//! small demosaic that applies the camera white balance and sRGB gamma and
//! produces 8 bits per channel.

use crate::core::{Result, ThumbError};
use crate::processors::loader::Decoded;
use crate::processors::metadata::Orientation;
use image::{DynamicImage, Rgb, RgbImage};
use rawloader::{RawImage, RawImageData};
use std::path::Path;

#[derive(Clone, Default)]
pub struct RawDeveloper;

impl RawDeveloper {
    pub fn new() -> Self {
        Self
    }

    /// Decodes and develops `path`. The orientation comes from the RAW
    /// container itself, which covers formats plain EXIF readers reject.
    pub fn develop(&self, path: &Path) -> Result<Decoded> {
        log::debug!("Developing RAW file {}", path.display());

        let raw = rawloader::decode_file(path)
            .map_err(|e| unsupported(path, format!("{:?}", e)))?;

        log::debug!(
            "Decoded {} {} sensor: {}x{}, {} component(s) per pixel, {:?}",
            raw.make,
            raw.model,
            raw.width,
            raw.height,
            raw.cpp,
            raw.orientation
        );

        develop_raw(&raw, path)
    }
}

fn develop_raw(raw: &RawImage, path: &Path) -> Result<Decoded> {
    let expected = raw.width * raw.height * raw.cpp;
    let available = match &raw.data {
        RawImageData::Integer(values) => values.len(),
        RawImageData::Float(values) => values.len(),
    };
    if raw.width == 0 || raw.height == 0 || available < expected {
        return Err(unsupported(path, "truncated sensor data".to_string()));
    }

    let image = match raw.cpp {
        1 if raw.cfa.width > 0 && raw.cfa.height > 0 => develop_mosaic(raw),
        1 => return Err(unsupported(path, "no colour filter pattern".to_string())),
        3 => develop_linear(raw),
        cpp => {
            return Err(unsupported(
                path,
                format!("{} components per pixel", cpp),
            ))
        }
    };

    Ok(Decoded {
        image: DynamicImage::ImageRgb8(image),
        orientation: sensor_orientation(raw.orientation),
    })
}

fn unsupported(path: &Path, detail: String) -> ThumbError {
    ThumbError::UnsupportedRaw {
        path: path.to_path_buf(),
        detail,
    }
}

/// `None` when the container carried no usable orientation.
pub fn sensor_orientation(orientation: rawloader::Orientation) -> Option<Orientation> {
    use rawloader::Orientation as Sensor;

    match orientation {
        Sensor::Normal => Some(Orientation::Normal),
        Sensor::HorizontalFlip => Some(Orientation::MirroredHorizontal),
        Sensor::Rotate180 => Some(Orientation::Rotate180),
        Sensor::VerticalFlip => Some(Orientation::MirroredVertical),
        Sensor::Transpose => Some(Orientation::MirroredHorizontalAnd270CW),
        Sensor::Rotate90 => Some(Orientation::Rotate90CW),
        Sensor::Transverse => Some(Orientation::MirroredHorizontalAnd90CW),
        Sensor::Rotate270 => Some(Orientation::Rotate270CW),
        Sensor::Unknown => None,
    }
}

/// Black and white points per CFA colour, used to scale samples into 0..=1.
#[derive(Debug, Clone, PartialEq)]
struct Levels {
    black: [f32; 4],
    range: [f32; 4],
}

impl Levels {
    fn new(blacklevels: [u16; 4], whitelevels: [u16; 4]) -> Self {
        let mut black = [0.0; 4];
        let mut range = [1.0; 4];
        for c in 0..4 {
            black[c] = f32::from(blacklevels[c]);
            let white = f32::from(whitelevels[c]);
            range[c] = if white > black[c] {
                white - black[c]
            } else {
                f32::from(u16::MAX)
            };
        }
        Self { black, range }
    }

    fn from_raw(raw: &RawImage) -> Self {
        Self::new(raw.blacklevels, raw.whitelevels)
    }

    fn scale(&self, value: u16, color: usize) -> f32 {
        let color = color.min(3);
        (f32::from(value) - self.black[color]) / self.range[color]
    }
}

/// Sensor samples normalised to 0..=1 for a given CFA colour.
fn normalised(raw: &RawImage, levels: &Levels, index: usize, color: usize) -> f32 {
    match &raw.data {
        RawImageData::Integer(values) => levels.scale(values[index], color),
        RawImageData::Float(values) => values[index],
    }
}

/// Camera white balance scaled so green is 1.0. Missing coefficients fall
/// back to neutral.
fn white_balance(coeffs: [f32; 4]) -> [f32; 3] {
    let usable = |v: f32| v.is_finite() && v > 0.0;
    let green = coeffs[1];
    if !usable(green) {
        return [1.0, 1.0, 1.0];
    }

    let scale = |v: f32| if usable(v) { v / green } else { 1.0 };
    [scale(coeffs[0]), 1.0, scale(coeffs[2])]
}

/// Active area as (top, left, width, height) from `[top, right, bottom,
/// left]` crops. Crops that would leave nothing behind are ignored.
fn active_area(width: usize, height: usize, crops: [usize; 4]) -> (usize, usize, usize, usize) {
    let [top, right, bottom, left] = crops;
    if top + bottom < height && left + right < width {
        (top, left, width - left - right, height - top - bottom)
    } else {
        (0, 0, width, height)
    }
}

/// Offset into row-major sensor data with `cpp` components per pixel.
fn sample_index(raw_width: usize, cpp: usize, row: usize, col: usize) -> usize {
    (row * raw_width + col) * cpp
}

fn develop_mosaic(raw: &RawImage) -> RgbImage {
    let levels = Levels::from_raw(raw);
    let (top, left, width, height) = active_area(raw.width, raw.height, raw.crops);
    let color_at = |row: usize, col: usize| raw.cfa.color_at(top + row, left + col);
    let sample = |row: usize, col: usize| {
        let index = sample_index(raw.width, 1, top + row, left + col);
        normalised(raw, &levels, index, color_at(row, col))
    };

    demosaic(width, height, sample, color_at, white_balance(raw.wb_coeffs))
}

fn develop_linear(raw: &RawImage) -> RgbImage {
    let levels = Levels::from_raw(raw);
    let (top, left, width, height) = active_area(raw.width, raw.height, raw.crops);
    let wb = white_balance(raw.wb_coeffs);

    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let base = sample_index(raw.width, 3, top + y as usize, left + x as usize);
        let mut rgb = [0.0; 3];
        for (c, value) in rgb.iter_mut().enumerate() {
            *value = normalised(raw, &levels, base + c, c) * wb[c];
        }
        to_srgb8(rgb)
    })
}

/// Bilinear-style demosaic for any repeating colour filter. Each output pixel
/// keeps its own sample for its colour and averages the same-coloured sites
/// of its 3x3 neighbourhood for the other two. CFA colour 3 (the second
/// green on RGBE sensors) is treated as green.
pub fn demosaic<S, C>(width: usize, height: usize, sample: S, color_at: C, wb: [f32; 3]) -> RgbImage
where
    S: Fn(usize, usize) -> f32,
    C: Fn(usize, usize) -> usize,
{
    let channel = |color: usize| if color == 3 { 1 } else { color.min(2) };

    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (row, col) = (y as usize, x as usize);
        let mut sums = [0.0f32; 3];
        let mut counts = [0u32; 3];

        for r in row.saturating_sub(1)..=(row + 1).min(height - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(width - 1) {
                let ch = channel(color_at(r, c));
                sums[ch] += sample(r, c);
                counts[ch] += 1;
            }
        }

        let own = channel(color_at(row, col));
        let mut rgb = [0.0f32; 3];
        for ch in 0..3 {
            let value = if ch == own {
                sample(row, col)
            } else if counts[ch] > 0 {
                sums[ch] / counts[ch] as f32
            } else {
                0.0
            };
            rgb[ch] = value * wb[ch];
        }

        to_srgb8(rgb)
    })
}

fn to_srgb8(linear: [f32; 3]) -> Rgb<u8> {
    Rgb(linear.map(|v| (srgb_gamma(v.clamp(0.0, 1.0)) * 255.0).round() as u8))
}

pub fn srgb_gamma(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}
