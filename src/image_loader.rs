//! # Image Loading and Decoding
//!
//! Image elements carry their pixels inline, as a `data:image/...;base64,`
//! URI or as bare base64. Nothing is fetched from disk or the network; any
//! other source fails to load and the element is painted as an error
//! placeholder.
//!
//! JPEG data passes through to the PDF untouched (DCTDecode). PNG and WebP
//! are decoded to RGB pixels with a separate alpha channel for the SMask.

use std::io::Cursor;

use crate::error::PageGridError;

/// A decoded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Intrinsic width / height, `None` for a degenerate image.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width_px == 0 || self.height_px == 0 {
            None
        } else {
            Some(self.width_px as f64 / self.height_px as f64)
        }
    }

    /// Re-encode opaque decoded pixels as JPEG at `quality` (0, 1].
    ///
    /// JPEG sources and images with transparency come back unchanged.
    pub fn with_jpeg_quality(&self, quality: f64) -> Result<LoadedImage, PageGridError> {
        let rgb = match &self.pixel_data {
            ImagePixelData::Decoded { rgb, alpha: None } => rgb,
            _ => return Ok(self.clone()),
        };
        let q = (quality.clamp(0.01, 1.0) * 100.0).round() as u8;
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, q.max(1));
        image::ImageEncoder::write_image(
            encoder,
            rgb,
            self.width_px,
            self.height_px,
            image::ColorType::Rgb8,
        )
        .map_err(|e| PageGridError::Image(format!("JPEG re-encode failed: {}", e)))?;

        Ok(LoadedImage {
            pixel_data: ImagePixelData::Jpeg {
                data: buf,
                color_space: JpegColorSpace::DeviceRGB,
            },
            width_px: self.width_px,
            height_px: self.height_px,
        })
    }
}

/// The pixel data in a form the PDF writer consumes directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels plus an optional alpha channel.
    Decoded {
        /// width * height * 3 bytes
        rgb: Vec<u8>,
        /// width * height bytes; `None` when fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl JpegColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            JpegColorSpace::DeviceRGB => "DeviceRGB",
            JpegColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Load an image from an element's `src`.
pub fn load_image(src: &str) -> Result<LoadedImage, PageGridError> {
    let raw_bytes = read_source_bytes(src.trim())?;
    decode_image_bytes(&raw_bytes)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>, PageGridError> {
    if let Some(rest) = src.strip_prefix("data:") {
        let comma_pos = rest
            .find(',')
            .ok_or_else(|| PageGridError::Image("Invalid data URI: missing comma".to_string()))?;
        let header = &rest[..comma_pos];
        if !header.ends_with(";base64") {
            return Err(PageGridError::Image(format!(
                "Unsupported data URI encoding '{}'",
                header
            )));
        }
        return base64_decode(&rest[comma_pos + 1..]);
    }
    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, PageGridError> {
    use base64::Engine;
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| PageGridError::Image(format!("Base64 decode error: {}", e)))
}

/// Detect the format from magic bytes and decode.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, PageGridError> {
    if data.len() < 4 {
        return Err(PageGridError::Image("Image data too short".to_string()));
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) || is_webp(data) {
        decode_to_rgb(data)
    } else {
        Err(PageGridError::Image(
            "Unsupported image format (expected JPEG, PNG or WebP)".to_string(),
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47]
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, PageGridError> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PageGridError::Image(format!("JPEG format detection error: {}", e)))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| PageGridError::Image(format!("Failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG markers to the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// Decode to RGBA and split into RGB + alpha.
fn decode_to_rgb(data: &[u8]) -> Result<LoadedImage, PageGridError> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PageGridError::Image(format!("Format detection error: {}", e)))?
        .decode()
        .map_err(|e| PageGridError::Image(format!("Failed to decode image: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        has_transparency |= pixel[3] != 255;
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: has_transparency.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}
