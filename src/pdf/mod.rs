//! # PDF Serializer
//!
//! Takes a painted page and writes a valid single-page PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. The subset needed here is small:
//! the standard Helvetica faces, rectangles, text and image XObjects.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog
//! 2 0 obj ... endobj  <- page tree
//! ...                 <- fonts, images, content stream, page, info
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Page coordinates arrive with a top-left origin; PDF user space has its
//! origin at the bottom left, so every y is flipped against the page height.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::export::{DrawCommand, Page};
use crate::font::StandardFont;
use crate::grid::Rect;
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::style::{Border, Color};

const PRODUCER: &str = concat!("pagegrid ", env!("CARGO_PKG_VERSION"));

/// Document information dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
}

/// Serializes one [`Page`] into PDF bytes.
#[derive(Debug, Clone, Copy)]
pub struct PdfWriter {
    compress: bool,
}

struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// (font, object id); the position is the /F index.
    font_objects: Vec<(StandardFont, usize)>,
    /// XObject ids, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PdfWriter {
    /// `compress` deflates the content stream and decoded image data.
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }

    /// Write a single page to a PDF byte vector.
    pub fn write(&self, page: &Page, metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: vec![] });
        }

        self.register_fonts(&mut builder, page);
        for image in &page.images {
            let id = self.write_image_xobject(&mut builder, image);
            builder.image_objects.push(id);
        }

        let content = self.build_content_stream(page, &builder);
        let content_obj_id = builder.objects.len();
        let data = self.stream_object("", content.as_bytes(), self.compress);
        builder.objects.push(PdfObject { data });

        let page_obj_id = builder.objects.len();
        let mut resources = format!("/Font << {} >>", self.build_font_resource_dict(&builder));
        if !builder.image_objects.is_empty() {
            let xobjects = builder
                .image_objects
                .iter()
                .enumerate()
                .map(|(i, id)| format!("/Im{} {} 0 R", i, id))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(resources, " /XObject << {} >>", xobjects);
        }
        let page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {} 0 R /Resources << {} >> >>",
            page.width, page.height, content_obj_id, resources
        );
        builder.objects.push(PdfObject {
            data: page_dict.into_bytes(),
        });

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        builder.objects[2].data =
            format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", page_obj_id).into_bytes();

        let info_obj_id = builder.objects.len();
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", encode_text(title));
        }
        let _ = write!(info, "/Producer ({}) /Creator (pagegrid) >>", PRODUCER);
        builder.objects.push(PdfObject {
            data: info.into_bytes(),
        });

        self.serialize(&builder, info_obj_id)
    }

    fn stream_object(&self, dict_entries: &str, raw: &[u8], compress: bool) -> Vec<u8> {
        let mut data: Vec<u8> = Vec::new();
        if compress {
            let compressed = compress_to_vec_zlib(raw, 6);
            let _ = write!(
                data,
                "<< {}/Length {} /Filter /FlateDecode >>\nstream\n",
                dict_entries,
                compressed.len()
            );
            data.extend_from_slice(&compressed);
        } else {
            let _ = write!(data, "<< {}/Length {} >>\nstream\n", dict_entries, raw.len());
            data.extend_from_slice(raw);
        }
        data.extend_from_slice(b"\nendstream");
        data
    }

    /// Helvetica is always registered; Helvetica-Bold only when used.
    fn register_fonts(&self, builder: &mut PdfBuilder, page: &Page) {
        let mut fonts = page.fonts();
        if !fonts.contains(&StandardFont::Helvetica) {
            fonts.insert(0, StandardFont::Helvetica);
        }
        for font in fonts {
            let obj_id = builder.objects.len();
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: dict.into_bytes(),
            });
            builder.font_objects.push((font, obj_id));
        }
    }

    fn build_font_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn font_index(&self, font: StandardFont, builder: &PdfBuilder) -> usize {
        builder
            .font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    /// Write an image as one XObject, plus an SMask when it has alpha.
    fn write_image_xobject(&self, builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /{} /BitsPerComponent 8 /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space.pdf_name(),
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                let obj_id = builder.objects.len();
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }
            ImagePixelData::Decoded { rgb, alpha } => {
                let header = |color_space: &str| {
                    format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /{} /BitsPerComponent 8 ",
                        image.width_px, image.height_px, color_space
                    )
                };

                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let data = self.stream_object(&header("DeviceGray"), alpha_data, self.compress);
                    let id = builder.objects.len();
                    builder.objects.push(PdfObject { data });
                    id
                });

                let mut dict = header("DeviceRGB");
                if let Some(id) = smask_id {
                    let _ = write!(dict, "/SMask {} 0 R ", id);
                }
                let data = self.stream_object(&dict, rgb, self.compress);
                let obj_id = builder.objects.len();
                builder.objects.push(PdfObject { data });
                obj_id
            }
        }
    }

    /// Build the content stream operators for the page.
    fn build_content_stream(&self, page: &Page, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        let page_height = page.height;

        for command in &page.commands {
            match command {
                DrawCommand::Rect {
                    rect,
                    fill,
                    stroke,
                    radius,
                } => self.write_rect(&mut stream, flip(rect, page_height), *fill, *stroke, *radius),

                DrawCommand::Text {
                    x,
                    baseline,
                    text,
                    font,
                    size,
                    color,
                } => {
                    let _ = write!(
                        stream,
                        "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                        color.r,
                        color.g,
                        color.b,
                        self.font_index(*font, builder),
                        size,
                        x,
                        page_height - baseline,
                        encode_text(text)
                    );
                }

                DrawCommand::Image { index, rect, clip } => {
                    let clip = flip(clip, page_height);
                    let target = flip(rect, page_height);
                    let _ = write!(
                        stream,
                        "q\n{:.2} {:.2} {:.2} {:.2} re W n\n\
                         {:.4} 0 0 {:.4} {:.4} {:.4} cm\n/Im{} Do\nQ\n",
                        clip.x,
                        clip.y,
                        clip.width,
                        clip.height,
                        target.width,
                        target.height,
                        target.x,
                        target.y,
                        index
                    );
                }
            }
        }

        stream
    }

    fn write_rect(
        &self,
        stream: &mut String,
        r: Rect,
        fill: Option<Color>,
        stroke: Option<Border>,
        radius: f64,
    ) {
        let op = match (fill.is_some(), stroke.is_some()) {
            (true, true) => "B",
            (true, false) => "f",
            (false, true) => "S",
            (false, false) => return,
        };
        stream.push_str("q\n");
        if let Some(bg) = fill {
            let _ = write!(stream, "{:.3} {:.3} {:.3} rg\n", bg.r, bg.g, bg.b);
        }
        if let Some(border) = stroke {
            let c = border.color;
            let _ = write!(
                stream,
                "{:.3} {:.3} {:.3} RG\n{:.2} w\n",
                c.r, c.g, c.b, border.width
            );
        }
        if radius > 0.0 {
            self.write_rounded_rect(stream, r, radius);
        } else {
            let _ = write!(stream, "{:.2} {:.2} {:.2} {:.2} re\n", r.x, r.y, r.width, r.height);
        }
        let _ = write!(stream, "{}\nQ\n", op);
    }

    /// A closed rounded-rectangle path with four Bezier corners.
    fn write_rounded_rect(&self, stream: &mut String, r: Rect, radius: f64) {
        let k = 0.5522847498;
        let (x, y, w, h) = (r.x, r.y, r.width, r.height);
        let rad = radius.min(w / 2.0).min(h / 2.0);
        let c = rad * k;

        let _ = write!(stream, "{:.2} {:.2} m\n", x + rad, y);
        let _ = write!(stream, "{:.2} {:.2} l\n", x + w - rad, y);
        let _ = write!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            x + w - rad + c, y,
            x + w, y + rad - c,
            x + w, y + rad
        );
        let _ = write!(stream, "{:.2} {:.2} l\n", x + w, y + h - rad);
        let _ = write!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            x + w, y + h - rad + c,
            x + w - rad + c, y + h,
            x + w - rad, y + h
        );
        let _ = write!(stream, "{:.2} {:.2} l\n", x + rad, y + h);
        let _ = write!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            x + rad - c, y + h,
            x, y + h - rad + c,
            x, y + h - rad
        );
        let _ = write!(stream, "{:.2} {:.2} l\n", x, y + rad);
        let _ = write!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            x, y + rad - c,
            x + rad - c, y,
            x + rad, y
        );
        stream.push_str("h\n");
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

/// Convert a top-left-origin rectangle to PDF user space.
fn flip(r: &Rect, page_height: f64) -> Rect {
    Rect::new(r.x, page_height - r.y - r.height, r.width, r.height)
}

/// Encode text as the body of a PDF literal string in WinAnsiEncoding.
///
/// Characters outside the encoding become `?`.
fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is Windows-1252: 0x20..=0x7E and 0xA0..=0xFF map
/// directly, 0x80..=0x9F hold typographic quotes, dashes and the like.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98),
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}
