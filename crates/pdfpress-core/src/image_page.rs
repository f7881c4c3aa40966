//! Turn a raster image into a one-page A4 PDF
//!
//! The image is resized (up or down) to the largest size that fits an A4
//! canvas at the configured DPI, then drawn centred on a white A4 page.

use crate::error::PdfPressError;
use crate::geometry::{image_placement, ImagePlacement, A4_HEIGHT_PT, A4_WIDTH_PT, DEFAULT_DPI};
use crate::output::read_file;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbImage};
use lopdf::{dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;

const IMAGE_NAME: &str = "Im0";

/// How the resized image is stored in the PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageEncoding {
    /// DCTDecode
    Jpeg { quality: u8 },
    /// Lossless RGB with FlateDecode
    Flate,
}

impl Default for ImageEncoding {
    fn default() -> Self {
        ImageEncoding::Jpeg { quality: 90 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageOptions {
    pub dpi: u32,
    pub encoding: ImageEncoding,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            encoding: ImageEncoding::default(),
        }
    }
}

/// Decode the image at `path` and build an A4 document from it
pub fn load_image_file(path: &Path, options: &ImageOptions) -> Result<Document, PdfPressError> {
    let bytes = read_file(path)?;
    image_to_a4_document(&bytes, options)
}

/// Decode `bytes` (format guessed from content) and build an A4 document
pub fn image_to_a4_document(
    bytes: &[u8],
    options: &ImageOptions,
) -> Result<Document, PdfPressError> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PdfPressError::OperationError(format!("Failed to read image: {}", e)))?
        .decode()?;

    image_to_a4(&decoded, options)
}

/// Build an A4 document from an already decoded image
pub fn image_to_a4(img: &DynamicImage, options: &ImageOptions) -> Result<Document, PdfPressError> {
    let placement = image_placement(img.width(), img.height(), options.dpi).ok_or_else(|| {
        PdfPressError::OperationError(format!(
            "Cannot place a {}x{} image at {} DPI",
            img.width(),
            img.height(),
            options.dpi
        ))
    })?;

    let flattened = flatten_on_white(img);
    let resized = image::imageops::resize(
        &flattened,
        placement.width_px,
        placement.height_px,
        FilterType::Lanczos3,
    );

    debug!(
        from_w = img.width(),
        from_h = img.height(),
        to_w = placement.width_px,
        to_h = placement.height_px,
        "image resized for A4"
    );

    let xobject = encode_xobject(&resized, options.encoding)?;
    Ok(build_single_page(xobject, &placement))
}

/// Composite any alpha channel over a white background
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(rgb.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let blend = |c: u8| -> u8 {
            let a = a as u32;
            ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8
        };
        dst.0 = [blend(r), blend(g), blend(b)];
    }
    rgb
}

fn encode_xobject(rgb: &RgbImage, encoding: ImageEncoding) -> Result<Stream, PdfPressError> {
    let (width, height) = rgb.dimensions();

    let (filter, data) = match encoding {
        ImageEncoding::Jpeg { quality } => {
            let mut jpeg = Vec::new();
            JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
            ("DCTDecode", jpeg)
        }
        ImageEncoding::Flate => {
            let mut encoder =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder
                .write_all(rgb.as_raw())
                .and_then(|_| encoder.flush())
                .map_err(|e| PdfPressError::OperationError(format!("Failed to compress image: {}", e)))?;
            let compressed = encoder
                .finish()
                .map_err(|e| PdfPressError::OperationError(format!("Failed to compress image: {}", e)))?;
            ("FlateDecode", compressed)
        }
    };

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => filter,
    };

    // Already encoded; keep lopdf from compressing it again
    let mut stream = Stream::new(dict, data);
    stream.allows_compression = false;
    Ok(stream)
}

fn build_single_page(xobject: Stream, placement: &ImagePlacement) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(xobject);

    let (x, y, w, h) = placement.rect_pts();
    let content = format!(
        "q\n{:.4} 0 0 {:.4} {:.4} {:.4} cm\n/{} Do\nQ\n",
        w, h, x, y, IMAGE_NAME
    );
    let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(A4_WIDTH_PT as f32),
            Object::Real(A4_HEIGHT_PT as f32),
        ],
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
        "Contents" => content_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::page_media_box;
    use image::{Rgb, Rgba, RgbaImage};

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn image_dict(doc: &Document) -> lopdf::Dictionary {
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        doc.get_object(image_id)
            .unwrap()
            .as_stream()
            .unwrap()
            .dict
            .clone()
    }

    #[test]
    fn test_png_becomes_single_a4_page() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 200, Rgb([200, 10, 10])));
        let doc = image_to_a4_document(&png_bytes(&img), &ImageOptions::default()).unwrap();

        assert_eq!(doc.get_pages().len(), 1);
        let page_id = *doc.get_pages().get(&1).unwrap();
        let media_box = page_media_box(&doc, page_id).unwrap();
        assert!((media_box.width() - A4_WIDTH_PT).abs() < 0.01);
        assert!((media_box.height() - A4_HEIGHT_PT).abs() < 0.01);

        let dict = image_dict(&doc);
        assert_eq!(dict.get(b"Width").unwrap().as_i64().unwrap(), 2480);
        assert_eq!(dict.get(b"Height").unwrap().as_i64().unwrap(), 1240);
        assert_eq!(dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
    }

    #[test]
    fn test_flate_encoding_and_custom_dpi() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 20, Rgb([0, 0, 0])));
        let options = ImageOptions {
            dpi: 72,
            encoding: ImageEncoding::Flate,
        };
        let doc = image_to_a4(&img, &options).unwrap();

        let dict = image_dict(&doc);
        assert_eq!(dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
        // 72 DPI canvas is 595 x 842 pixels; height is the limiting side
        assert_eq!(dict.get(b"Height").unwrap().as_i64().unwrap(), 842);
        assert_eq!(dict.get(b"Width").unwrap().as_i64().unwrap(), 421);
    }

    #[test]
    fn test_document_round_trips_through_save() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 30, Rgb([1, 2, 3])));
        let mut doc = image_to_a4(&img, &ImageOptions::default()).unwrap();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let flat = flatten_on_white(&img);
        assert!(flat.pixels().all(|p| p.0 == [255, 255, 255]));

        let half = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let flat = flatten_on_white(&half);
        assert_eq!(flat.get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        let err = image_to_a4_document(b"definitely not an image", &ImageOptions::default())
            .unwrap_err();
        assert!(matches!(err, PdfPressError::Image(_)));
    }
}
