//! Fixtures for the integration tests

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

pub const A4: (f64, f64) = (595.276, 841.89);

/// Write an N page PDF; page n shows the text `<prefix>-Page-<n>`
pub fn write_pdf(dir: &Path, name: &str, pages: u32, width: f32, height: f32, prefix: &str) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = format!("BT /F1 12 Tf 50 50 Td ({}-Page-{}) Tj ET", prefix, n);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    // MediaBox and Resources live on the page tree node so they are inherited
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => pages as i64,
            "Kids" => kids,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Write a solid colour PNG
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]))
        .save(&path)
        .unwrap();
    path
}

/// Width and height of every page's MediaBox
pub fn page_sizes(doc: &Document) -> Vec<(f64, f64)> {
    doc.get_pages()
        .values()
        .map(|id| {
            let media_box = pdfpress_core::normalize::page_media_box(doc, *id).unwrap();
            (media_box.width(), media_box.height())
        })
        .collect()
}

pub fn is_a4(size: (f64, f64)) -> bool {
    (size.0 - A4.0).abs() < 0.01 && (size.1 - A4.1).abs() < 0.01
}

/// Concatenated, uncompressed content of a page
pub fn page_content(doc: &Document, page_id: lopdf::ObjectId) -> String {
    let content = doc.get_page_content(page_id).unwrap();
    String::from_utf8_lossy(&content).into_owned()
}
