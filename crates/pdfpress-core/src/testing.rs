//! Fixtures shared by unit tests

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Create a simple PDF with N pages of the given size, each containing
/// the identifiable text `<prefix>-Page-<n>`
pub(crate) fn create_test_pdf(num_pages: u32, width: f32, height: f32, prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids = Vec::new();
    for page_num in 0..num_pages {
        let content = format!(
            "BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET",
            prefix,
            page_num + 1
        );
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ],
        });
        page_ids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => page_ids,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The `(...) Tj` strings of every page, in page order
pub(crate) fn page_texts(doc: &Document) -> Vec<String> {
    let tj = regex::Regex::new(r"\(([^)]*)\) Tj").unwrap();
    doc.get_pages()
        .values()
        .flat_map(|id| {
            let content = doc.get_page_content(*id).unwrap();
            let content = String::from_utf8_lossy(&content).into_owned();
            tj.captures_iter(&content)
                .map(|c| c[1].to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}
