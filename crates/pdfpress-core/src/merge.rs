//! PDF Merge algorithm
//!
//! Combines multiple PDFs into a single document.

use crate::error::PdfPressError;
use lopdf::{Document, Object, ObjectId};

/// Merge multiple loaded documents into one
///
/// The algorithm:
/// 1. If empty, return error
/// 2. If single document, return it as-is
/// 3. Use the first document as the destination
/// 4. For each remaining source document:
///    a. Calculate ID offset to avoid conflicts
///    b. Import all objects with remapped IDs
///    c. Append pages to the destination and re-parent them
/// 5. Rewrite the destination page tree
pub fn merge_documents(documents: Vec<Document>) -> Result<Document, PdfPressError> {
    let mut documents = documents.into_iter();

    let mut dest = documents
        .next()
        .ok_or_else(|| PdfPressError::OperationError("No documents to merge".into()))?;

    let mut dest_max_id = dest.max_id;
    let mut dest_page_refs = get_page_references(&dest);
    let pages_id = pages_root(&dest)?;

    for source in documents {
        // Get source pages before we start moving objects
        let source_pages = get_page_references(&source);

        // Calculate offset for object IDs to avoid conflicts
        let id_offset = dest_max_id;

        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            dest.objects
                .insert(new_id, remap_object_refs(object, id_offset));
        }

        for old_page_ref in source_pages {
            dest_page_refs.push((old_page_ref.0 + id_offset, old_page_ref.1));
        }

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    dest.max_id = dest_max_id;
    update_page_tree(&mut dest, pages_id, dest_page_refs)?;

    Ok(dest)
}

/// Merge serialized PDFs, returning the compressed result
pub fn merge_bytes(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfPressError> {
    if documents.is_empty() {
        return Err(PdfPressError::OperationError("No documents to merge".into()));
    }

    // Single document - return as-is
    if documents.len() == 1 {
        return Ok(documents.into_iter().next().unwrap_or_default());
    }

    let mut loaded = Vec::with_capacity(documents.len());
    for (i, bytes) in documents.iter().enumerate() {
        let doc = Document::load_mem(bytes).map_err(|e| {
            PdfPressError::ParseError(format!("Failed to load document {}: {}", i, e))
        })?;
        loaded.push(doc);
    }

    let mut merged = merge_documents(loaded)?;
    merged.compress();

    let mut buffer = Vec::new();
    merged
        .save_to(&mut buffer)
        .map_err(|e| PdfPressError::OperationError(format!("Failed to save merged PDF: {}", e)))?;
    Ok(buffer)
}

/// Get all page object references from a document, in page order
fn get_page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Locate the root Pages node through the catalog
fn pages_root(doc: &Document) -> Result<ObjectId, PdfPressError> {
    let catalog = doc
        .catalog()
        .map_err(|_| PdfPressError::OperationError("Catalog not found".into()))?;

    catalog
        .get(b"Pages")
        .map_err(|_| PdfPressError::OperationError("No Pages in catalog".into()))?
        .as_reference()
        .map_err(|_| PdfPressError::OperationError("Pages is not a reference".into()))
}

/// Point the root Pages node at `page_refs` and re-parent every page to it
fn update_page_tree(
    doc: &mut Document,
    pages_id: ObjectId,
    page_refs: Vec<ObjectId>,
) -> Result<(), PdfPressError> {
    for page_id in &page_refs {
        if let Some(Object::Dictionary(page)) = doc.objects.get_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    if let Some(Object::Dictionary(ref mut pages_dict)) = doc.objects.get_mut(&pages_id) {
        let kids = page_refs
            .iter()
            .map(|&id| Object::Reference(id))
            .collect::<Vec<_>>();
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
    } else {
        return Err(PdfPressError::OperationError(
            "Invalid pages dictionary".into(),
        ));
    }

    Ok(())
}
