//! Normalise existing PDF pages to A4
//!
//! Each page's content is wrapped in a `q … cm … Q` pair that scales and
//! centres it inside an A4 MediaBox. Page attributes normally inherited from
//! the page tree are copied onto the page so it can be moved into another
//! document's tree.
//!
//! `/Rotate` is one of those attributes and is kept, so a source page rotated
//! by 90 or 270 degrees is displayed as a landscape A4 page.

use crate::error::PdfPressError;
use crate::geometry::{fit_to_a4, FitTransform, PageBox, A4_HEIGHT_PT, A4_WIDTH_PT};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Boxes that would no longer match the rewritten MediaBox
const STALE_BOXES: &[&[u8]] = &[b"TrimBox", b"BleedBox", b"ArtBox"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizeOutcome {
    /// The page now has an A4 MediaBox and transformed content
    Transformed(FitTransform),
    /// The MediaBox was missing or unusable; the page was left unchanged
    Skipped,
}

/// Normalise every page of `doc`, returning the number left unchanged
pub fn normalize_document(doc: &mut Document) -> Result<u32, PdfPressError> {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    let mut skipped = 0;

    for (index, page_id) in page_ids.into_iter().enumerate() {
        match normalize_page(doc, page_id)? {
            NormalizeOutcome::Transformed(fit) => {
                debug!(page = index + 1, scale = fit.scale, tx = fit.tx, ty = fit.ty, "page normalized");
            }
            NormalizeOutcome::Skipped => {
                warn!(page = index + 1, "page has no usable MediaBox, kept as-is");
                skipped += 1;
            }
        }
    }

    Ok(skipped)
}

/// Scale and centre a single page inside A4
pub fn normalize_page(
    doc: &mut Document,
    page_id: ObjectId,
) -> Result<NormalizeOutcome, PdfPressError> {
    inherit_attributes(doc, page_id)?;

    let page_box = match page_media_box(doc, page_id) {
        Some(b) => b,
        None => return Ok(NormalizeOutcome::Skipped),
    };
    let fit = match fit_to_a4(&page_box) {
        Some(fit) => fit,
        None => return Ok(NormalizeOutcome::Skipped),
    };

    let existing = content_references(doc, page_id)?;

    let prefix = format!("q\n{}\n", fit.to_cm());
    let prefix_id = doc.add_object(Stream::new(Dictionary::new(), prefix.into_bytes()));
    let suffix_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(prefix_id));
    contents.extend(existing);
    contents.push(Object::Reference(suffix_id));

    let page = page_dict_mut(doc, page_id)?;
    page.set("Contents", Object::Array(contents));
    page.set("MediaBox", a4_box());
    page.set("CropBox", a4_box());
    for name in STALE_BOXES {
        page.remove(name);
    }

    Ok(NormalizeOutcome::Transformed(fit))
}

fn a4_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(A4_WIDTH_PT as f32),
        Object::Real(A4_HEIGHT_PT as f32),
    ])
}

/// Read a page's MediaBox, following /Parent for inherited values
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> Option<PageBox> {
    let obj = find_inherited(doc, page_id, b"MediaBox")?;
    let arr = resolve(doc, &obj).as_array().ok()?.clone();
    if arr.len() != 4 {
        return None;
    }
    let nums: Vec<f64> = arr
        .iter()
        .map(|o| as_f64(resolve(doc, o)))
        .collect::<Option<_>>()?;
    Some(PageBox::new(nums[0], nums[1], nums[2], nums[3]))
}

fn as_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Look up `key` on the page, then on each ancestor
fn find_inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    // Bounded walk guards against cyclic /Parent chains
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Copy inherited page attributes onto the page itself
fn inherit_attributes(doc: &mut Document, page_id: ObjectId) -> Result<(), PdfPressError> {
    let mut inherited = Vec::new();
    {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| PdfPressError::OperationError(format!("Invalid page: {}", e)))?;
        for key in INHERITABLE {
            if page.has(key) {
                continue;
            }
            if let Some(value) = find_inherited(doc, page_id, key) {
                inherited.push((key.to_vec(), value));
            }
        }
    }

    let page = page_dict_mut(doc, page_id)?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

/// The page's content streams as a list of objects (usually references)
fn content_references(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, PdfPressError> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| PdfPressError::OperationError(format!("Invalid page: {}", e)))?;

    Ok(match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            // An indirect array of streams
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    })
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, PdfPressError> {
    doc.get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| PdfPressError::OperationError(format!("Invalid page: {}", e)))
}
