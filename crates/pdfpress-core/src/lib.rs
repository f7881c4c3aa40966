//! Permission locking and A4 assembly of PDFs and images
//!
//! Two independent tools share this crate:
//! - `lock`: re-save a PDF with AES-256 encryption and a restricted
//!   permission set
//! - `assemble`: turn an ordered list of images and PDFs into a single
//!   PDF whose pages are all A4 portrait
//!
//! `file_list` and `project` hold the ordered input list and its saved form.

pub mod assemble;
pub mod error;
pub mod file_list;
pub mod geometry;
pub mod image_page;
pub mod lock;
pub mod merge;
pub mod normalize;
pub mod output;
pub mod permissions;
pub mod project;
pub mod report;

#[cfg(test)]
mod testing;

pub use assemble::{assemble_a4, write_a4_pdf, AssembleOptions, Assembled};
pub use error::PdfPressError;
pub use file_list::{parse_selection, FileList};
pub use image_page::{ImageEncoding, ImageOptions};
pub use lock::{lock_document, lock_file, LockOptions};
pub use merge::merge_documents;
pub use permissions::{Permission, PermissionSet};
pub use report::{LockReport, MergeReport, SkippedSource};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, PdfPressError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| PdfPressError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

/// Parse range string like "1-3, 5, 8-10" into sorted unique numbers
pub fn parse_ranges(input: &str) -> Result<Vec<u32>, PdfPressError> {
    collect_ranges(input, None)
}

/// Like [`parse_ranges`], rejecting any number above `max` before a range
/// is expanded
pub fn parse_ranges_up_to(input: &str, max: u32) -> Result<Vec<u32>, PdfPressError> {
    collect_ranges(input, Some(max))
}

fn collect_ranges(input: &str, max: Option<u32>) -> Result<Vec<u32>, PdfPressError> {
    use std::collections::BTreeSet;

    let check = |n: u32| match max {
        Some(max) if n > max => Err(PdfPressError::InvalidRange(format!(
            "{} is out of range (1-{})",
            n, max
        ))),
        _ => Ok(n),
    };

    let mut numbers = BTreeSet::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            // Range like "1-3"
            let start: u32 = start
                .trim()
                .parse()
                .map_err(|_| PdfPressError::InvalidRange(format!("Invalid start: {}", start)))?;
            let end: u32 = end
                .trim()
                .parse()
                .map_err(|_| PdfPressError::InvalidRange(format!("Invalid end: {}", end)))?;

            let end = check(end)?;

            if start > end {
                return Err(PdfPressError::InvalidRange(format!(
                    "Start {} > end {}",
                    start, end
                )));
            }

            numbers.extend(start..=end);
        } else {
            // Single entry like "5"
            let n: u32 = part
                .parse()
                .map_err(|_| PdfPressError::InvalidRange(format!("Invalid entry: {}", part)))?;
            numbers.insert(check(n)?);
        }
    }

    Ok(numbers.into_iter().collect())
}
