//! Build one A4 document from an ordered list of images and PDFs

use crate::error::PdfPressError;
use crate::image_page::{load_image_file, ImageOptions};
use crate::lock::strip_encryption;
use crate::merge::merge_documents;
use crate::normalize::normalize_document;
use crate::output::{has_extension, read_file, write_atomically};
use crate::report::{MergeReport, SkippedSource};
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Image types offered when picking inputs
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
}

impl SourceKind {
    /// `.pdf` is a PDF; anything else is handed to the image decoder
    pub fn of(path: &Path) -> Self {
        if has_extension(path, "pdf") {
            SourceKind::Pdf
        } else {
            SourceKind::Image
        }
    }
}

/// Whether `path` has an extension we expect to handle
pub fn is_supported(path: &Path) -> bool {
    has_extension(path, "pdf")
        || SUPPORTED_IMAGE_EXTENSIONS
            .iter()
            .any(|ext| has_extension(path, ext))
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssembleOptions {
    pub image: ImageOptions,
    /// Fail on the first unreadable input instead of skipping it
    pub strict: bool,
}

#[derive(Debug)]
pub struct Assembled {
    pub document: Document,
    pub report: MergeReport,
}

/// Load one input as an A4-normalised document
pub fn load_source(path: &Path, options: &ImageOptions) -> Result<(Document, u32), PdfPressError> {
    match SourceKind::of(path) {
        SourceKind::Pdf => {
            let bytes = read_file(path)?;
            let mut doc = Document::load_mem(&bytes)
                .map_err(|e| PdfPressError::ParseError(e.to_string()))?;
            strip_encryption(&mut doc)?;
            if doc.get_pages().is_empty() {
                return Err(PdfPressError::ParseError("PDF has no pages".into()));
            }
            let skipped = normalize_document(&mut doc)?;
            Ok((doc, skipped))
        }
        SourceKind::Image => Ok((load_image_file(path, options)?, 0)),
    }
}

/// Load, normalise and merge `paths` in order
pub fn assemble_a4<P: AsRef<Path>>(
    paths: &[P],
    options: &AssembleOptions,
) -> Result<Assembled, PdfPressError> {
    let started = Instant::now();
    let mut report = MergeReport::default();
    let mut documents = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match load_source(path, &options.image) {
            Ok((doc, not_normalized)) => {
                report.page_count += doc.get_pages().len() as u32;
                report.pages_not_normalized += not_normalized;
                report.sources.push(path.to_path_buf());
                documents.push(doc);
            }
            Err(e) if !options.strict => {
                warn!(path = %path.display(), error = %e, "skipping input");
                report.skipped.push(SkippedSource {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    if documents.is_empty() {
        return Err(PdfPressError::EmptyInput(format!(
            "{} input(s) given, none could be read",
            paths.len()
        )));
    }

    let document = merge_documents(documents)?;
    report.processing_time_ms = started.elapsed().as_millis() as u64;

    Ok(Assembled { document, report })
}

/// Assemble `paths` and write the result to `output`
pub fn write_a4_pdf<P: AsRef<Path>>(
    paths: &[P],
    output: &Path,
    options: &AssembleOptions,
) -> Result<MergeReport, PdfPressError> {
    let started = Instant::now();
    let Assembled {
        mut document,
        mut report,
    } = assemble_a4(paths, options)?;

    document.compress();
    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|e| PdfPressError::OperationError(format!("Failed to save PDF: {}", e)))?;
    write_atomically(output, &bytes)?;

    report.output = Some(output.to_path_buf());
    report.output_size_bytes = bytes.len();
    report.processing_time_ms = started.elapsed().as_millis() as u64;

    info!(
        output = %output.display(),
        pages = report.page_count,
        skipped = report.skipped.len(),
        "A4 PDF written"
    );
    Ok(report)
}

/// `dir/name`, adding a `.pdf` extension when missing
pub fn default_output_path(dir: &Path, name: &str) -> PathBuf {
    let mut path = dir.join(name);
    if !has_extension(&path, "pdf") {
        let mut with_ext = path.into_os_string();
        with_ext.push(".pdf");
        path = PathBuf::from(with_ext);
    }
    path
}
