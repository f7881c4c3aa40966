//! Lock a PDF by re-saving it with restricted permissions
//!
//! Uses the standard security handler with AES-256 (V5, revision 6). The
//! default options leave both passwords empty, so the document still opens
//! without a prompt while conforming readers honour the permission bits.
//!
//! A user password without an owner password gets a random owner password,
//! otherwise the empty owner password would open the file with full rights.

use crate::error::PdfPressError;
use crate::output::{has_extension, read_file, write_atomically};
use crate::permissions::PermissionSet;
use crate::report::LockReport;
use lopdf::encryption::crypt_filters::{Aes256CryptFilter, CryptFilter};
use lopdf::{Document, EncryptionState, EncryptionVersion, Object, StringFormat};
use rand::Rng as _;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Document types `lock_file` accepts
pub const ACCEPTED_DOCUMENTS: &[&str] = &[".pdf"];

const CRYPT_FILTER_NAME: &[u8] = b"StdCF";

#[derive(Debug, Clone, Default)]
pub struct LockOptions {
    pub permissions: PermissionSet,
    pub owner_password: String,
    pub user_password: String,
}

impl LockOptions {
    /// Owner password to encrypt with; random when only a user password is set
    fn effective_owner_password(&self) -> String {
        if !self.owner_password.is_empty() || self.user_password.is_empty() {
            return self.owner_password.clone();
        }
        let mut secret = [0u8; 32];
        rand::rng().fill(&mut secret);
        secret.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Encrypt `pdf_bytes` with the given permissions and return the new file
pub fn lock_document(pdf_bytes: &[u8], options: &LockOptions) -> Result<Vec<u8>, PdfPressError> {
    let mut doc =
        Document::load_mem(pdf_bytes).map_err(|e| PdfPressError::ParseError(e.to_string()))?;
    lock_loaded(&mut doc, options)?;

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| PdfPressError::OperationError(format!("Failed to save locked PDF: {}", e)))?;
    Ok(output)
}

/// Drop the protection of a document lopdf decrypted on load.
///
/// lopdf decrypts with the empty user password and keeps the state; an
/// /Encrypt entry without one needs a password we don't have.
pub(crate) fn strip_encryption(doc: &mut Document) -> Result<(), PdfPressError> {
    if doc.is_encrypted() && doc.encryption_state.is_none() {
        return Err(PdfPressError::ParseError(
            "Document is protected by a user password".into(),
        ));
    }
    if let Ok(Object::Reference(id)) = doc.trailer.get(b"Encrypt") {
        let id = *id;
        doc.objects.remove(&id);
    }
    doc.trailer.remove(b"Encrypt");
    doc.encryption_state = None;
    Ok(())
}

fn lock_loaded(doc: &mut Document, options: &LockOptions) -> Result<(), PdfPressError> {
    strip_encryption(doc)?;
    ensure_file_id(doc);

    let mut rng = rand::rng();
    let mut file_encryption_key = [0u8; 32];
    rng.fill(&mut file_encryption_key);

    let owner_password = options.effective_owner_password();
    let crypt_filter: Arc<dyn CryptFilter> = Arc::new(Aes256CryptFilter);
    let version = EncryptionVersion::V5 {
        encrypt_metadata: true,
        crypt_filters: BTreeMap::from([(CRYPT_FILTER_NAME.to_vec(), crypt_filter)]),
        file_encryption_key: &file_encryption_key,
        stream_filter: CRYPT_FILTER_NAME.to_vec(),
        string_filter: CRYPT_FILTER_NAME.to_vec(),
        owner_password: &owner_password,
        user_password: &options.user_password,
        permissions: options.permissions.to_lopdf(),
    };

    let state = EncryptionState::try_from(version)
        .map_err(|e| PdfPressError::Encryption(e.to_string()))?;
    doc.encrypt(&state)
        .map_err(|e| PdfPressError::Encryption(e.to_string()))?;

    debug!(
        permissions = options.permissions.to_lopdf().bits(),
        "applied AES-256 encryption"
    );
    Ok(())
}

/// The trailer /ID is required by several readers for encrypted files
fn ensure_file_id(doc: &mut Document) {
    if doc.trailer.get(b"ID").is_ok() {
        return;
    }
    let mut rng = rand::rng();
    let mut id = [0u8; 16];
    rng.fill(&mut id);
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.to_vec(), StringFormat::Hexadecimal),
            Object::String(id.to_vec(), StringFormat::Hexadecimal),
        ]),
    );
}

/// Validate that `path` is a document type we can lock
pub fn check_accepted(path: &Path) -> Result<(), PdfPressError> {
    let accepted = ACCEPTED_DOCUMENTS
        .iter()
        .any(|ext| has_extension(path, ext.trim_start_matches('.')));
    if accepted {
        Ok(())
    } else {
        Err(PdfPressError::UnsupportedFile {
            path: path.to_path_buf(),
            accepted: ACCEPTED_DOCUMENTS.join(", "),
        })
    }
}

/// Lock the PDF at `input`, writing to `output` or overwriting `input`
pub fn lock_file(
    input: &Path,
    output: Option<&Path>,
    options: &LockOptions,
) -> Result<LockReport, PdfPressError> {
    check_accepted(input)?;

    let bytes = read_file(input)?;
    let mut doc =
        Document::load_mem(&bytes).map_err(|e| PdfPressError::ParseError(e.to_string()))?;
    let page_count = doc.get_pages().len() as u32;

    lock_loaded(&mut doc, options)?;

    let mut locked = Vec::new();
    doc.save_to(&mut locked)
        .map_err(|e| PdfPressError::OperationError(format!("Failed to save locked PDF: {}", e)))?;

    let target = output.unwrap_or(input);
    write_atomically(target, &locked)?;

    info!(
        input = %input.display(),
        output = %target.display(),
        pages = page_count,
        "document locked"
    );

    Ok(LockReport {
        input: input.to_path_buf(),
        output: target.to_path_buf(),
        overwritten: output.is_none() || output == Some(input),
        permissions_blocked: options.permissions.blocked().collect(),
        permissions_allowed: options.permissions.allowed().collect(),
        input_size_bytes: bytes.len(),
        output_size_bytes: locked.len(),
        page_count,
    })
}
