// selection.rs — The user-chosen image and its upload-eligibility rules.
//
// The backend rejects anything that is not a JPG/JPEG/PNG under 5 MiB, so we
// enforce the same rules client-side and never send a doomed upload.

use thiserror::Error;

/// File extensions the captioning backend accepts (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Upload size limit in bytes (5 MiB, matching the backend's limit).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// A validated image selection, ready for upload.
///
/// Constructed via [`Selection::new`], which is the single place the
/// extension allow-set and size limit are enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Device-local resource locator as reported by the picker.
    pub uri: String,
    /// Original file name, used to derive the extension.
    pub file_name: String,
    /// Lowercased extension, guaranteed to be in [`ALLOWED_EXTENSIONS`].
    pub extension: String,
    /// Size in bytes as reported by the file-metadata capability.
    pub byte_size: u64,
}

/// Why a picked image was refused. Surfaced verbatim to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Invalid file type. Only JPG, JPEG, and PNG are allowed.")]
    UnsupportedType,
    #[error("File size exceeds the 5MB limit.")]
    TooLarge { byte_size: u64 },
}

impl Selection {
    /// Validate a picked image. Fails before any upload is attempted; the
    /// caller surfaces the error and keeps whatever selection it already had.
    pub fn new(
        uri: impl Into<String>,
        file_name: impl Into<String>,
        byte_size: u64,
    ) -> Result<Self, SelectionError> {
        let file_name = file_name.into();
        let extension = extension_of(&file_name)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or(SelectionError::UnsupportedType)?;
        if byte_size > MAX_UPLOAD_BYTES {
            return Err(SelectionError::TooLarge { byte_size });
        }
        Ok(Self {
            uri: uri.into(),
            file_name,
            extension,
            byte_size,
        })
    }
}

/// Lowercased extension of `file_name`, or `None` if it has no dot.
fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
