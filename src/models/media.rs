//! Media entries for the admin editor.
//!
//! An editable media list mixes items that already live in object storage
//! (addressed by URL) with files staged during the current editing session
//! (payload held locally until save). The engine operating on these types
//! lives in `services::media_list`.

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

/// A file staged in the editor, held fully in memory until save.
#[derive(Clone, Debug, PartialEq)]
pub struct StagedFile {
    pub file_name: String,

    /// MIME type, e.g. `image/png`. Staging rejects anything that is not
    /// `image/*`; video staging bypasses the media list entirely.
    pub content_type: String,

    pub bytes: Bytes,
}

impl StagedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Inline `data:` URI of the payload, used as the preview URL until the
    /// file is uploaded and has a real storage URL.
    pub fn preview_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// One slot in an editable ordered media list.
///
/// Invariants:
/// - `is_new == true` implies `file` is `Some` (the payload is held locally
///   and `url` is a `data:` preview);
/// - `is_new == false` implies `file` is `None` and `url` is remote.
#[derive(Clone, Debug)]
pub struct MediaEntry {
    pub url: String,

    /// Raw payload for staged entries; `None` once persisted.
    pub file: Option<StagedFile>,

    /// Staged in this editing session, not yet uploaded.
    pub is_new: bool,

    /// Soft-delete flag for persisted entries. Removed entries stay in the
    /// backing list so the save can tell the server to detach them.
    pub is_removed: bool,
}

impl MediaEntry {
    /// An already-persisted entry addressed by its storage URL.
    pub fn existing(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file: None,
            is_new: false,
            is_removed: false,
        }
    }

    /// A freshly staged entry; the preview URL is derived from the payload.
    pub fn staged(file: StagedFile) -> Self {
        Self {
            url: file.preview_data_uri(),
            file: Some(file),
            is_new: true,
            is_removed: false,
        }
    }
}

/// What a save submits for a media list: stable keys of retained existing
/// items in display order, and the raw files to upload. The server appends
/// uploads after the keyed items, so key order alone fixes the final order.
#[derive(Clone, Debug, Default)]
pub struct SavePayload {
    pub existing_keys: Vec<String>,
    pub new_files: Vec<StagedFile>,
}
