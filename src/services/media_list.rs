//! Ordered media list for the admin editor.
//!
//! Mixes already-uploaded items (addressed by storage URL) with files
//! staged in the current editing session, supports drag reordering and
//! removal, and on save partitions the visible order into stable storage
//! keys plus raw uploads. Every operation here is synchronous over
//! in-memory state; only the eventual submission does I/O, and only the
//! presentation layer touches display state.

use crate::models::media::{MediaEntry, SavePayload, StagedFile};
use bytes::Bytes;
use futures::future::join_all;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tracing::warn;

/// Fixed "No Image" sentinel graphic. Never treated as real content:
/// filtered from every projection and never serialized on save.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iMTAwIiBoZWlnaHQ9IjEwMCIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj48cmVjdCB3aWR0aD0iMTAwIiBoZWlnaHQ9IjEwMCIgZmlsbD0iI2Y1ZjVmNSIvPjx0ZXh0IHg9IjUwJSIgeT0iNTAlIiBmb250LWZhbWlseT0iQXJpYWwiIGZvbnQtc2l6ZT0iMTQiIGZpbGw9IiM5OTk5OTkiIHRleHQtYW5jaG9yPSJtaWRkbGUiIGR5PSIuM2VtIj5ObyBJbWFnZTwvdGV4dD48L3N2Zz4=";

/// An ordered, editable list of media entries.
///
/// Removed entries are kept in the backing list (soft delete) but are
/// always re-appended after the visible entries on reorder, so ordering
/// operations never have to account for them.
#[derive(Clone, Debug, Default)]
pub struct MediaList {
    entries: Vec<MediaEntry>,
}

impl MediaList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the list from a loaded entity's gallery.
    ///
    /// Duplicate URLs are inserted once (exact string match); the
    /// placeholder sentinel and empty URLs are dropped. `legacy_image` is
    /// the single-image field from before the gallery existed and is
    /// consulted only when `images` is empty.
    pub fn from_entity(images: &[String], legacy_image: Option<&str>) -> Self {
        let mut list = Self::new();
        let mut seen: HashSet<String> = HashSet::new();

        if !images.is_empty() {
            for url in images {
                if is_real_image_url(url) && seen.insert(url.clone()) {
                    list.entries.push(MediaEntry::existing(url.clone()));
                }
            }
        } else if let Some(url) = legacy_image {
            if is_real_image_url(url) && seen.insert(url.to_string()) {
                list.entries.push(MediaEntry::existing(url));
            }
        }

        list
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn backing_len(&self) -> usize {
        self.entries.len()
    }

    /// Append a staged file to the end of the list.
    ///
    /// Non-image files are skipped with a warning; the caller's batch is
    /// never aborted. Returns whether the file was accepted.
    pub fn stage(&mut self, file: StagedFile) -> bool {
        if !file.is_image() {
            warn!("skipping non-image file `{}` ({})", file.file_name, file.content_type);
            return false;
        }
        self.entries.push(MediaEntry::staged(file));
        true
    }

    /// Stage a batch, preserving its order. Returns how many were accepted.
    pub fn stage_all(&mut self, files: impl IntoIterator<Item = StagedFile>) -> usize {
        let mut accepted = 0;
        for file in files {
            if self.stage(file) {
                accepted += 1;
            }
        }
        accepted
    }

    /// The entries shown to the user, in display order: not removed, not
    /// empty, not the placeholder sentinel. This is the only projection
    /// reordering and removal operate on, and the only one serialized.
    pub fn visible(&self) -> Vec<&MediaEntry> {
        self.entries.iter().filter(|e| is_visible(e)).collect()
    }

    pub fn visible_len(&self) -> usize {
        self.entries.iter().filter(|e| is_visible(e)).count()
    }

    fn visible_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| is_visible(e))
            .map(|(i, _)| i)
            .collect()
    }

    /// Move the visible entry at `from` to position `to`.
    ///
    /// Indices are positions in the visible projection. The backing list is
    /// rebuilt as the reordered visible entries followed by the removed
    /// ones in their original relative order, so removed entries never
    /// interleave with visible ones and never shift their positions.
    /// Out-of-range indices and `from == to` are no-ops.
    pub fn reorder(&mut self, from: usize, to: usize) {
        let mut order = self.visible_indices();
        if from == to || from >= order.len() || to >= order.len() {
            return;
        }
        let moved = order.remove(from);
        order.insert(to, moved);

        let removed: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_removed)
            .map(|(i, _)| i)
            .collect();

        let mut slots: Vec<Option<MediaEntry>> =
            std::mem::take(&mut self.entries).into_iter().map(Some).collect();
        for index in order.into_iter().chain(removed) {
            if let Some(entry) = slots[index].take() {
                self.entries.push(entry);
            }
        }
    }

    /// Remove the visible entry at `index`.
    ///
    /// Staged entries are dropped outright; persisted entries are flagged
    /// removed and kept so the save can tell the server to detach them.
    /// User confirmation is the caller's concern. Returns whether an entry
    /// was removed.
    pub fn remove_at(&mut self, index: usize) -> bool {
        let indices = self.visible_indices();
        let Some(&backing) = indices.get(index) else {
            return false;
        };
        if self.entries[backing].is_new {
            self.entries.remove(backing);
        } else {
            self.entries[backing].is_removed = true;
        }
        true
    }

    /// Partition the visible order for submission.
    ///
    /// Existing entries contribute their stable storage key, in display
    /// order; staged entries contribute their payload. An existing entry
    /// whose URL yields no key is omitted rather than failing the save.
    pub fn build_save_payload(&self, markers: &[String]) -> SavePayload {
        let mut payload = SavePayload::default();
        for entry in self.visible() {
            let is_new = entry.is_new || (entry.url.starts_with("data:image/") && entry.file.is_some());
            if is_new {
                if let Some(file) = &entry.file {
                    payload.new_files.push(file.clone());
                }
            } else if let Some(key) = extract_storage_key(&entry.url, markers) {
                payload.existing_keys.push(key);
            } else {
                warn!("no storage key derivable from `{}`; dropping from save", entry.url);
            }
        }
        payload
    }
}

fn is_visible(entry: &MediaEntry) -> bool {
    !entry.is_removed && is_real_image_url(&entry.url)
}

/// Whether a URL refers to real content: non-empty and not the placeholder
/// sentinel (any inline SVG counts as the sentinel family).
fn is_real_image_url(url: &str) -> bool {
    let trimmed = url.trim();
    !trimmed.is_empty() && trimmed != PLACEHOLDER_IMAGE && !trimmed.contains("data:image/svg+xml")
}

/// Derive the bucket-relative storage key from a media URL.
///
/// Decodes percent-escapes, strips query text (after `?` or a literal
/// `%3F` left by double encoding), then locates the first path segment
/// containing one of `markers` and returns everything after it — skipping
/// one repeated marker segment, a quirk of the storage provider's URL
/// shape. When no marker is present, falls back to the last two path
/// segments (directory + filename). Inputs without an `http(s)://` scheme
/// are assumed to be keys already and returned unchanged; empty input
/// yields `None`.
pub fn extract_storage_key(url: &str, markers: &[String]) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Some(url.to_string());
    }

    let decoded = percent_decode(url);
    let without_query = decoded.split('?').next().unwrap_or(&decoded);
    let without_query = without_query.split("%3F").next().unwrap_or(without_query);
    let parts: Vec<&str> = without_query.split('/').collect();

    let marker_hit = |segment: &str| markers.iter().any(|m| segment.contains(m.as_str()));
    if let Some(bucket_index) = parts.iter().position(|p| marker_hit(p)) {
        let mut start = bucket_index + 1;
        if start < parts.len() && marker_hit(parts[start]) {
            start += 1;
        }
        if start < parts.len() {
            return Some(parts[start..].join("/"));
        }
    }

    if parts.len() >= 2 {
        return Some(parts[parts.len() - 2..].join("/"));
    }
    None
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let h1 = bytes[i + 1] as char;
            let h2 = bytes[i + 2] as char;
            if let (Some(a), Some(b)) = (h1.to_digit(16), h2.to_digit(16)) {
                out.push(((a << 4) + b) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_string()
}

/// Read files from disk into staged form, preserving submission order.
///
/// Unreadable files and files without a recognized media extension are
/// skipped with a warning; the rest of the batch is unaffected.
pub async fn read_staged_files(paths: &[PathBuf]) -> Vec<StagedFile> {
    let reads = join_all(paths.iter().map(tokio::fs::read)).await;

    let mut staged = Vec::new();
    for (path, result) in paths.iter().zip(reads) {
        let bytes = match result {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                warn!("could not read `{}`: {}", path.display(), err);
                continue;
            }
        };
        let Some(content_type) = media_content_type(path) else {
            warn!("skipping `{}`: unrecognized media extension", path.display());
            continue;
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        staged.push(StagedFile::new(file_name, content_type, bytes));
    }
    staged
}

/// MIME type by extension for the media kinds the editor accepts.
fn media_content_type(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => return None,
    };
    Some(content_type.to_string())
}
