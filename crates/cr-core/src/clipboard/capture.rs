use tracing::{debug, warn};

use super::{ClipFormat, ClipboardSnapshot};
use crate::ports::{FormatPayload, SystemClipboardPort};

/// Image payloads above this size are dropped from a snapshot.
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// What a capture is allowed to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePolicy {
    pub store_types: Vec<ClipFormat>,
    pub image_size_ceiling: usize,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            store_types: ClipFormat::ALL.to_vec(),
            image_size_ceiling: MAX_IMAGE_BYTES,
        }
    }
}

impl CapturePolicy {
    pub fn with_store_types(store_types: Vec<ClipFormat>) -> Self {
        Self {
            store_types,
            ..Self::default()
        }
    }
}

/// Read every advertised, allowed format from the clipboard into one snapshot.
///
/// Never fails: a format that cannot be read, is empty, or is over the size
/// ceiling is left out. When nothing usable is present the snapshot is empty.
/// Does not write to the clipboard.
pub fn capture_snapshot(
    clipboard: &dyn SystemClipboardPort,
    policy: &CapturePolicy,
) -> ClipboardSnapshot {
    let advertised = match clipboard.available_formats() {
        Ok(formats) => formats,
        Err(err) => {
            warn!(error = %err, "Failed to list clipboard formats");
            return ClipboardSnapshot::empty();
        }
    };

    let mut snapshot = ClipboardSnapshot::empty();
    for format in ClipFormat::ALL {
        if !advertised.contains(&format) || !policy.store_types.contains(&format) {
            continue;
        }

        let payload = match clipboard.read_format(format) {
            Ok(Some(payload)) => payload,
            Ok(None) => continue,
            Err(err) => {
                warn!(format = %format, error = %err, "Failed to read clipboard format, omitting");
                continue;
            }
        };

        apply_payload(&mut snapshot, format, payload, policy);
    }

    debug!(
        formats = snapshot.formats().len(),
        total_size_bytes = snapshot.total_size_bytes(),
        "Captured clipboard snapshot"
    );
    snapshot
}

fn apply_payload(
    snapshot: &mut ClipboardSnapshot,
    format: ClipFormat,
    payload: FormatPayload,
    policy: &CapturePolicy,
) {
    match (format, payload) {
        (ClipFormat::PlainText, FormatPayload::Text(text)) if !text.is_empty() => {
            snapshot.text = Some(text);
        }
        (ClipFormat::RichText, FormatPayload::Text(rtf)) if !rtf.is_empty() => {
            snapshot.rich_text = Some(rtf);
        }
        (ClipFormat::Pdf, FormatPayload::Bytes(pdf)) if !pdf.is_empty() => {
            snapshot.pdf = Some(pdf);
        }
        (ClipFormat::Image, FormatPayload::Bytes(image)) if !image.is_empty() => {
            if image.len() > policy.image_size_ceiling {
                warn!(
                    size_bytes = image.len(),
                    ceiling_bytes = policy.image_size_ceiling,
                    "Image payload over size ceiling, omitting"
                );
                return;
            }
            snapshot.image = Some(image);
        }
        (ClipFormat::FileList, FormatPayload::Files(files)) => {
            let files: Vec<String> = files.into_iter().filter(|f| !f.is_empty()).collect();
            if !files.is_empty() {
                snapshot.files = Some(files);
            }
        }
        (format, _) => {
            debug!(format = %format, "Clipboard payload empty or of unexpected shape, omitting");
        }
    }
}
