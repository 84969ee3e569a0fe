//! Versioned binary form of a [`ClipboardSnapshot`], stored as `<id>.data`.
//!
//! ```text
//! header   "CRCB" | version:u8
//! v1       repeat until EOF { tag:u8 | len:u32 le | bytes }
//! v2, v3   count:u8 | count x { tag:u8 | len:u64 le | bytes }
//!          | blake3(all previous bytes):32
//! ```
//!
//! v1 and v2 store a file list as paths joined by `\n`. v3 frames each path
//! as `len:u32 le | utf8`.
//!
//! Only v3 is written. v1 and v2 stay decodable for blobs written by older
//! builds. Unknown field tags inside a known version are skipped.

use cr_core::clipboard::{frame_file_list, ClipFormat, ClipboardSnapshot};
use thiserror::Error;

pub const MAGIC: &[u8; 4] = b"CRCB";
pub const VERSION_V1: u8 = 1;
pub const VERSION_V2: u8 = 2;
pub const VERSION_V3: u8 = 3;
pub const CURRENT_VERSION: u8 = VERSION_V3;

const HEADER_LEN: usize = MAGIC.len() + 1;
const CHECKSUM_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlobDecodeError {
    #[error("blob shorter than header")]
    MissingHeader,

    #[error("bad magic bytes")]
    BadMagic,

    #[error("unsupported blob version {0}")]
    UnknownVersion(u8),

    #[error("blob truncated while reading {0}")]
    Truncated(&'static str),

    #[error("blob checksum mismatch")]
    ChecksumMismatch,

    #[error("field {0} is not valid UTF-8")]
    InvalidUtf8(ClipFormat),
}

/// How a version stores the file list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileListLayout {
    NewlineJoined,
    LengthFramed,
}

pub fn encode(snapshot: &ClipboardSnapshot) -> Vec<u8> {
    let fields: Vec<(u8, Vec<u8>)> = snapshot
        .formats()
        .into_iter()
        .filter_map(|f| field_bytes(snapshot, f).map(|bytes| (f.tag(), bytes)))
        .collect();

    let body_len: usize = fields.iter().map(|(_, b)| 1 + 8 + b.len()).sum();
    let mut buf = Vec::with_capacity(HEADER_LEN + 1 + body_len + CHECKSUM_LEN);
    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    // At most one field per format, so the count always fits.
    buf.push(fields.len() as u8);
    for (tag, bytes) in &fields {
        buf.push(*tag);
        buf.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
        buf.extend_from_slice(bytes);
    }
    let checksum = blake3::hash(&buf);
    buf.extend_from_slice(checksum.as_bytes());
    buf
}

pub fn decode(data: &[u8]) -> Result<ClipboardSnapshot, BlobDecodeError> {
    if data.len() < HEADER_LEN {
        return Err(BlobDecodeError::MissingHeader);
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(BlobDecodeError::BadMagic);
    }

    let (fields, layout) = match data[MAGIC.len()] {
        VERSION_V1 => (decode_v1(&data[HEADER_LEN..])?, FileListLayout::NewlineJoined),
        VERSION_V2 => (decode_checksummed(data)?, FileListLayout::NewlineJoined),
        VERSION_V3 => (decode_checksummed(data)?, FileListLayout::LengthFramed),
        other => return Err(BlobDecodeError::UnknownVersion(other)),
    };

    let mut snapshot = ClipboardSnapshot::empty();
    for (tag, bytes) in fields {
        let Some(format) = ClipFormat::from_tag(tag) else {
            continue;
        };
        apply_field(&mut snapshot, format, bytes, layout)?;
    }
    Ok(snapshot)
}

fn field_bytes(snapshot: &ClipboardSnapshot, format: ClipFormat) -> Option<Vec<u8>> {
    match format {
        ClipFormat::FileList => snapshot.files.as_deref().map(frame_file_list),
        other => snapshot.payload_bytes(other),
    }
}

fn decode_v1(mut body: &[u8]) -> Result<Vec<(u8, Vec<u8>)>, BlobDecodeError> {
    let mut fields = Vec::new();
    while !body.is_empty() {
        let tag = take(&mut body, 1, "v1 tag")?[0];
        let len = u32::from_le_bytes(to_array(take(&mut body, 4, "v1 length")?)) as usize;
        let bytes = take(&mut body, len, "v1 payload")?;
        fields.push((tag, bytes.to_vec()));
    }
    Ok(fields)
}

/// Shared frame of v2 and v3.
fn decode_checksummed(data: &[u8]) -> Result<Vec<(u8, Vec<u8>)>, BlobDecodeError> {
    if data.len() < HEADER_LEN + 1 + CHECKSUM_LEN {
        return Err(BlobDecodeError::Truncated("v2 field count"));
    }
    let (signed, checksum) = data.split_at(data.len() - CHECKSUM_LEN);
    if blake3::hash(signed).as_bytes() != checksum {
        return Err(BlobDecodeError::ChecksumMismatch);
    }

    let mut body = &signed[HEADER_LEN..];
    let count = take(&mut body, 1, "v2 field count")?[0];
    let mut fields = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let tag = take(&mut body, 1, "v2 tag")?[0];
        let len = u64::from_le_bytes(to_array(take(&mut body, 8, "v2 length")?));
        let len = usize::try_from(len).map_err(|_| BlobDecodeError::Truncated("v2 payload"))?;
        let bytes = take(&mut body, len, "v2 payload")?;
        fields.push((tag, bytes.to_vec()));
    }
    Ok(fields)
}

fn take<'a>(
    buf: &mut &'a [u8],
    n: usize,
    what: &'static str,
) -> Result<&'a [u8], BlobDecodeError> {
    if buf.len() < n {
        return Err(BlobDecodeError::Truncated(what));
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

fn to_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

fn apply_field(
    snapshot: &mut ClipboardSnapshot,
    format: ClipFormat,
    bytes: Vec<u8>,
    layout: FileListLayout,
) -> Result<(), BlobDecodeError> {
    let utf8 = |bytes: Vec<u8>| {
        String::from_utf8(bytes).map_err(|_| BlobDecodeError::InvalidUtf8(format))
    };
    match format {
        ClipFormat::PlainText => snapshot.text = Some(utf8(bytes)?),
        ClipFormat::RichText => snapshot.rich_text = Some(utf8(bytes)?),
        ClipFormat::Pdf => snapshot.pdf = Some(bytes),
        ClipFormat::Image => snapshot.image = Some(bytes),
        ClipFormat::FileList => {
            snapshot.files = Some(match layout {
                FileListLayout::NewlineJoined => {
                    utf8(bytes)?.split('\n').map(str::to_string).collect()
                }
                FileListLayout::LengthFramed => unframe_file_list(&bytes)?,
            });
        }
    }
    Ok(())
}

fn unframe_file_list(mut body: &[u8]) -> Result<Vec<String>, BlobDecodeError> {
    let mut files = Vec::new();
    while !body.is_empty() {
        let len = u32::from_le_bytes(to_array(take(&mut body, 4, "file path length")?)) as usize;
        let path = take(&mut body, len, "file path")?;
        let path = String::from_utf8(path.to_vec())
            .map_err(|_| BlobDecodeError::InvalidUtf8(ClipFormat::FileList))?;
        files.push(path);
    }
    Ok(files)
}
