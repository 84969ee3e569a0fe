use anyhow::{anyhow, Result};
use clipboard_rs::common::RustImage;
use clipboard_rs::{Clipboard, ClipboardContent, ClipboardContext, ContentFormat, RustImageData};
use cr_core::clipboard::{frame_file_list, ClipFormat, ClipboardSnapshot};
use cr_core::ports::FormatPayload;

/// Pasteboard type name of PDF data.
#[cfg(target_os = "macos")]
pub const PDF_FORMAT: &str = "com.adobe.pdf";
#[cfg(target_os = "windows")]
pub const PDF_FORMAT: &str = "Portable Document Format";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const PDF_FORMAT: &str = "application/pdf";

/// clipboard-rs plumbing shared by every desktop platform.
pub struct CommonClipboardImpl;

fn map_clipboard_err<T>(
    result: std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>,
) -> Result<T> {
    result.map_err(|e| anyhow!(e))
}

impl CommonClipboardImpl {
    pub fn available_formats(ctx: &ClipboardContext) -> Result<Vec<ClipFormat>> {
        let raw = map_clipboard_err(ctx.available_formats())?;

        let mut formats = Vec::new();
        if ctx.has(ContentFormat::Text) {
            formats.push(ClipFormat::PlainText);
        }
        if ctx.has(ContentFormat::Rtf) {
            formats.push(ClipFormat::RichText);
        }
        if ctx.has(ContentFormat::Image) {
            formats.push(ClipFormat::Image);
        }
        if raw.iter().any(|f| f == PDF_FORMAT) {
            formats.push(ClipFormat::Pdf);
        }
        if ctx.has(ContentFormat::Files) {
            formats.push(ClipFormat::FileList);
        }
        Ok(formats)
    }

    pub fn read_format(
        ctx: &ClipboardContext,
        format: ClipFormat,
    ) -> Result<Option<FormatPayload>> {
        let payload = match format {
            ClipFormat::PlainText => FormatPayload::Text(map_clipboard_err(ctx.get_text())?),
            ClipFormat::RichText => {
                FormatPayload::Text(map_clipboard_err(ctx.get_rich_text())?)
            }
            ClipFormat::Pdf => {
                FormatPayload::Bytes(map_clipboard_err(ctx.get_buffer(PDF_FORMAT))?)
            }
            ClipFormat::Image => {
                let image = map_clipboard_err(ctx.get_image())?;
                let png = map_clipboard_err(image.to_png())?;
                FormatPayload::Bytes(png.get_bytes().to_vec())
            }
            ClipFormat::FileList => FormatPayload::Files(map_clipboard_err(ctx.get_files())?),
        };
        Ok(Some(payload))
    }

    /// Replace the clipboard with every format present in `snapshot`, in one
    /// write so readers never see a partial set.
    pub fn write_snapshot(ctx: &ClipboardContext, snapshot: &ClipboardSnapshot) -> Result<()> {
        let mut contents = Vec::new();

        if let Some(text) = &snapshot.text {
            contents.push(ClipboardContent::Text(text.clone()));
        }
        if let Some(rtf) = &snapshot.rich_text {
            contents.push(ClipboardContent::Rtf(rtf.clone()));
        }
        if let Some(image) = &snapshot.image {
            let image = RustImageData::from_bytes(image).map_err(|e| anyhow!(e))?;
            contents.push(ClipboardContent::Image(image));
        }
        if let Some(pdf) = &snapshot.pdf {
            contents.push(ClipboardContent::Other(PDF_FORMAT.to_string(), pdf.clone()));
        }
        if let Some(files) = &snapshot.files {
            contents.push(ClipboardContent::Files(files.clone()));
        }

        map_clipboard_err(ctx.clear())?;
        if contents.is_empty() {
            return Ok(());
        }
        map_clipboard_err(ctx.set(contents))
    }

    /// Stable digest of what the clipboard holds, for platforms without a
    /// native change counter.
    pub fn fingerprint(ctx: &ClipboardContext) -> Result<[u8; 32]> {
        let format_names = map_clipboard_err(ctx.available_formats())?;
        let image = if ctx.has(ContentFormat::Image) {
            raw_image_bytes(ctx, &format_names)
        } else {
            None
        };
        let pdf = if format_names.iter().any(|f| f == PDF_FORMAT) {
            ctx.get_buffer(PDF_FORMAT).ok()
        } else {
            None
        };
        let rich_text = if ctx.has(ContentFormat::Rtf) {
            ctx.get_rich_text().ok()
        } else {
            None
        };

        let source = FingerprintSource {
            text: ctx.get_text().ok(),
            rich_text,
            pdf,
            image,
            files: ctx.get_files().ok(),
            format_names,
        };
        Ok(source.digest())
    }
}

/// Image bytes as offered by the owner, without re-encoding. Falls back to a
/// PNG encode when no raw image target can be read.
fn raw_image_bytes(ctx: &ClipboardContext, format_names: &[String]) -> Option<Vec<u8>> {
    let raw = format_names
        .iter()
        .filter(|name| name.starts_with("image/"))
        .find_map(|name| ctx.get_buffer(name).ok());
    if raw.is_some() {
        return raw;
    }
    let image = ctx.get_image().ok()?;
    let png = image.to_png().ok()?;
    Some(png.get_bytes().to_vec())
}

/// Everything a fingerprint covers, read from the clipboard in one pass.
#[derive(Debug, Default, Clone)]
pub struct FingerprintSource {
    pub format_names: Vec<String>,
    pub text: Option<String>,
    pub rich_text: Option<String>,
    pub pdf: Option<Vec<u8>>,
    pub image: Option<Vec<u8>>,
    pub files: Option<Vec<String>>,
}

impl FingerprintSource {
    /// blake3 over every field, each framed as `tag | len(u64 le) | bytes`.
    /// Format names are sorted first so offer order does not matter.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"cliprecall.fingerprint.v1");

        let mut names: Vec<&str> = self.format_names.iter().map(String::as_str).collect();
        names.sort_unstable();
        for name in names {
            update_field(&mut hasher, b'n', Some(name.as_bytes()));
        }

        let files = self.files.as_deref().map(frame_file_list);
        update_field(&mut hasher, b't', self.text.as_ref().map(String::as_bytes));
        update_field(&mut hasher, b'r', self.rich_text.as_ref().map(String::as_bytes));
        update_field(&mut hasher, b'p', self.pdf.as_deref());
        update_field(&mut hasher, b'i', self.image.as_deref());
        update_field(&mut hasher, b'f', files.as_deref());
        *hasher.finalize().as_bytes()
    }
}

fn update_field(hasher: &mut blake3::Hasher, tag: u8, bytes: Option<&[u8]>) {
    let Some(bytes) = bytes else {
        return;
    };
    hasher.update(&[tag]);
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
