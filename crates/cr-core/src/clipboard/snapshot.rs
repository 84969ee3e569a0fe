use super::{ClipFormat, ContentHash};

/// One capture of every supported clipboard format at a single instant.
///
/// 单次剪贴板快照：在同一时刻读取到的所有受支持格式。
///
/// Only formats actually present are `Some`. A snapshot with no formats is a
/// valid value meaning "nothing to capture".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    pub text: Option<String>,
    pub rich_text: Option<String>,
    pub pdf: Option<Vec<u8>>,
    /// Encoded image bytes (PNG when captured by the platform adapter).
    pub image: Option<Vec<u8>>,
    pub files: Option<Vec<String>>,
}

impl ClipboardSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_rich_text(mut self, rtf: impl Into<String>) -> Self {
        self.rich_text = Some(rtf.into());
        self
    }

    pub fn with_pdf(mut self, pdf: Vec<u8>) -> Self {
        self.pdf = Some(pdf);
        self
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn has(&self, format: ClipFormat) -> bool {
        match format {
            ClipFormat::PlainText => self.text.is_some(),
            ClipFormat::RichText => self.rich_text.is_some(),
            ClipFormat::Image => self.image.is_some(),
            ClipFormat::Pdf => self.pdf.is_some(),
            ClipFormat::FileList => self.files.is_some(),
        }
    }

    /// Present formats in precedence order.
    pub fn formats(&self) -> Vec<ClipFormat> {
        ClipFormat::ALL
            .into_iter()
            .filter(|f| self.has(*f))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.formats().is_empty()
    }

    /// Display precedence: text > rich text > image > PDF > file list.
    /// An empty snapshot reports plain text.
    pub fn primary_type(&self) -> ClipFormat {
        self.formats()
            .first()
            .copied()
            .unwrap_or(ClipFormat::PlainText)
    }

    /// Raw bytes of one format, as written to the blob and fed to the hash.
    pub fn payload_bytes(&self, format: ClipFormat) -> Option<Vec<u8>> {
        match format {
            ClipFormat::PlainText => self.text.as_ref().map(|s| s.as_bytes().to_vec()),
            ClipFormat::RichText => self.rich_text.as_ref().map(|s| s.as_bytes().to_vec()),
            ClipFormat::Image => self.image.clone(),
            ClipFormat::Pdf => self.pdf.clone(),
            ClipFormat::FileList => self.files.as_deref().map(frame_file_list),
        }
    }

    pub fn total_size_bytes(&self) -> usize {
        self.text.as_ref().map_or(0, String::len)
            + self.rich_text.as_ref().map_or(0, String::len)
            + self.pdf.as_ref().map_or(0, Vec::len)
            + self.image.as_ref().map_or(0, Vec::len)
            + self
                .files
                .as_ref()
                .map_or(0, |f| f.iter().map(String::len).sum())
    }

    /// Hash over every payload plus the set of present formats.
    ///
    /// Each field is framed as `tag | len(u64 le) | bytes` so adjacent fields
    /// cannot alias each other.
    pub fn content_hash(&self) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"cliprecall.content.v1");

        let mut format_mask = 0u8;
        for format in self.formats() {
            format_mask |= 1 << format.tag();
        }
        hasher.update(&[format_mask]);

        for format in self.formats() {
            if let Some(bytes) = self.payload_bytes(format) {
                hasher.update(&[format.tag()]);
                hasher.update(&(bytes.len() as u64).to_le_bytes());
                hasher.update(&bytes);
            }
        }

        ContentHash::blake3(*hasher.finalize().as_bytes())
    }
}

/// `len:u32 le | utf8` per path. Paths may contain any character, `\n`
/// included, so they are never joined with a separator.
pub fn frame_file_list(files: &[String]) -> Vec<u8> {
    let mut out = Vec::with_capacity(files.iter().map(|f| 4 + f.len()).sum());
    for file in files {
        out.extend_from_slice(&(file.len() as u32).to_le_bytes());
        out.extend_from_slice(file.as_bytes());
    }
    out
}
