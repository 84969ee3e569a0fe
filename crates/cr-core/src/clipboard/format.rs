use serde::{Deserialize, Serialize};

/// Clipboard formats the engine understands.
///
/// 引擎支持的剪贴板格式。
///
/// Declaration order is display precedence: the first format present in a
/// snapshot is its primary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipFormat {
    PlainText,
    RichText,
    Image,
    Pdf,
    FileList,
}

impl ClipFormat {
    /// All formats in precedence order.
    pub const ALL: [ClipFormat; 5] = [
        ClipFormat::PlainText,
        ClipFormat::RichText,
        ClipFormat::Image,
        ClipFormat::Pdf,
        ClipFormat::FileList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClipFormat::PlainText => "plain_text",
            ClipFormat::RichText => "rich_text",
            ClipFormat::Image => "image",
            ClipFormat::Pdf => "pdf",
            ClipFormat::FileList => "file_list",
        }
    }

    /// Stable one-byte tag used by the blob codec and the content hash.
    pub fn tag(&self) -> u8 {
        match self {
            ClipFormat::PlainText => 1,
            ClipFormat::RichText => 2,
            ClipFormat::Pdf => 3,
            ClipFormat::Image => 4,
            ClipFormat::FileList => 5,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(ClipFormat::PlainText),
            2 => Some(ClipFormat::RichText),
            3 => Some(ClipFormat::Pdf),
            4 => Some(ClipFormat::Image),
            5 => Some(ClipFormat::FileList),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClipFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_follows_declaration_order() {
        let mut formats = vec![
            ClipFormat::FileList,
            ClipFormat::Pdf,
            ClipFormat::Image,
            ClipFormat::RichText,
            ClipFormat::PlainText,
        ];
        formats.sort();
        assert_eq!(formats, ClipFormat::ALL.to_vec());
    }

    #[test]
    fn tags_are_stable_and_reversible() {
        for format in ClipFormat::ALL {
            assert_eq!(ClipFormat::from_tag(format.tag()), Some(format));
        }
        assert_eq!(ClipFormat::from_tag(0), None);
        assert_eq!(ClipFormat::from_tag(42), None);
    }
}
