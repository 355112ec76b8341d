//! Identifier lookup under the cursor.

use tower_lsp::lsp_types::PositionEncodingKind;

/// Characters that make up a word, beyond ASCII letters, digits and `_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordChars {
    extra: &'static [char],
}

impl WordChars {
    /// Plain identifiers. Used for go-to-definition.
    pub const IDENTIFIER: WordChars = WordChars { extra: &[] };

    /// Identifiers plus the `@` self-reference marker. Used for hover.
    pub const HOVER: WordChars = WordChars { extra: &['@'] };

    pub const fn with_extra(extra: &'static [char]) -> Self {
        WordChars { extra }
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || self.extra.contains(&c)
    }
}

/// Unit the client counts `Position::character` in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionEncoding {
    /// UTF-16 code units, the LSP default
    #[default]
    Utf16,
    /// Unicode scalar values
    Utf32,
}

impl PositionEncoding {
    /// Prefer UTF-32 when the client offers it; otherwise the UTF-16 default.
    pub fn negotiate(offered: Option<&[PositionEncodingKind]>) -> Self {
        match offered {
            Some(kinds) if kinds.contains(&PositionEncodingKind::UTF32) => Self::Utf32,
            _ => Self::Utf16,
        }
    }

    pub fn kind(self) -> PositionEncodingKind {
        match self {
            Self::Utf16 => PositionEncodingKind::UTF16,
            Self::Utf32 => PositionEncodingKind::UTF32,
        }
    }

    /// Convert a client offset on `text` into a character index.
    ///
    /// An offset inside a surrogate pair lands on that character. Returns
    /// `None` for UTF-16 offsets past the end of the line.
    pub fn char_offset(self, text: &str, offset: u32) -> Option<u32> {
        match self {
            Self::Utf32 => Some(offset),
            Self::Utf16 => {
                let mut units = 0u32;
                for (index, c) in text.chars().enumerate() {
                    let next = units + c.len_utf16() as u32;
                    if offset < next {
                        return Some(index as u32);
                    }
                    units = next;
                }
                (offset == units).then(|| text.chars().count() as u32)
            }
        }
    }

    /// Length of `text` in client units.
    pub fn width(self, text: &str) -> u32 {
        match self {
            Self::Utf16 => text.encode_utf16().count() as u32,
            Self::Utf32 => text.chars().count() as u32,
        }
    }
}

/// Find the word touching `character` on `line`.
///
/// Positions count characters, not bytes. Returns `None` when the line does
/// not exist, the offset is past the end of the line, or the cursor sits
/// between two non-word characters.
pub fn word_at_position<S: AsRef<str>>(
    lines: &[S],
    line: u32,
    character: u32,
    word_chars: WordChars,
) -> Option<String> {
    let text = lines.get(line as usize)?.as_ref();
    let chars: Vec<char> = text.chars().collect();
    let col = character as usize;
    if col > chars.len() {
        return None;
    }

    let mut start = col;
    while start > 0 && word_chars.contains(chars[start - 1]) {
        start -= 1;
    }

    let mut end = col;
    while end < chars.len() && word_chars.contains(chars[end]) {
        end += 1;
    }

    if start == end {
        return None;
    }

    Some(chars[start..end].iter().collect())
}
