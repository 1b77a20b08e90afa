//! Decoding of raw [name table] strings.
//!
//! The bytes of a name record are interpreted according to the record's
//! platform and encoding ids. Only the combinations listed in
//! [`NameEncoding::new`] are understood; anything else is reported as
//! [`DecodeError::UnsupportedEncoding`] so the caller can decide whether to
//! abort or skip the record.
//!
//! [name table]: https://learn.microsoft.com/en-us/typography/opentype/spec/name#platform-encoding-and-language-ids

use std::fmt;

use read_fonts::tables::name::MacRomanMapping;

/// The text encoding used by a name record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameEncoding {
    /// Big-endian UTF-16; a leading byte order mark is dropped.
    Utf16Be,
    /// The Macintosh Roman 8-bit charset.
    MacRoman,
    ShiftJis,
    Big5,
    EucKr,
    Gbk,
    /// The bytes are already text and are taken as-is.
    PassThrough,
}

impl NameEncoding {
    /// Select the encoding for a platform/encoding id pair.
    ///
    /// Returns `None` for pairs we don't know how to decode.
    pub fn new(platform_id: u16, encoding_id: u16) -> Option<Self> {
        match (platform_id, encoding_id) {
            (0, _) => Some(Self::Utf16Be),
            (1, 0) => Some(Self::MacRoman),
            (1, 1) => Some(Self::ShiftJis),
            (1, 2) => Some(Self::Big5),
            (1, 3) => Some(Self::EucKr),
            (1, 25) => Some(Self::Gbk),
            (2, _) => Some(Self::PassThrough),
            (3, 3) => Some(Self::Gbk),
            (3, 4) => Some(Self::Big5),
            (3, 5) => Some(Self::EucKr),
            (3, _) => Some(Self::Utf16Be),
            _ => None,
        }
    }

    /// Decode `bytes` into a string.
    ///
    /// Decoding is strict: input that would require a replacement character
    /// is an error.
    pub fn decode(self, bytes: &[u8]) -> Result<String, DecodeError> {
        let malformed = || DecodeError::MalformedBytes { encoding: self };
        match self {
            Self::Utf16Be => {
                let bytes = bytes.strip_prefix(&[0xFE, 0xFF]).unwrap_or(bytes);
                decode_strict(encoding_rs::UTF_16BE, bytes).ok_or_else(malformed)
            }
            Self::MacRoman => Ok(bytes.iter().map(|b| MacRomanMapping.decode(*b)).collect()),
            Self::ShiftJis => decode_strict(encoding_rs::SHIFT_JIS, bytes).ok_or_else(malformed),
            Self::Big5 => decode_strict(encoding_rs::BIG5, bytes).ok_or_else(malformed),
            Self::EucKr => decode_strict(encoding_rs::EUC_KR, bytes).ok_or_else(malformed),
            Self::Gbk => decode_strict(encoding_rs::GBK, bytes).ok_or_else(malformed),
            Self::PassThrough => String::from_utf8(bytes.to_vec()).map_err(|_| malformed()),
        }
    }
}

impl fmt::Display for NameEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Utf16Be => "UTF-16BE",
            Self::MacRoman => "Mac Roman",
            Self::ShiftJis => "Shift-JIS",
            Self::Big5 => "Big5",
            Self::EucKr => "EUC-KR",
            Self::Gbk => "GBK",
            Self::PassThrough => "pass-through",
        };
        f.write_str(name)
    }
}

fn decode_strict(encoding: &'static encoding_rs::Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|s| s.into_owned())
}

/// An error encountered while decoding a name record.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported platform ID {platform_id} and encoding ID {encoding_id}")]
    UnsupportedEncoding { platform_id: u16, encoding_id: u16 },
    #[error("bytes are not valid {encoding}")]
    MalformedBytes { encoding: NameEncoding },
}

/// Decode the raw bytes of a name record with the given platform and encoding ids.
pub fn decode_name(
    platform_id: u16,
    encoding_id: u16,
    bytes: &[u8],
) -> Result<String, DecodeError> {
    NameEncoding::new(platform_id, encoding_id)
        .ok_or(DecodeError::UnsupportedEncoding {
            platform_id,
            encoding_id,
        })?
        .decode(bytes)
}

/// Returns `false` for decoded names that can't be real names.
///
/// A null inside the decoded text almost always means the bytes were
/// decoded with the wrong encoding (e.g. UTF-16 data read as a single-byte
/// charset).
pub fn is_valid_name(name: &str) -> bool {
    !name.contains('\0')
}
