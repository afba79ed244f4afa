//! Encoding model: byte order marks, BOM detection and UTF-8 sniffing
//!
//! Four on-disk encodings are distinguished. Only `Utf8` and `Utf16Le`
//! carry a byte order mark; `Utf8NoBom` is a read-side classification
//! produced by [`Utf8Policy::classify`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::str::FromStr;
use thiserror::Error;

/// UTF-8 byte order mark
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// UTF-16 little-endian byte order mark
pub const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Line terminator for 8-bit encodings (CR LF)
pub const NEWLINE_8BIT: [u8; 2] = [0x0D, 0x0A];

/// Line terminator for UTF-16LE (CR LF as two code units)
pub const NEWLINE_UTF16LE: [u8; 4] = [0x0D, 0x00, 0x0A, 0x00];

/// Number of leading bytes inspected when sniffing for BOM-less UTF-8
pub const UTF8_SNIFF_LIMIT: usize = 0x800;

/// Text encoding of a file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// Not yet resolved; written like `System`
    #[serde(rename = "auto")]
    Unknown,
    /// Platform 8-bit code page (ANSI)
    #[default]
    #[serde(rename = "system", alias = "ansi")]
    System,
    /// UTF-8 with a byte order mark
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-8 detected without a byte order mark
    #[serde(rename = "utf-8-no-bom")]
    Utf8NoBom,
    /// UTF-16 little-endian with a byte order mark
    #[serde(rename = "utf-16le")]
    Utf16Le,
}

/// Selector order. Position in this table is the ordinal shown to users.
const ORDINAL_TABLE: [Encoding; 5] = [
    Encoding::Unknown,
    Encoding::System,
    Encoding::Utf8,
    Encoding::Utf8NoBom,
    Encoding::Utf16Le,
];

impl Encoding {
    /// All encodings in ordinal order
    pub const ALL: [Encoding; 5] = ORDINAL_TABLE;

    /// Stable selector ordinal: Auto(0), ANSI(1), UTF-8(2), UTF-8 no BOM(3), UTF-16LE(4)
    pub fn ordinal(self) -> usize {
        match self {
            Encoding::Unknown => 0,
            Encoding::System => 1,
            Encoding::Utf8 => 2,
            Encoding::Utf8NoBom => 3,
            Encoding::Utf16Le => 4,
        }
    }

    /// Inverse of [`Encoding::ordinal`]
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        ORDINAL_TABLE.get(ordinal).copied()
    }

    /// Byte order mark written in front of content (empty for 8-bit encodings)
    pub fn bom(self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => &UTF8_BOM,
            Encoding::Utf16Le => &UTF16LE_BOM,
            _ => &[],
        }
    }

    /// Newline sequence appended by line writes
    pub fn newline(self) -> &'static [u8] {
        match self {
            Encoding::Utf16Le => &NEWLINE_UTF16LE,
            _ => &NEWLINE_8BIT,
        }
    }

    /// Width of one code unit in bytes
    pub fn code_unit_width(self) -> usize {
        match self {
            Encoding::Utf16Le => 2,
            _ => 1,
        }
    }

    /// `Unknown` collapses to `System`; everything else is unchanged
    pub fn normalized(self) -> Self {
        match self {
            Encoding::Unknown => Encoding::System,
            other => other,
        }
    }

    /// Whether the content is some flavour of UTF-8
    pub fn is_utf8(self) -> bool {
        matches!(self, Encoding::Utf8 | Encoding::Utf8NoBom)
    }

    /// Canonical lowercase label
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Unknown => "auto",
            Encoding::System => "system",
            Encoding::Utf8 => "utf-8",
            Encoding::Utf8NoBom => "utf-8-no-bom",
            Encoding::Utf16Le => "utf-16le",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when an encoding label is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown encoding '{0}' (expected auto, ansi, utf-8, utf-8-no-bom or utf-16le)")]
pub struct ParseEncodingError(pub String);

impl FromStr for Encoding {
    type Err = ParseEncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "auto" | "unknown" => Ok(Encoding::Unknown),
            "system" | "ansi" => Ok(Encoding::System),
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "utf-8-no-bom" | "utf8-no-bom" | "utf8nobom" => Ok(Encoding::Utf8NoBom),
            "utf-16le" | "utf16le" | "utf-16" | "utf16" => Ok(Encoding::Utf16Le),
            _ => Err(ParseEncodingError(s.to_string())),
        }
    }
}

/// Whether BOM-less content may be reclassified as UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Utf8Policy {
    /// Upgrade `System` to `Utf8NoBom` when the leading bytes are valid
    /// UTF-8 and contain at least one non-ASCII byte
    #[default]
    Detect,
    /// Never reclassify; BOM-less content stays `System`
    Ignore,
}

impl Utf8Policy {
    /// Classify BOM-less content from its leading bytes.
    ///
    /// `sample` should extend one byte past [`UTF8_SNIFF_LIMIT`] when the
    /// source is longer, so that a sequence cut by the limit is not
    /// mistaken for one cut by the end of the file.
    pub fn classify(self, sample: &[u8]) -> Encoding {
        match self {
            Utf8Policy::Detect if sniff_utf8(sample) => Encoding::Utf8NoBom,
            _ => Encoding::System,
        }
    }
}

/// Detect a byte order mark at the current stream position.
///
/// Reads at most three bytes. A recognised BOM is consumed; otherwise the
/// stream is rewound to where it started and `System` is returned.
pub fn detect_bom<R: Read + Seek>(stream: &mut R) -> io::Result<Encoding> {
    let start = stream.stream_position()?;
    let mut head = [0u8; 3];
    let read = read_up_to(stream, &mut head)?;

    if read >= 2 && head[..2] == UTF16LE_BOM {
        stream.seek(SeekFrom::Start(start + UTF16LE_BOM.len() as u64))?;
        return Ok(Encoding::Utf16Le);
    }
    if read == 3 && head == UTF8_BOM {
        return Ok(Encoding::Utf8);
    }

    stream.seek(SeekFrom::Start(start))?;
    Ok(Encoding::System)
}

/// Validate the sequences starting in the first `min(limit, len)` bytes
/// as UTF-8.
///
/// Encoded surrogates (`ED A0..` to `ED BF..`) and malformed continuation
/// bytes are rejected. A sequence straddling `limit` is checked against the
/// bytes that follow it; running out of input there is accepted only when
/// `limit` cut `bytes` short.
pub fn utf8_is_valid(bytes: &[u8], limit: Option<usize>) -> bool {
    let end = limit.map_or(bytes.len(), |limit| limit.min(bytes.len()));
    let truncated = end < bytes.len();

    let mut i = 0;
    while i < end {
        let lead = bytes[i];
        let extra = match lead {
            0x00..=0x7F => 0,
            0xC0..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF7 => 3,
            _ => return false,
        };

        // U+D800..U+DFFF re-encoded as UTF-8
        if lead == 0xED {
            if let Some(&next) = bytes.get(i + 1) {
                if next & 0xA0 == 0xA0 {
                    return false;
                }
            }
        }

        for offset in 1..=extra {
            match bytes.get(i + offset) {
                Some(&b) if b & 0xC0 == 0x80 => {}
                Some(_) => return false,
                None => return truncated,
            }
        }
        i += extra + 1;
    }
    true
}

/// True when `sample` looks like BOM-less UTF-8 rather than 8-bit text
pub fn sniff_utf8(sample: &[u8]) -> bool {
    let window = &sample[..sample.len().min(UTF8_SNIFF_LIMIT)];
    !window.is_ascii() && utf8_is_valid(sample, Some(UTF8_SNIFF_LIMIT))
}

fn read_up_to<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
