//! Caller-side transcoding between file bytes and `String`
//!
//! The engine hands back exact bytes plus an encoding tag. This module turns
//! them into text and back, using a configurable 8-bit code page for
//! `System` content.

use crate::error::WatchError;
use encoding_rs::{UTF_16LE, WINDOWS_1252};
use overseer_core::{Encoding, TextFileError};

/// Converts between text and the bytes of a given [`Encoding`]
#[derive(Debug, Clone, Copy)]
pub struct TextCodec {
    system: &'static encoding_rs::Encoding,
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::new(WINDOWS_1252)
    }
}

impl TextCodec {
    pub fn new(system: &'static encoding_rs::Encoding) -> Self {
        Self { system }
    }

    /// Codec whose `System` code page is named by a WHATWG label
    /// (`windows-1252`, `euc-kr`, `shift_jis`, ...)
    pub fn from_label(label: &str) -> Result<Self, WatchError> {
        encoding_rs::Encoding::for_label(label.trim().as_bytes())
            .map(Self::new)
            .ok_or_else(|| WatchError::UnknownCodePage(label.to_string()))
    }

    /// Code page used for `System` content
    pub fn system(&self) -> &'static encoding_rs::Encoding {
        self.system
    }

    /// Decode post-BOM bytes; malformed input is replaced, never rejected
    pub fn decode(&self, bytes: &[u8], encoding: Encoding) -> String {
        match encoding {
            Encoding::Utf8 | Encoding::Utf8NoBom => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Utf16Le => UTF_16LE.decode_without_bom_handling(bytes).0.into_owned(),
            Encoding::System | Encoding::Unknown => {
                self.system.decode_without_bom_handling(bytes).0.into_owned()
            }
        }
    }

    /// Encode `text` as payload bytes (without BOM) for `encoding`.
    ///
    /// Fails with [`TextFileError::Unmappable`] when a character has no
    /// representation in the `System` code page.
    pub fn encode(&self, text: &str, encoding: Encoding) -> Result<Vec<u8>, TextFileError> {
        match encoding {
            Encoding::Utf8 | Encoding::Utf8NoBom => Ok(text.as_bytes().to_vec()),
            Encoding::Utf16Le => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(bytes)
            }
            Encoding::System | Encoding::Unknown => {
                let (bytes, _, had_errors) = self.system.encode(text);
                if had_errors {
                    return Err(self.unmappable(text));
                }
                Ok(bytes.into_owned())
            }
        }
    }

    fn unmappable(&self, text: &str) -> TextFileError {
        let mut buf = [0u8; 4];
        let ch = text
            .chars()
            .find(|ch| self.system.encode(ch.encode_utf8(&mut buf)).2)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        TextFileError::Unmappable {
            ch,
            target: self.system.name().to_string(),
        }
    }
}
