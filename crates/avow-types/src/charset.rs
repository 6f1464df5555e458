//! Text charsets and line splitting.
//!
//! Decoding is strict: a byte sequence that is invalid for the requested
//! charset is reported with the offset of the first bad byte, never replaced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// A text encoding used to turn file bytes into lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Charset {
    /// UTF-8 (the default).
    #[default]
    #[serde(rename = "UTF-8")]
    Utf8,
    /// UTF-16 with an optional byte order mark; big-endian when there is none.
    /// Encodes big-endian with a mark.
    #[serde(rename = "UTF-16")]
    Utf16,
    /// UTF-16, big-endian, no byte order mark.
    #[serde(rename = "UTF-16BE")]
    Utf16Be,
    /// UTF-16, little-endian, no byte order mark.
    #[serde(rename = "UTF-16LE")]
    Utf16Le,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    #[serde(rename = "ISO-8859-1")]
    Latin1,
    /// 7-bit US-ASCII.
    #[serde(rename = "US-ASCII")]
    Ascii,
}

impl Charset {
    /// Resolve a charset from its canonical name or a common alias.
    ///
    /// Matching is case-insensitive and treats `_` like `-`.
    pub fn from_name(name: &str) -> TypeResult<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace('_', "-");
        match normalized.as_str() {
            "UTF-8" | "UTF8" => Ok(Self::Utf8),
            "UTF-16" | "UTF16" => Ok(Self::Utf16),
            "UTF-16BE" | "UTF16BE" => Ok(Self::Utf16Be),
            "UTF-16LE" | "UTF16LE" => Ok(Self::Utf16Le),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Ok(Self::Latin1),
            "US-ASCII" | "ASCII" => Ok(Self::Ascii),
            _ => Err(TypeError::UnknownCharset(name.to_string())),
        }
    }

    /// The canonical name of this charset.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16 => "UTF-16",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
            Self::Latin1 => "ISO-8859-1",
            Self::Ascii => "US-ASCII",
        }
    }

    /// Decode bytes into text.
    pub fn decode(&self, bytes: &[u8]) -> TypeResult<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| TypeError::MalformedInput {
                    charset: *self,
                    offset: e.valid_up_to(),
                }),
            Self::Utf16 => match bytes {
                [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, true, *self, 2),
                [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, false, *self, 2),
                _ => decode_utf16(bytes, true, *self, 0),
            },
            Self::Utf16Be => decode_utf16(bytes, true, *self, 0),
            Self::Utf16Le => decode_utf16(bytes, false, *self, 0),
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(TypeError::MalformedInput {
                    charset: *self,
                    offset,
                }),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }

    /// Encode text into bytes.
    pub fn encode(&self, text: &str) -> TypeResult<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Utf16 => Ok(BIG_ENDIAN_BOM
                .into_iter()
                .chain(text.encode_utf16().flat_map(u16::to_be_bytes))
                .collect()),
            Self::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Self::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Self::Latin1 | Self::Ascii => {
                let limit = if *self == Self::Latin1 { 0xFF } else { 0x7F };
                text.char_indices()
                    .map(|(offset, c)| {
                        u8::try_from(u32::from(c))
                            .ok()
                            .filter(|&b| u32::from(b) <= limit)
                            .ok_or(TypeError::Unmappable {
                                charset: *self,
                                offset,
                            })
                    })
                    .collect()
            }
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

const BIG_ENDIAN_BOM: [u8; 2] = [0xFE, 0xFF];

/// Decode UTF-16 code units. `skipped` is the number of bytes already
/// consumed by a byte order mark, so reported offsets stay absolute.
fn decode_utf16(
    bytes: &[u8],
    big_endian: bool,
    charset: Charset,
    skipped: usize,
) -> TypeResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(TypeError::MalformedInput {
            charset,
            offset: skipped + bytes.len() - 1,
        });
    }
    let units = bytes.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });

    let mut text = String::with_capacity(bytes.len() / 2);
    let mut offset = skipped;
    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(c) => {
                offset += c.len_utf16() * 2;
                text.push(c);
            }
            Err(_) => return Err(TypeError::MalformedInput { charset, offset }),
        }
    }
    Ok(text)
}

/// Split text into lines on `\n`.
///
/// No normalisation happens: a `\r` before the `\n` stays part of the line.
/// A single trailing `\n` terminates the last line rather than starting an
/// empty one, and empty text has no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n').map(str::to_owned).collect()
}
