use std::path::Path;

use avow_digest::DEFAULT_BUFFER_SIZE;
use avow_types::Charset;
use serde::{Deserialize, Serialize};

use crate::error::{AssertError, AssertResult};

/// Tunables for file and stream assertions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertConfig {
    /// Read buffer size used when streaming content through a digest.
    pub read_buffer_size: usize,
    /// When a text comparison hits bytes that are invalid in the charset,
    /// compare the raw bytes instead.
    pub binary_fallback_on_malformed: bool,
    /// Cap on the number of line deltas listed in a failure message.
    /// `None` lists them all.
    pub max_reported_deltas: Option<usize>,
    /// Charset used by the fluent facade when none is given.
    pub default_charset: Charset,
}

impl Default for AssertConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            binary_fallback_on_malformed: true,
            max_reported_deltas: None,
            default_charset: Charset::Utf8,
        }
    }
}

impl AssertConfig {
    /// Parse a TOML document. Missing keys take their default.
    pub fn from_toml_str(source: &str) -> AssertResult<Self> {
        toml::from_str(source)
            .map_err(|e| AssertError::Config(format!("invalid assertion configuration: {e}")))
    }

    /// Load a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> AssertResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            AssertError::io(
                format!("Unable to read configuration file:<{}>", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&source)
    }
}
