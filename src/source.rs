//! The text being typed out, read once at startup.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSource {
    text: String,
}

impl TextSource {
    /// Read the whole file. Invalid UTF-8 is replaced with U+FFFD; nothing
    /// else about the content is changed.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        if bytes.is_empty() {
            bail!("{} is empty", path.display());
        }
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "{} is not valid UTF-8, replacing invalid sequences",
                    path.display()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(TextSource { text })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        TextSource { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
