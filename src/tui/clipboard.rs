//! System clipboard access for copying code blocks.

use anyhow::{Context, Result};

/// Lazily opened system clipboard
///
/// The handle is kept once opened; on X11 the copied text only stays
/// available while its owner is alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().context("Failed to open clipboard")?,
        };
        self.inner
            .insert(clipboard)
            .set_text(text)
            .context("Failed to write clipboard")
    }
}
