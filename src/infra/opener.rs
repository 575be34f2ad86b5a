use anyhow::{Context, Result};

use crate::infra::contracts::ExternalOpener;

/// Opens links in the default browser and copies them with the system clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopOpener;

impl ExternalOpener for DesktopOpener {
    fn open(&self, target: &str) -> Result<()> {
        open::that_detached(target).with_context(|| format!("failed to open {target}"))
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("clipboard is not available")?;
        clipboard
            .set_text(text.to_owned())
            .context("failed to write to clipboard")
    }
}
