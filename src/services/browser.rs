use crate::error::Result;

/// Opens an article link somewhere outside the TUI.
pub trait LinkOpener: Send {
    fn open(&mut self, url: &str) -> Result<()>;
}

/// Hands links to the desktop's default browser.
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&mut self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(anyhow::anyhow!("article has no link").into());
        }
        open::that_detached(url)?;
        tracing::debug!("Opened {} in browser", url);
        Ok(())
    }
}
