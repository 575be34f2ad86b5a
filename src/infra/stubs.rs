use std::cell::RefCell;

use anyhow::Result;

use crate::infra::{
    config::AppConfig,
    contracts::{ConfigAdapter, ExternalOpener},
};

#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

/// Records links instead of handing them to the desktop.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    pub opened: RefCell<Vec<String>>,
    pub copied: RefCell<Vec<String>>,
}

impl ExternalOpener for RecordingOpener {
    fn open(&self, target: &str) -> Result<()> {
        self.opened.borrow_mut().push(target.to_owned());
        Ok(())
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        self.copied.borrow_mut().push(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_config_returns_defaults() {
        let adapter = StubConfigAdapter;
        let config = adapter.load().expect("stub config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn recording_opener_keeps_targets() {
        let opener = RecordingOpener::default();

        opener.open("https://example.com").expect("open");
        opener.copy_to_clipboard("link").expect("copy");

        assert_eq!(*opener.opened.borrow(), vec!["https://example.com".to_owned()]);
        assert_eq!(*opener.copied.borrow(), vec!["link".to_owned()]);
    }
}
