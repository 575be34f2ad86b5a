use std::time::Instant;

use anyhow::Result;

use crate::infra::config::AppConfig;

pub trait ConfigAdapter {
    fn load(&self) -> Result<AppConfig>;
}

/// Hands conversation links to the desktop.
pub trait ExternalOpener {
    fn open(&self, target: &str) -> Result<()>;
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

impl<T: ExternalOpener + ?Sized> ExternalOpener for &T {
    fn open(&self, target: &str) -> Result<()> {
        (*self).open(target)
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        (*self).copy_to_clipboard(text)
    }
}

/// Monotonic time source for reconnect and debounce deadlines.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Wall-clock milliseconds since the Unix epoch, stamped on pending messages.
    fn unix_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
