//! Opens magnets with the operating system's default handler.

use tracing::debug;

use super::{MagnetOpener, OpenError};

/// Hands magnets to `xdg-open` / `open` / `start` via the `open` crate.
#[derive(Debug, Clone, Default)]
pub struct SystemOpener;

impl SystemOpener {
    pub fn new() -> Self {
        Self
    }
}

impl MagnetOpener for SystemOpener {
    fn name(&self) -> &str {
        "system"
    }

    fn open_magnet(&self, magnet: &str) -> Result<(), OpenError> {
        if !magnet.starts_with("magnet:") {
            return Err(OpenError::Launch(format!(
                "refusing to open non-magnet link '{}'",
                magnet.chars().take(60).collect::<String>()
            )));
        }
        debug!("Opening magnet with system handler");
        open::that_detached(magnet).map_err(|e| OpenError::Launch(e.to_string()))
    }
}
