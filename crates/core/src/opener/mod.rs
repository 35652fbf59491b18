//! Magnet hand-off to an external download client.

mod system;

pub use system::SystemOpener;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("failed to open magnet link: {0}")]
    Launch(String),
}

/// Receives emitted magnets. The core expects nothing back beyond success.
pub trait MagnetOpener: Send + Sync {
    /// Opener name for logging.
    fn name(&self) -> &str;

    fn open_magnet(&self, magnet: &str) -> Result<(), OpenError>;
}
