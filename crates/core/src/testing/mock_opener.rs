//! Mock magnet opener for testing.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::opener::{MagnetOpener, OpenError};

/// Mock implementation of [`MagnetOpener`] that records every magnet.
#[derive(Debug, Default)]
pub struct MockOpener {
    opened: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `magnet` when it is opened.
    pub fn fail_on(&self, magnet: &str) {
        self.failing.lock().unwrap().insert(magnet.to_string());
    }

    /// Magnets opened successfully, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl MagnetOpener for MockOpener {
    fn name(&self) -> &str {
        "mock"
    }

    fn open_magnet(&self, magnet: &str) -> Result<(), OpenError> {
        if self.failing.lock().unwrap().contains(magnet) {
            return Err(OpenError::Launch(format!("mock rejected {}", magnet)));
        }
        self.opened.lock().unwrap().push(magnet.to_string());
        Ok(())
    }
}
