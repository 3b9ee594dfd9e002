//! In-process exclusion for operations that rewrite the output directory.
//!
//! A pipeline run, a merge and a cleanup each hold the guard for their whole
//! duration. Acquisition never waits: a second caller is told the directory
//! is busy. Separate processes sharing one directory are not coordinated.

use std::sync::Arc;

use log::debug;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
pub struct DirectoryGuard {
    lock: Arc<Mutex<()>>,
}

/// Held while an operation owns the output directory. Released on drop.
#[derive(Debug)]
pub struct DirectoryLease {
    operation: &'static str,
    _guard: OwnedMutexGuard<()>,
}

impl DirectoryLease {
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl Drop for DirectoryLease {
    fn drop(&mut self) {
        debug!("Released output directory after {}", self.operation);
    }
}

impl DirectoryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the directory for `operation`, or `None` if another holds it.
    pub fn try_acquire(&self, operation: &'static str) -> Option<DirectoryLease> {
        let guard = Arc::clone(&self.lock).try_lock_owned().ok()?;
        debug!("Acquired output directory for {}", operation);
        Some(DirectoryLease {
            operation,
            _guard: guard,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}
