//! Change events flowing from the producers to the synchronizer.

use tokio::time::Instant;

/// Which side detected the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A tracked file changed on disk
    LocalFile,
    /// An editor's value in the page differs from the cached value
    RemoteEditor,
}

/// "Something changed at this index", stamped at detection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    origin: Origin,
    timestamp: Instant,
    index: usize,
}

impl ChangeEvent {
    /// Create an event stamped with the current time.
    pub fn now(origin: Origin, index: usize) -> Self {
        Self::at(origin, index, Instant::now())
    }

    pub fn at(origin: Origin, index: usize, timestamp: Instant) -> Self {
        Self {
            origin,
            timestamp,
            index,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
