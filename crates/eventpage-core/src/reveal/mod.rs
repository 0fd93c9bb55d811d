mod host;
pub mod memory;
mod observer;
mod options;

pub use host::{IntersectionEntry, RevealHost, Watcher};
pub use memory::{MemoryHost, WatcherCall};
pub use observer::{reveal_all_immediately, RevealObserver, RevealState};
pub use options::{
    MarginLength, MarginUnit, RevealOptions, RootMargin, DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLD,
};
