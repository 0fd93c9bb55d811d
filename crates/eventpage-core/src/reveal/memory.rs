//! In-memory reveal host.
//!
//! Stands in for a rendered document: an ordered list of reveal-eligible
//! element ids, a set of ids carrying the revealed style, and a recording
//! watcher. Every watcher created by the host writes to one shared log so
//! the log outlives the observer that owns the watcher.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::host::{RevealHost, Watcher};
use super::options::RevealOptions;
use crate::error::RevealError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", content = "target", rename_all = "lowercase")]
pub enum WatcherCall {
    Observe(String),
    Unobserve(String),
    Disconnect,
}

#[derive(Debug, Default)]
struct WatchLog {
    observed: BTreeSet<String>,
    calls: Vec<WatcherCall>,
}

pub struct MemoryWatcher {
    log: Rc<RefCell<WatchLog>>,
}

impl Watcher<String> for MemoryWatcher {
    fn observe(&mut self, target: &String) {
        let mut log = self.log.borrow_mut();
        log.observed.insert(target.clone());
        log.calls.push(WatcherCall::Observe(target.clone()));
    }

    fn unobserve(&mut self, target: &String) {
        let mut log = self.log.borrow_mut();
        log.observed.remove(target);
        log.calls.push(WatcherCall::Unobserve(target.clone()));
    }

    fn disconnect(&mut self) {
        let mut log = self.log.borrow_mut();
        log.observed.clear();
        log.calls.push(WatcherCall::Disconnect);
    }
}

#[derive(Default)]
pub struct MemoryHost {
    elements: Vec<String>,
    revealed: HashSet<String>,
    unsupported: bool,
    watchers_created: usize,
    log: Rc<RefCell<WatchLog>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host without an intersection facility.
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    /// Append an eligible element; duplicates are ignored.
    pub fn add_element(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.elements.contains(&id) {
            self.elements.push(id);
        }
    }

    pub fn remove_element(&mut self, id: &str) {
        self.elements.retain(|e| e != id);
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Revealed elements in document order.
    pub fn revealed_elements(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter(|e| self.revealed.contains(*e))
            .cloned()
            .collect()
    }

    pub fn is_observed(&self, id: &str) -> bool {
        self.log.borrow().observed.contains(id)
    }

    pub fn observed(&self) -> Vec<String> {
        self.log.borrow().observed.iter().cloned().collect()
    }

    pub fn calls(&self) -> Vec<WatcherCall> {
        self.log.borrow().calls.clone()
    }

    pub fn observe_count(&self, id: &str) -> usize {
        self.count_calls(|c| matches!(c, WatcherCall::Observe(t) if t == id))
    }

    pub fn unobserve_count(&self, id: &str) -> usize {
        self.count_calls(|c| matches!(c, WatcherCall::Unobserve(t) if t == id))
    }

    pub fn watchers_created(&self) -> usize {
        self.watchers_created
    }

    fn count_calls(&self, pred: impl Fn(&WatcherCall) -> bool) -> usize {
        self.log.borrow().calls.iter().filter(|c| pred(c)).count()
    }
}

impl RevealHost for MemoryHost {
    type Element = String;
    type Watcher = MemoryWatcher;

    fn create_watcher(&mut self, _options: &RevealOptions) -> Result<MemoryWatcher, RevealError> {
        if self.unsupported {
            return Err(RevealError::EnvironmentUnsupported);
        }
        self.watchers_created += 1;
        Ok(MemoryWatcher {
            log: Rc::clone(&self.log),
        })
    }

    fn eligible_elements(&self) -> Vec<String> {
        self.elements.clone()
    }

    fn is_revealed(&self, element: &String) -> bool {
        self.revealed.contains(element)
    }

    fn apply_reveal(&mut self, element: &String) {
        self.revealed.insert(element.clone());
    }
}
