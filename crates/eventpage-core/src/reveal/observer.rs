//! Scroll-reveal observer.
//!
//! Per target:
//!
//! ```text
//! Pending --[ratio >= threshold]--> Revealed (terminal)
//! ```
//!
//! Per observer:
//!
//! ```text
//! Inactive --[activate]--> Active --[deactivate]--> Inactive
//! ```
//!
//! A target is unobserved the moment it is revealed, so a reveal fires at
//! most once even if the watcher keeps delivering entries for it. Ending
//! the session discards every target, pending or not.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::host::{IntersectionEntry, RevealHost, Watcher};
use super::options::RevealOptions;
use crate::error::RevealError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealState {
    Pending,
    Revealed,
}

struct ActiveSession<W, E> {
    watcher: W,
    options: RevealOptions,
    pending: HashSet<E>,
    revealed: HashSet<E>,
}

enum Session<W, E> {
    Inactive,
    Active(ActiveSession<W, E>),
}

/// Owns the single watcher of a host lifecycle and the targets it tracks.
pub struct RevealObserver<H: RevealHost> {
    session: Session<H::Watcher, H::Element>,
}

impl<H: RevealHost> Default for RevealObserver<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: RevealHost> RevealObserver<H> {
    pub fn new() -> Self {
        Self {
            session: Session::Inactive,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        matches!(self.session, Session::Active(_))
    }

    /// `None` for targets the current session does not track.
    pub fn state_of(&self, element: &H::Element) -> Option<RevealState> {
        let Session::Active(active) = &self.session else {
            return None;
        };
        if active.pending.contains(element) {
            Some(RevealState::Pending)
        } else if active.revealed.contains(element) {
            Some(RevealState::Revealed)
        } else {
            None
        }
    }

    pub fn pending_count(&self) -> usize {
        match &self.session {
            Session::Active(active) => active.pending.len(),
            Session::Inactive => 0,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create the session's watcher. A second activation is a no-op.
    pub fn activate(
        &mut self,
        host: &mut H,
        options: RevealOptions,
    ) -> Result<Option<Event>, RevealError> {
        if self.is_active() {
            tracing::debug!("reveal observer already active; ignoring activation");
            return Ok(None);
        }

        let watcher = host.create_watcher(&options)?;
        tracing::info!(
            threshold = options.threshold(),
            root_margin = %options.root_margin(),
            "reveal observer activated"
        );
        let event = Event::ObserverActivated {
            threshold: options.threshold(),
            root_margin: options.root_margin().to_string(),
            at: Utc::now(),
        };
        self.session = Session::Active(ActiveSession {
            watcher,
            options,
            pending: HashSet::new(),
            revealed: HashSet::new(),
        });
        Ok(Some(event))
    }

    /// Disconnect the watcher and drop every target. Safe in any state.
    pub fn deactivate(&mut self) -> Option<Event> {
        match std::mem::replace(&mut self.session, Session::Inactive) {
            Session::Active(mut active) => {
                active.watcher.disconnect();
                let abandoned = active.pending.len();
                tracing::info!(abandoned, "reveal observer deactivated");
                Some(Event::ObserverDeactivated {
                    abandoned,
                    at: Utc::now(),
                })
            }
            Session::Inactive => {
                tracing::debug!("reveal observer already inactive");
                None
            }
        }
    }

    /// Host "mounted" hook: activate, then observe every eligible element.
    ///
    /// Without an intersection facility the failure is logged and every
    /// eligible element is revealed at once, so content is never left
    /// hidden. Any other activation error is returned.
    pub fn mount(&mut self, host: &mut H, options: RevealOptions) -> Result<Vec<Event>, RevealError> {
        let mut events = Vec::new();
        match self.activate(host, options) {
            Ok(activated) => {
                events.extend(activated);
                self.register_all(host);
            }
            Err(RevealError::EnvironmentUnsupported) => {
                tracing::warn!("intersection observation unavailable; revealing all targets");
                let revealed = reveal_all_immediately(host);
                events.push(Event::RevealFallback {
                    reason: RevealError::EnvironmentUnsupported.to_string(),
                    revealed,
                    at: Utc::now(),
                });
            }
            Err(e) => return Err(e),
        }
        Ok(events)
    }

    /// Host "before unmount" hook.
    pub fn unmount(&mut self) -> Option<Event> {
        self.deactivate()
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Start observing one element. Returns false when it was skipped:
    /// inactive observer, already pending, or already revealed.
    pub fn register(&mut self, host: &H, element: H::Element) -> bool {
        let Session::Active(active) = &mut self.session else {
            return false;
        };
        if active.pending.contains(&element)
            || active.revealed.contains(&element)
            || host.is_revealed(&element)
        {
            tracing::debug!(target_id = %element, "skipping reveal registration");
            return false;
        }
        active.watcher.observe(&element);
        active.pending.insert(element);
        true
    }

    /// Observe every eligible element not yet pending or revealed.
    /// Safe to call again after the host's element set changes.
    pub fn register_all(&mut self, host: &H) -> usize {
        if !self.is_active() {
            tracing::debug!("register_all on inactive reveal observer");
            return 0;
        }
        let mut added = 0;
        for element in host.eligible_elements() {
            if self.register(host, element) {
                added += 1;
            }
        }
        added
    }

    // ── Intersection ─────────────────────────────────────────────────

    /// Reveal each pending target whose entry crosses the threshold, in
    /// delivery order. Entries arriving while inactive change nothing.
    pub fn on_intersection<I>(&mut self, host: &mut H, entries: I) -> Vec<Event>
    where
        I: IntoIterator<Item = IntersectionEntry<H::Element>>,
    {
        let Session::Active(active) = &mut self.session else {
            return Vec::new();
        };

        let threshold = active.options.threshold();
        let mut events = Vec::new();
        for entry in entries {
            if !entry.crosses(threshold) || !active.pending.remove(&entry.target) {
                continue;
            }
            host.apply_reveal(&entry.target);
            active.watcher.unobserve(&entry.target);
            tracing::debug!(target_id = %entry.target, ratio = entry.intersection_ratio, "target revealed");
            events.push(Event::TargetRevealed {
                target: entry.target.to_string(),
                at: Utc::now(),
            });
            active.revealed.insert(entry.target);
        }
        events
    }
}

impl<H: RevealHost> Drop for RevealObserver<H> {
    fn drop(&mut self) {
        if let Session::Active(active) = &mut self.session {
            active.watcher.disconnect();
        }
    }
}

/// Reveal every eligible element without observation.
pub fn reveal_all_immediately<H: RevealHost>(host: &mut H) -> usize {
    let mut count = 0;
    for element in host.eligible_elements() {
        if !host.is_revealed(&element) {
            host.apply_reveal(&element);
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::memory::{MemoryHost, WatcherCall};

    fn entry(id: &str, ratio: f64) -> IntersectionEntry<String> {
        IntersectionEntry::new(id.to_string(), ratio)
    }

    fn mounted(ids: &[&str]) -> (MemoryHost, RevealObserver<MemoryHost>) {
        let mut host = MemoryHost::new();
        for id in ids {
            host.add_element(*id);
        }
        let mut observer = RevealObserver::new();
        observer.mount(&mut host, RevealOptions::default()).unwrap();
        (host, observer)
    }

    #[test]
    fn mount_observes_eligible_elements() {
        let (host, observer) = mounted(&["hero", "rewards"]);
        assert!(observer.is_active());
        assert_eq!(observer.pending_count(), 2);
        assert!(host.is_observed("hero"));
        assert!(host.is_observed("rewards"));
    }

    #[test]
    fn double_activation_is_noop() {
        let (mut host, mut observer) = mounted(&["hero"]);
        let again = observer.activate(&mut host, RevealOptions::default()).unwrap();
        assert!(again.is_none());
        assert_eq!(host.watchers_created(), 1);
        assert_eq!(observer.pending_count(), 1);
    }

    #[test]
    fn reveal_fires_once_and_unobserves() {
        let (mut host, mut observer) = mounted(&["hero"]);
        observer.register_all(&host);

        let events = observer.on_intersection(&mut host, vec![entry("hero", 0.5), entry("hero", 0.9)]);
        assert_eq!(events.len(), 1);
        assert!(host.is_revealed(&"hero".to_string()));
        assert!(!host.is_observed("hero"));
        assert_eq!(host.unobserve_count("hero"), 1);
        assert_eq!(observer.state_of(&"hero".to_string()), Some(RevealState::Revealed));

        assert!(observer.on_intersection(&mut host, vec![entry("hero", 1.0)]).is_empty());
    }

    #[test]
    fn below_threshold_stays_pending() {
        let (mut host, mut observer) = mounted(&["hero"]);
        let events = observer.on_intersection(&mut host, vec![entry("hero", 0.05)]);
        assert!(events.is_empty());
        assert_eq!(observer.state_of(&"hero".to_string()), Some(RevealState::Pending));

        let not_intersecting = IntersectionEntry {
            target: "hero".to_string(),
            intersection_ratio: 0.5,
            is_intersecting: false,
        };
        assert!(observer.on_intersection(&mut host, vec![not_intersecting]).is_empty());
    }

    #[test]
    fn reveals_follow_delivery_order() {
        let (mut host, mut observer) = mounted(&["a", "b", "c"]);
        let events = observer.on_intersection(&mut host, vec![entry("c", 1.0), entry("a", 1.0)]);
        let order: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::TargetRevealed { target, .. } => Some(target.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["c", "a"]);
    }

    #[test]
    fn register_all_skips_revealed_targets() {
        let (mut host, mut observer) = mounted(&["hero", "rewards"]);
        observer.on_intersection(&mut host, vec![entry("hero", 1.0)]);
        host.add_element("form");

        assert_eq!(observer.register_all(&host), 1);
        assert!(!host.is_observed("hero"));
        assert!(host.is_observed("form"));
        assert_eq!(host.observe_count("hero"), 1);
    }

    #[test]
    fn deactivate_discards_pending_and_is_idempotent() {
        let (mut host, mut observer) = mounted(&["hero", "rewards"]);
        match observer.deactivate() {
            Some(Event::ObserverDeactivated { abandoned, .. }) => assert_eq!(abandoned, 2),
            other => panic!("expected deactivation, got {other:?}"),
        }
        assert!(observer.deactivate().is_none());
        assert_eq!(host.calls().last(), Some(&WatcherCall::Disconnect));

        assert!(observer.on_intersection(&mut host, vec![entry("hero", 1.0)]).is_empty());
        assert!(!host.is_revealed(&"hero".to_string()));
        assert_eq!(observer.register_all(&host), 0);
        assert_eq!(observer.state_of(&"hero".to_string()), None);
    }

    #[test]
    fn unsupported_environment_reveals_everything() {
        let mut host = MemoryHost::unsupported();
        host.add_element("hero");
        host.add_element("rewards");
        let mut observer = RevealObserver::new();

        assert_eq!(
            observer.activate(&mut host, RevealOptions::default()).unwrap_err(),
            RevealError::EnvironmentUnsupported
        );

        let events = observer.mount(&mut host, RevealOptions::default()).unwrap();
        assert!(matches!(events.as_slice(), [Event::RevealFallback { revealed: 2, .. }]));
        assert!(!observer.is_active());
        assert!(host.is_revealed(&"hero".to_string()));
        assert!(host.is_revealed(&"rewards".to_string()));
    }

    #[test]
    fn drop_disconnects_watcher() {
        let (host, observer) = mounted(&["hero"]);
        drop(observer);
        assert_eq!(host.calls().last(), Some(&WatcherCall::Disconnect));
        assert!(!host.is_observed("hero"));
    }
}
