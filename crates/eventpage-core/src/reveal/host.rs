//! Seam between the reveal observer and the rendering layer.
//!
//! The observer never queries a document itself. The host enumerates
//! reveal-eligible elements on demand, owns the visual "revealed" flag,
//! and creates the single intersection watcher for a session.

use std::fmt;
use std::hash::Hash;

use super::options::RevealOptions;
use crate::error::RevealError;

/// The host's intersection watcher for one session.
pub trait Watcher<E> {
    fn observe(&mut self, target: &E);
    fn unobserve(&mut self, target: &E);
    /// Stop watching every target. Called once when the session ends.
    fn disconnect(&mut self);
}

pub trait RevealHost {
    /// Lookup handle for a rendered element. Must not own the element.
    type Element: Clone + Eq + Hash + fmt::Debug + fmt::Display;
    type Watcher: Watcher<Self::Element>;

    /// Fails with [`RevealError::EnvironmentUnsupported`] when the host has
    /// no intersection facility.
    fn create_watcher(&mut self, options: &RevealOptions) -> Result<Self::Watcher, RevealError>;

    /// Elements currently carrying the reveal marker.
    fn eligible_elements(&self) -> Vec<Self::Element>;

    fn is_revealed(&self, element: &Self::Element) -> bool;

    /// Apply the reveal side effect (style toggle).
    fn apply_reveal(&mut self, element: &Self::Element);
}

/// One visibility-intersection notification delivered by the watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<E> {
    pub target: E,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
}

impl<E> IntersectionEntry<E> {
    pub fn new(target: E, intersection_ratio: f64) -> Self {
        Self {
            target,
            intersection_ratio,
            is_intersecting: intersection_ratio > 0.0,
        }
    }

    /// Whether this entry should flip its target to revealed.
    pub fn crosses(&self, threshold: f64) -> bool {
        self.is_intersecting && self.intersection_ratio >= threshold
    }
}
