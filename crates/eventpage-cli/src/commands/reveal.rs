use std::path::PathBuf;

use clap::Subcommand;
use eventpage_core::error::Result;
use eventpage_core::reveal::{MemoryHost, RootMargin};
use eventpage_core::{Config, Event, IntersectionEntry, RevealError, RevealObserver, RevealOptions};
use serde::{Deserialize, Serialize};

#[derive(Subcommand)]
pub enum RevealAction {
    /// Run a scripted reveal session against an in-memory page
    Replay {
        /// JSON script file
        script: PathBuf,
    },
}

fn default_true() -> bool {
    true
}

/// A scripted page: its elements and the host events to deliver.
///
/// The session is mounted before the first step.
#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_true")]
    pub intersection_supported: bool,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub root_margin: Option<String>,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayStep {
    Intersect { entries: Vec<ReplayEntry> },
    Add { elements: Vec<String> },
    Remove { elements: Vec<String> },
    RegisterAll,
    Mount,
    Unmount,
}

#[derive(Debug, Deserialize)]
pub struct ReplayEntry {
    pub target: String,
    pub ratio: f64,
    #[serde(default)]
    pub is_intersecting: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ReplayOutcome {
    pub events: Vec<Event>,
    pub revealed: Vec<String>,
    pub still_observed: Vec<String>,
}

fn options_for(script: &ReplayScript, config: &Config) -> Result<RevealOptions> {
    let base = config.reveal_options()?;
    let margin = match &script.root_margin {
        Some(m) => m.parse::<RootMargin>()?,
        None => *base.root_margin(),
    };
    Ok(RevealOptions::new(script.threshold.unwrap_or(base.threshold()), margin)?)
}

pub fn replay(script: &ReplayScript, options: RevealOptions) -> Result<ReplayOutcome, RevealError> {
    let mut host = if script.intersection_supported {
        MemoryHost::new()
    } else {
        MemoryHost::unsupported()
    };
    for id in &script.elements {
        host.add_element(id.clone());
    }

    let mut observer = RevealObserver::new();
    let mut events = observer.mount(&mut host, options.clone())?;

    for step in &script.steps {
        match step {
            ReplayStep::Intersect { entries } => {
                let entries = entries.iter().map(|e| IntersectionEntry {
                    target: e.target.clone(),
                    intersection_ratio: e.ratio,
                    is_intersecting: e.is_intersecting.unwrap_or(e.ratio > 0.0),
                });
                events.extend(observer.on_intersection(&mut host, entries));
            }
            ReplayStep::Add { elements } => {
                for id in elements {
                    host.add_element(id.clone());
                }
            }
            ReplayStep::Remove { elements } => {
                for id in elements {
                    host.remove_element(id);
                }
            }
            ReplayStep::RegisterAll => {
                observer.register_all(&host);
            }
            ReplayStep::Mount => events.extend(observer.mount(&mut host, options.clone())?),
            ReplayStep::Unmount => events.extend(observer.unmount()),
        }
    }
    events.extend(observer.unmount());

    Ok(ReplayOutcome {
        events,
        revealed: host.revealed_elements(),
        still_observed: host.observed(),
    })
}

pub fn run(action: RevealAction) -> Result<()> {
    match action {
        RevealAction::Replay { script } => {
            let content = std::fs::read_to_string(&script)?;
            let script: ReplayScript = serde_json::from_str(&content)?;
            let options = options_for(&script, &Config::load_or_default())?;
            let outcome = replay(&script, options)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
