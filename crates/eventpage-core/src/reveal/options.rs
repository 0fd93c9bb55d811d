//! Visibility-intersection configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RevealError;

pub const DEFAULT_THRESHOLD: f64 = 0.12;
pub const DEFAULT_ROOT_MARGIN: &str = "0px 0px -10% 0px";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginUnit {
    Px,
    Percent,
}

/// One side of a root margin. Negative values shrink the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginLength {
    pub value: f64,
    pub unit: MarginUnit,
}

impl MarginLength {
    pub const ZERO: MarginLength = MarginLength {
        value: 0.0,
        unit: MarginUnit::Px,
    };
}

impl FromStr for MarginLength {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: String| RevealError::InvalidOptions {
            field: "root_margin".into(),
            message,
        };
        let (number, unit) = if let Some(n) = s.strip_suffix("px") {
            (n, MarginUnit::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, MarginUnit::Percent)
        } else {
            (s, MarginUnit::Px)
        };
        let value: f64 = number
            .parse()
            .map_err(|_| invalid(format!("'{s}' is not a length")))?;
        if !value.is_finite() {
            return Err(invalid(format!("'{s}' is not a finite length")));
        }
        // Only zero may omit its unit.
        if number.len() == s.len() && value != 0.0 {
            return Err(invalid(format!("'{s}' needs a px or % unit")));
        }
        Ok(MarginLength { value, unit })
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            MarginUnit::Px => write!(f, "{}px", self.value),
            MarginUnit::Percent => write!(f, "{}%", self.value),
        }
    }
}

/// Margin applied to the viewport before intersection testing, in CSS
/// shorthand order (top, right, bottom, left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl Default for RootMargin {
    fn default() -> Self {
        MarginLength::ZERO.into()
    }
}

impl From<MarginLength> for RootMargin {
    fn from(all: MarginLength) -> Self {
        Self {
            top: all,
            right: all,
            bottom: all,
            left: all,
        }
    }
}

impl FromStr for RootMargin {
    type Err = RevealError;

    /// Parses 1 to 4 whitespace-separated lengths with CSS margin expansion.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(str::parse::<MarginLength>)
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [all] => Ok((*all).into()),
            [v, h] => Ok(Self {
                top: *v,
                right: *h,
                bottom: *v,
                left: *h,
            }),
            [t, h, b] => Ok(Self {
                top: *t,
                right: *h,
                bottom: *b,
                left: *h,
            }),
            [t, r, b, l] => Ok(Self {
                top: *t,
                right: *r,
                bottom: *b,
                left: *l,
            }),
            _ => Err(RevealError::InvalidOptions {
                field: "root_margin".into(),
                message: format!("expected 1 to 4 lengths, got {}", parts.len()),
            }),
        }
    }
}

impl TryFrom<String> for RootMargin {
    type Error = RevealError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_string()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Configuration handed to the host when the watcher is created.
///
/// Deserialization goes through [`RevealOptions::new`], so a decoded value
/// always carries a valid threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRevealOptions")]
pub struct RevealOptions {
    threshold: f64,
    root_margin: RootMargin,
}

#[derive(Deserialize)]
struct RawRevealOptions {
    threshold: f64,
    root_margin: RootMargin,
}

impl TryFrom<RawRevealOptions> for RevealOptions {
    type Error = RevealError;

    fn try_from(raw: RawRevealOptions) -> Result<Self, Self::Error> {
        RevealOptions::new(raw.threshold, raw.root_margin)
    }
}

impl RevealOptions {
    /// `threshold` is the minimum visible-area ratio, within `[0, 1]`.
    pub fn new(threshold: f64, root_margin: RootMargin) -> Result<Self, RevealError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RevealError::InvalidOptions {
                field: "threshold".into(),
                message: format!("{threshold} must be within [0, 1]"),
            });
        }
        Ok(Self {
            threshold,
            root_margin,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn root_margin(&self) -> &RootMargin {
        &self.root_margin
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        let bottom = MarginLength {
            value: -10.0,
            unit: MarginUnit::Percent,
        };
        Self {
            threshold: DEFAULT_THRESHOLD,
            root_margin: RootMargin {
                bottom,
                ..RootMargin::default()
            },
        }
    }
}
