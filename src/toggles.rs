//! Process-wide feature toggles
//!
//! Toggles switch between behaviorally equivalent strategies. The set is
//! built once and never mutated; the client only ever asks whether a toggle
//! is present.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A named on/off switch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureToggle {
    /// Export with tuple queries instead of the bulk Graph Store Protocol
    #[serde(rename = "No_GSP")]
    NoGsp,
}

impl FeatureToggle {
    /// Name used in configuration files and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            FeatureToggle::NoGsp => "No_GSP",
        }
    }
}

impl fmt::Display for FeatureToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureToggle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            name if name.eq_ignore_ascii_case("No_GSP") => Ok(FeatureToggle::NoGsp),
            other => Err(Error::config(
                format!("unknown feature toggle {other:?}"),
                "feature_toggles",
            )),
        }
    }
}

/// Immutable set of enabled toggles
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureToggles {
    enabled: HashSet<FeatureToggle>,
}

impl FeatureToggles {
    /// Empty set: every toggle off
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse toggle names, rejecting unknown ones
    pub fn parse<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse::<FeatureToggle>())
            .collect()
    }

    /// Whether `toggle` is enabled
    pub fn contains(&self, toggle: FeatureToggle) -> bool {
        self.enabled.contains(&toggle)
    }

    /// Whether no toggle is enabled
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

impl FromIterator<FeatureToggle> for FeatureToggles {
    fn from_iter<I: IntoIterator<Item = FeatureToggle>>(iter: I) -> Self {
        Self {
            enabled: iter.into_iter().collect(),
        }
    }
}
