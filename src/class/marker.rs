//! Capability markers.
//!
//! A marker only records that a method wants validation. Nothing about the
//! method changes until [`ClassBuilder::build`](crate::class::ClassBuilder::build)
//! reads the markers and wires the method into the class's dispatch table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validation capability attachable to a method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Run `validate_<name>` with the same arguments before the method.
    Prerun,
    /// Check arguments and return value against the signature's annotations.
    Type,
}

/// The set of markers carried by a method.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Markers {
    /// Prerun validation requested
    pub prerun: bool,
    /// Type validation requested
    pub typed: bool,
}

impl Markers {
    /// Attach a marker. Attaching it again has no further effect.
    pub fn insert(&mut self, marker: Marker) {
        match marker {
            Marker::Prerun => self.prerun = true,
            Marker::Type => self.typed = true,
        }
    }

    /// Check whether a marker is present.
    pub fn contains(&self, marker: Marker) -> bool {
        match marker {
            Marker::Prerun => self.prerun,
            Marker::Type => self.typed,
        }
    }

    /// Whether any marker is present.
    pub fn any(&self) -> bool {
        self.prerun || self.typed
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Prerun => write!(f, "prerun"),
            Marker::Type => write!(f, "type"),
        }
    }
}

/// Name of the validator paired with a prerun-validated method.
pub fn validator_name(method: &str) -> String {
    format!("validate_{}", method)
}
