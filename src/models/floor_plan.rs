//! Floor plan availability data structures.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One leasable unit advertised under a floor plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct UnitAvailability {
    /// Unit identifier as published (e.g. "204")
    pub unit: String,

    /// Move-in date as published; the format is defined by the site
    pub available_on: String,

    /// Raw price text, formatted only when notifying
    pub price: String,
}

/// One distinct unit layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    /// First two tokens of the plan heading (e.g. "Plan A1")
    pub name: String,

    /// Text preceding "Sq" in the heading's last segment
    pub square_footage: String,

    /// Advertised units, `None` when the plan lists nothing
    pub availability: Option<Vec<UnitAvailability>>,
}

impl FloorPlan {
    /// Number of advertised units.
    pub fn unit_count(&self) -> usize {
        self.availability.as_ref().map_or(0, Vec::len)
    }
}

/// All floor plans and their availability at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Snapshot(pub Vec<FloorPlan>);

impl Snapshot {
    pub fn new(plans: Vec<FloorPlan>) -> Self {
        Self(plans)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn plans(&self) -> &[FloorPlan] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Floor plans with an availability list, paired with their units.
    pub fn available_plans(&self) -> impl Iterator<Item = (&FloorPlan, &[UnitAvailability])> {
        self.0
            .iter()
            .filter_map(|plan| plan.availability.as_deref().map(|units| (plan, units)))
    }

    /// Total number of advertised units across all plans.
    pub fn unit_count(&self) -> usize {
        self.0.iter().map(FloorPlan::unit_count).sum()
    }

    /// Hex SHA-256 of the compact JSON encoding.
    pub fn fingerprint(&self) -> String {
        // Serializing plain strings and vectors cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }

    /// Pretty JSON as persisted by the snapshot stores.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

impl From<Vec<FloorPlan>> for Snapshot {
    fn from(plans: Vec<FloorPlan>) -> Self {
        Self(plans)
    }
}
