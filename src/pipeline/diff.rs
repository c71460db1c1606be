//! Diff calculation between snapshots.
//!
//! The answer to "did anything change" is exact structural equality of the
//! two snapshots. Reordering plans or units counts as a change unless the
//! calculator is built with [`DiffCalculator::unordered`].
//!
//! The per-plan delta (added/removed/updated) is only a description for logs;
//! [`DiffResult::changed`] is authoritative. Plans are matched on name and
//! square footage, and by position among plans sharing both. A plan whose
//! square footage changes shows up as one removal plus one addition.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{DiffConfig, FloorPlan, Snapshot};

/// Outcome of comparing two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Whether the snapshots differ
    pub changed: bool,
    /// Plan names only present in the current snapshot
    pub added: Vec<String>,
    /// Plan names only present in the previous snapshot
    pub removed: Vec<String>,
    /// Plan names present in both with different content
    pub updated: Vec<String>,
    /// Same plans with the same content, in a different order
    pub reordered: bool,
}

impl DiffResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        self.changed
    }

    /// Get the total number of changed plans.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.updated.len()
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        if !self.changed {
            return "no changes".to_string();
        }
        if self.reordered {
            return "plans or units reordered".to_string();
        }
        format!(
            "{} added, {} updated, {} removed",
            self.added.len(),
            self.updated.len(),
            self.removed.len()
        )
    }
}

/// Calculator for computing diffs between snapshots.
#[derive(Debug, Clone)]
pub struct DiffCalculator {
    /// Whether plan and unit order is significant
    order_sensitive: bool,
}

impl Default for DiffCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffCalculator {
    /// Create an order-sensitive diff calculator.
    pub fn new() -> Self {
        Self {
            order_sensitive: true,
        }
    }

    /// Create a diff calculator that ignores plan and unit order.
    pub fn unordered() -> Self {
        Self {
            order_sensitive: false,
        }
    }

    pub fn from_config(config: &DiffConfig) -> Self {
        Self {
            order_sensitive: config.order_sensitive,
        }
    }

    pub fn is_order_sensitive(&self) -> bool {
        self.order_sensitive
    }

    /// Calculate the diff between previous and current snapshots.
    pub fn calculate(&self, previous: &Snapshot, current: &Snapshot) -> DiffResult {
        let changed = if self.order_sensitive {
            has_changed(previous, current)
        } else {
            canonical(previous) != canonical(current)
        };

        if !changed {
            return DiffResult::default();
        }

        let prev = keyed(previous);
        let curr = keyed(current);
        let prev_map: HashMap<PlanKey<'_>, &FloorPlan> = prev.iter().copied().collect();
        let curr_map: HashMap<PlanKey<'_>, &FloorPlan> = curr.iter().copied().collect();
        let ambiguous = ambiguous_names(prev.iter().chain(curr.iter()).map(|(key, _)| *key));
        let label = |key: &PlanKey<'_>| plan_label(key, ambiguous.contains(key.0));

        // Added: in current but not in previous, in current order
        let added = curr
            .iter()
            .filter(|(key, _)| !prev_map.contains_key(key))
            .map(|(key, _)| label(key))
            .collect::<Vec<_>>();

        // Removed: in previous but not in current, in previous order
        let removed = prev
            .iter()
            .filter(|(key, _)| !curr_map.contains_key(key))
            .map(|(key, _)| label(key))
            .collect::<Vec<_>>();

        // Updated: in both but content changed
        let updated = curr
            .iter()
            .filter(|(key, plan)| {
                prev_map
                    .get(key)
                    .is_some_and(|prev| !self.same_plan(prev, plan))
            })
            .map(|(key, _)| label(key))
            .collect::<Vec<_>>();

        let reordered = added.is_empty()
            && removed.is_empty()
            && updated.is_empty()
            && canonical(previous) == canonical(current);

        DiffResult {
            changed,
            added,
            removed,
            updated,
            reordered,
        }
    }

    fn same_plan(&self, a: &FloorPlan, b: &FloorPlan) -> bool {
        if self.order_sensitive {
            a == b
        } else {
            canonical_plan(a) == canonical_plan(b)
        }
    }
}

/// Exact, order-sensitive structural comparison.
///
/// An absent previous snapshot should be passed as [`Snapshot::empty`], so a
/// non-empty first observation always counts as a change.
pub fn has_changed(previous: &Snapshot, current: &Snapshot) -> bool {
    previous != current
}

/// Convenience function to calculate an order-sensitive diff.
pub fn calculate_diff(previous: &Snapshot, current: &Snapshot) -> DiffResult {
    DiffCalculator::new().calculate(previous, current)
}

/// `(name, square_footage, occurrence)` identifying a plan within a snapshot.
type PlanKey<'a> = (&'a str, &'a str, usize);

fn keyed(snapshot: &Snapshot) -> Vec<(PlanKey<'_>, &FloorPlan)> {
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    snapshot
        .plans()
        .iter()
        .map(|plan| {
            let name = plan.name.as_str();
            let sqft = plan.square_footage.as_str();
            let occurrence = seen.entry((name, sqft)).or_insert(0);
            let key = (name, sqft, *occurrence);
            *occurrence += 1;
            (key, plan)
        })
        .collect()
}

/// Names carried by more than one distinct plan key.
fn ambiguous_names<'a>(keys: impl Iterator<Item = PlanKey<'a>>) -> HashSet<&'a str> {
    let mut by_name: HashMap<&str, HashSet<PlanKey<'_>>> = HashMap::new();
    for key in keys {
        by_name.entry(key.0).or_default().insert(key);
    }
    by_name
        .into_iter()
        .filter(|(_, keys)| keys.len() > 1)
        .map(|(name, _)| name)
        .collect()
}

fn plan_label((name, sqft, occurrence): &PlanKey<'_>, ambiguous: bool) -> String {
    if !ambiguous {
        return name.to_string();
    }
    let mut label = if sqft.is_empty() {
        name.to_string()
    } else {
        format!("{name} ({sqft} sq ft)")
    };
    if *occurrence > 0 {
        label.push_str(&format!(" #{}", occurrence + 1));
    }
    label
}

fn canonical_plan(plan: &FloorPlan) -> FloorPlan {
    let mut plan = plan.clone();
    if let Some(units) = plan.availability.as_mut() {
        units.sort();
    }
    plan
}

fn canonical(snapshot: &Snapshot) -> Vec<FloorPlan> {
    let mut plans: Vec<FloorPlan> = snapshot.plans().iter().map(canonical_plan).collect();
    plans.sort_by(compare_plans);
    plans
}

fn compare_plans(a: &FloorPlan, b: &FloorPlan) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.square_footage.cmp(&b.square_footage))
        .then_with(|| a.availability.cmp(&b.availability))
}
