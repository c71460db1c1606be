// src/models/selectors.rs

//! CSS selectors for scraping the floor plan page.

use serde::{Deserialize, Serialize};

/// CSS selectors bound to the target site's markup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloorPlanSelectors {
    /// Selector for the repeated category section holding the plans
    #[serde(default = "defaults::container")]
    pub container: String,

    /// Which match of `container` to use (0-based)
    #[serde(default = "defaults::container_index")]
    pub container_index: usize,

    /// Selector for each floor plan entry within the container
    #[serde(default = "defaults::plan")]
    pub plan: String,

    /// Selector for the plan heading ("Plan A1 • 1 Bed • 750 Sq. Ft.")
    #[serde(default = "defaults::heading")]
    pub heading: String,

    /// Selector for the availability block within a plan
    #[serde(default = "defaults::availability")]
    pub availability: String,

    /// Selector for unit rows; the first match is a template row
    #[serde(default = "defaults::unit_row")]
    pub unit_row: String,

    /// Selector for the unit identifier within a row
    #[serde(default = "defaults::unit")]
    pub unit: String,

    /// Selector for the availability date within a row
    #[serde(default = "defaults::available_on")]
    pub available_on: String,

    /// Selector for the price within a row
    #[serde(default = "defaults::price")]
    pub price: String,

    /// Text the site shows when a plan has nothing to lease
    #[serde(default = "defaults::no_availability_marker")]
    pub no_availability_marker: String,
}

impl Default for FloorPlanSelectors {
    fn default() -> Self {
        Self {
            container: defaults::container(),
            container_index: defaults::container_index(),
            plan: defaults::plan(),
            heading: defaults::heading(),
            availability: defaults::availability(),
            unit_row: defaults::unit_row(),
            unit: defaults::unit(),
            available_on: defaults::available_on(),
            price: defaults::price(),
            no_availability_marker: defaults::no_availability_marker(),
        }
    }
}

impl FloorPlanSelectors {
    /// Every configured string paired with its field name.
    pub fn named(&self) -> [(&'static str, &str); 9] {
        [
            ("container", &self.container),
            ("plan", &self.plan),
            ("heading", &self.heading),
            ("availability", &self.availability),
            ("unit_row", &self.unit_row),
            ("unit", &self.unit),
            ("available_on", &self.available_on),
            ("price", &self.price),
            ("no_availability_marker", &self.no_availability_marker),
        ]
    }
}

mod defaults {
    pub fn container() -> String {
        ".fp-category".into()
    }
    pub fn container_index() -> usize {
        1
    }
    pub fn plan() -> String {
        ".fp-plan".into()
    }
    pub fn heading() -> String {
        ".fp-plan-title".into()
    }
    pub fn availability() -> String {
        ".fp-availability".into()
    }
    pub fn unit_row() -> String {
        ".fp-unit-row".into()
    }
    pub fn unit() -> String {
        ".fp-unit-number".into()
    }
    pub fn available_on() -> String {
        ".fp-unit-date".into()
    }
    pub fn price() -> String {
        ".fp-unit-price".into()
    }
    pub fn no_availability_marker() -> String {
        "No Plans Currently Available".into()
    }
}
