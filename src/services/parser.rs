// src/services/parser.rs

//! Floor plan page parser.
//!
//! Turns the availability page into an ordered [`Snapshot`] using the
//! configured CSS selectors. Sections missing from the page degrade to empty
//! fields or `None` availability; only a document that cannot be loaded at all
//! is an error.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{FloorPlan, FloorPlanSelectors, Snapshot, UnitAvailability};

/// Characters the site uses between heading segments.
const HEADING_SEPARATORS: &[char] = &['•', '·', '∙', '●', '⋅', '‧', '|'];

/// Marker preceding the square footage unit in the heading.
const SQUARE_FEET_MARKER: &str = "Sq";

/// Parser for the floor plan availability page.
#[derive(Debug, Clone)]
pub struct FloorPlanParser {
    container: Selector,
    container_index: usize,
    plan: Selector,
    heading: Selector,
    availability: Selector,
    unit_row: Selector,
    unit: Selector,
    available_on: Selector,
    price: Selector,
    no_availability_marker: String,
}

impl FloorPlanParser {
    /// Compile the configured selectors.
    pub fn new(selectors: &FloorPlanSelectors) -> Result<Self> {
        Ok(Self {
            container: Self::parse_selector(&selectors.container)?,
            container_index: selectors.container_index,
            plan: Self::parse_selector(&selectors.plan)?,
            heading: Self::parse_selector(&selectors.heading)?,
            availability: Self::parse_selector(&selectors.availability)?,
            unit_row: Self::parse_selector(&selectors.unit_row)?,
            unit: Self::parse_selector(&selectors.unit)?,
            available_on: Self::parse_selector(&selectors.available_on)?,
            price: Self::parse_selector(&selectors.price)?,
            no_availability_marker: normalize_whitespace(&selectors.no_availability_marker)
                .to_lowercase(),
        })
    }

    /// Parse a raw page into a snapshot of floor plans in document order.
    pub fn parse(&self, raw_document: &str) -> Result<Snapshot> {
        if raw_document.trim().is_empty() {
            return Err(AppError::parse("document is empty"));
        }

        let document = Html::parse_document(raw_document);

        let Some(container) = document.select(&self.container).nth(self.container_index) else {
            log::warn!(
                "Floor plan container #{} not found; treating page as empty",
                self.container_index
            );
            return Ok(Snapshot::empty());
        };

        let plans: Vec<FloorPlan> = container
            .select(&self.plan)
            .map(|plan| self.parse_plan(plan))
            .collect();

        log::debug!("Parsed {} floor plans", plans.len());
        Ok(Snapshot::new(plans))
    }

    fn parse_plan(&self, plan: ElementRef<'_>) -> FloorPlan {
        let heading = first_text(plan, &self.heading);
        let (name, square_footage) = split_heading(&heading);

        let availability = plan
            .select(&self.availability)
            .next()
            .and_then(|block| self.parse_availability(block));

        FloorPlan {
            name,
            square_footage,
            availability,
        }
    }

    fn parse_availability(&self, block: ElementRef<'_>) -> Option<Vec<UnitAvailability>> {
        let text = element_text(block).to_lowercase();
        if text.contains(&self.no_availability_marker) {
            return None;
        }

        let rows: Vec<ElementRef<'_>> = block.select(&self.unit_row).collect();
        // Row 0 is the site's template row
        if rows.len() < 2 {
            return None;
        }

        Some(
            rows.into_iter()
                .skip(1)
                .map(|row| UnitAvailability {
                    unit: first_text(row, &self.unit),
                    available_on: first_text(row, &self.available_on),
                    price: first_text(row, &self.price),
                })
                .collect(),
        )
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// Split a plan heading into `(name, square_footage)`.
///
/// The name is the first two whitespace-delimited tokens. The square footage
/// is the text before "Sq" in the last separator-delimited segment.
pub fn split_heading(heading: &str) -> (String, String) {
    let name = heading
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ");

    let last_segment = heading.rsplit(HEADING_SEPARATORS).next().unwrap_or_default();
    let square_footage = last_segment
        .split(SQUARE_FEET_MARKER)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    (name, square_footage)
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE_ROW: &str = r#"
        <tr class="fp-unit-row template">
          <td class="fp-unit-number">{{unit}}</td>
          <td class="fp-unit-date">{{date}}</td>
          <td class="fp-unit-price">{{price}}</td>
        </tr>"#;

    fn unit_row(unit: &str, date: &str, price: &str) -> String {
        format!(
            r#"<tr class="fp-unit-row">
                 <td class="fp-unit-number">{unit}</td>
                 <td class="fp-unit-date">{date}</td>
                 <td class="fp-unit-price">{price}</td>
               </tr>"#
        )
    }

    fn plan(heading: &str, availability: &str) -> String {
        format!(
            r#"<div class="fp-plan">
                 <h3 class="fp-plan-title">{heading}</h3>
                 <div class="fp-availability">{availability}</div>
               </div>"#
        )
    }

    fn table(rows: &[String]) -> String {
        format!("<table>{}{}</table>", TEMPLATE_ROW, rows.concat())
    }

    fn page(plans: &[String]) -> String {
        format!(
            r#"<html><body>
                 <section class="fp-category">
                   {decoy}
                 </section>
                 <section class="fp-category">
                   {plans}
                 </section>
               </body></html>"#,
            decoy = plan("Decoy Plan • 1 Sq. Ft.", ""),
            plans = plans.concat()
        )
    }

    fn parser() -> FloorPlanParser {
        FloorPlanParser::new(&FloorPlanSelectors::default()).unwrap()
    }

    #[test]
    fn test_units_follow_template_row() {
        let html = page(&[plan(
            "Plan A1 Studio • 1 Bath • 550 Sq. Ft.",
            &table(&[
                unit_row("101", "11/01/2026", "1450"),
                unit_row("214", "Now", "1525.50"),
                unit_row("330", "12/15/2026", "1600"),
            ]),
        )]);

        let snapshot = parser().parse(&html).unwrap();
        assert_eq!(snapshot.len(), 1);

        let a1 = &snapshot.plans()[0];
        assert_eq!(a1.name, "Plan A1");
        assert_eq!(a1.square_footage, "550");

        let units = a1.availability.as_ref().unwrap();
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].unit, "101");
        assert_eq!(units[0].available_on, "11/01/2026");
        assert_eq!(units[0].price, "1450");
        assert_eq!(units[1].unit, "214");
        assert_eq!(units[2].unit, "330");
    }

    #[test]
    fn test_no_plans_marker_means_none() {
        let html = page(&[plan(
            "Plan B2 • 2 Bed • 900 Sq. Ft.",
            "<p>No Plans Currently Available</p>",
        )]);

        let snapshot = parser().parse(&html).unwrap();
        assert_eq!(snapshot.plans()[0].availability, None);
    }

    #[test]
    fn test_marker_wins_over_rows() {
        let html = page(&[plan(
            "Plan B2 • 2 Bed • 900 Sq. Ft.",
            &format!(
                "<p>No plans currently available</p>{}",
                table(&[unit_row("1", "Now", "1000")])
            ),
        )]);

        let snapshot = parser().parse(&html).unwrap();
        assert_eq!(snapshot.plans()[0].availability, None);
    }

    #[test]
    fn test_template_row_only_means_none() {
        let html = page(&[plan("Plan C3 • 3 Bed • 1,200 Sq. Ft.", &table(&[]))]);

        let snapshot = parser().parse(&html).unwrap();
        assert_eq!(snapshot.plans()[0].availability, None);
        assert_eq!(snapshot.plans()[0].square_footage, "1,200");
    }

    #[test]
    fn test_missing_fields_are_empty_strings() {
        let html = page(&[plan(
            "Plan D4 • 750 Sq. Ft.",
            &format!(
                r#"<table>{TEMPLATE_ROW}<tr class="fp-unit-row"><td class="fp-unit-number">5</td></tr></table>"#
            ),
        )]);

        let snapshot = parser().parse(&html).unwrap();
        let units = snapshot.plans()[0].availability.as_ref().unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].unit, "5");
        assert_eq!(units[0].available_on, "");
        assert_eq!(units[0].price, "");
    }

    #[test]
    fn test_missing_availability_block_means_none() {
        let html = page(&[r#"<div class="fp-plan"><h3 class="fp-plan-title">Plan E5 • 600 Sq. Ft.</h3></div>"#.to_string()]);

        let snapshot = parser().parse(&html).unwrap();
        assert_eq!(snapshot.plans()[0].name, "Plan E5");
        assert_eq!(snapshot.plans()[0].availability, None);
    }

    #[test]
    fn test_plans_keep_document_order() {
        let html = page(&[
            plan("Plan Z9 • 400 Sq. Ft.", &table(&[])),
            plan("Plan A1 • 500 Sq. Ft.", &table(&[])),
        ]);

        let snapshot = parser().parse(&html).unwrap();
        let names: Vec<_> = snapshot.plans().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Plan Z9", "Plan A1"]);
    }

    #[test]
    fn test_container_index_selects_second_section() {
        let html = page(&[]);
        let snapshot = parser().parse(&html).unwrap();
        assert!(snapshot.is_empty());

        let mut selectors = FloorPlanSelectors::default();
        selectors.container_index = 0;
        let snapshot = FloorPlanParser::new(&selectors).unwrap().parse(&html).unwrap();
        assert_eq!(snapshot.plans()[0].name, "Decoy Plan");
    }

    #[test]
    fn test_missing_container_is_empty_snapshot() {
        let snapshot = parser().parse("<html><body><p>Maintenance</p></body></html>").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(matches!(parser().parse("  \n "), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut selectors = FloorPlanSelectors::default();
        selectors.plan = "[[invalid".to_string();
        assert!(matches!(
            FloorPlanParser::new(&selectors),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn test_split_heading_separators_and_whitespace() {
        for heading in [
            "Plan A1 • 1 Bed • 750 Sq. Ft.",
            "Plan A1 · 1 Bed ·   750   Sq. Ft.",
            "Plan A1 | 1 Bed |750Sq Ft",
            "Plan A1 ∙ 750 Sq.Ft.",
        ] {
            let (name, sqft) = split_heading(heading);
            assert_eq!(name, "Plan A1", "heading: {heading}");
            assert_eq!(sqft, "750", "heading: {heading}");
        }
    }

    #[test]
    fn test_split_heading_without_marker() {
        let (name, sqft) = split_heading("Penthouse • 2,000");
        assert_eq!(name, "Penthouse •");
        assert_eq!(sqft, "2,000");

        assert_eq!(split_heading(""), (String::new(), String::new()));
    }
}
