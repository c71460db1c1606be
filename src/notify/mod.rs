//! Change notifications.
//!
//! A notification lists only the floor plans that currently advertise units:
//!
//! ```text
//! Plan A1 (750 sq ft)
//!   Unit 204 | available 11/01/2026 | $1,850
//!   Unit 311 | available Now | $1,925
//!
//! ```
//!
//! Plans without availability are left out of the message entirely.

#[cfg(feature = "sns")]
pub mod sns;
pub mod webhook;

use std::fmt::Write;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

#[cfg(feature = "sns")]
pub use sns::SnsNotifier;
pub use webhook::WebhookNotifier;

/// Message body used when no floor plan lists any unit.
pub const NOTHING_AVAILABLE: &str = "No floor plans currently list available units.";

/// Trait for notification transports.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message describing `snapshot`. Delivery failures propagate.
    async fn notify(&self, snapshot: &Snapshot) -> Result<()>;

    /// Transport name for logs.
    fn transport(&self) -> &'static str;
}

/// Notifier that only writes the message to the log.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    subject: String,
}

impl LogNotifier {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, snapshot: &Snapshot) -> Result<()> {
        log::info!("{}\n{}", self.subject, format_message(snapshot));
        Ok(())
    }

    fn transport(&self) -> &'static str {
        "log"
    }
}

/// Render the human-readable message for a snapshot.
pub fn format_message(snapshot: &Snapshot) -> String {
    let mut message = String::new();

    for (plan, units) in snapshot.available_plans() {
        if plan.square_footage.is_empty() {
            let _ = writeln!(message, "{}", plan.name);
        } else {
            let _ = writeln!(message, "{} ({} sq ft)", plan.name, plan.square_footage);
        }
        for unit in units {
            let _ = writeln!(
                message,
                "  Unit {} | available {} | {}",
                unit.unit,
                unit.available_on,
                price_label(&unit.price)
            );
        }
        message.push('\n');
    }

    if message.is_empty() {
        NOTHING_AVAILABLE.to_string()
    } else {
        message
    }
}

/// Format a scraped price as a whole number with thousands separators.
///
/// `"1234567.89"` becomes `"1,234,568"`. Text that is not a number is
/// returned trimmed and otherwise unchanged.
pub fn format_price(raw: &str) -> String {
    match parse_price(raw) {
        Some(value) => group_thousands(value),
        None => raw.trim().to_string(),
    }
}

/// Parse price text such as `"$1,850.00"`, rounded half away from zero to a
/// whole number.
pub fn parse_price(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    let mut magnitude: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    if fraction.as_bytes().first().is_some_and(|d| *d >= b'5') {
        magnitude = magnitude.checked_add(1)?;
    }
    Some(if negative { -magnitude } else { magnitude })
}

/// Group digits in threes: `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn price_label(raw: &str) -> String {
    let formatted = format_price(raw);
    if parse_price(raw).is_some() {
        format!("${formatted}")
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FloorPlan, UnitAvailability};

    fn unit(unit: &str, date: &str, price: &str) -> UnitAvailability {
        UnitAvailability {
            unit: unit.to_string(),
            available_on: date.to_string(),
            price: price.to_string(),
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("1000"), "1,000");
        assert_eq!(format_price("999"), "999");
        assert_eq!(format_price("1234567.89"), "1,234,568");
        assert_eq!(format_price("0"), "0");
        assert_eq!(format_price("100000"), "100,000");
        assert_eq!(format_price("$1,850.50"), "1,851");
        assert_eq!(format_price(" 1450 "), "1,450");
    }

    #[test]
    fn test_format_price_passthrough() {
        assert_eq!(format_price("Call for pricing"), "Call for pricing");
        assert_eq!(format_price("1,450 - 1,600"), "1,450 - 1,600");
        assert_eq!(format_price(""), "");
    }

    #[test]
    fn test_format_price_keeps_large_values_exact() {
        assert_eq!(format_price("9007199254740993"), "9,007,199,254,740,993");
        assert_eq!(format_price("9007199254740993.5"), "9,007,199,254,740,994");
        assert_eq!(format_price("99999999999999999999"), "99999999999999999999");
    }

    #[test]
    fn test_parse_price_rounding() {
        assert_eq!(parse_price("1925.4"), Some(1925));
        assert_eq!(parse_price("1925.5"), Some(1926));
        assert_eq!(parse_price("-2.5"), Some(-3));
        assert_eq!(parse_price(".5"), Some(1));
        assert_eq!(parse_price("1.2.3"), None);
        assert_eq!(parse_price("-"), None);
        assert_eq!(parse_price("Call"), None);
    }

    #[test]
    fn test_price_label_prefix() {
        assert_eq!(price_label("1850"), "$1,850");
        assert_eq!(price_label(" Call for pricing "), "Call for pricing");
    }

    #[test]
    fn test_group_thousands_negative() {
        assert_eq!(group_thousands(-1234), "-1,234");
        assert_eq!(group_thousands(-12), "-12");
    }

    #[test]
    fn test_message_lists_only_available_plans() {
        let snapshot = Snapshot::new(vec![
            FloorPlan {
                name: "Plan A1".to_string(),
                square_footage: "750".to_string(),
                availability: Some(vec![
                    unit("204", "11/01/2026", "1850"),
                    unit("311", "Now", "1925.4"),
                ]),
            },
            FloorPlan {
                name: "Plan B2".to_string(),
                square_footage: "1,100".to_string(),
                availability: None,
            },
            FloorPlan {
                name: "Plan C3".to_string(),
                square_footage: String::new(),
                availability: Some(vec![unit("9", "12/01/2026", "Call")]),
            },
        ]);

        let message = format_message(&snapshot);
        assert_eq!(
            message,
            "Plan A1 (750 sq ft)\n\
             \x20 Unit 204 | available 11/01/2026 | $1,850\n\
             \x20 Unit 311 | available Now | $1,925\n\
             \n\
             Plan C3\n\
             \x20 Unit 9 | available 12/01/2026 | Call\n\
             \n"
        );
        assert!(!message.contains("Plan B2"));
    }

    #[test]
    fn test_message_when_nothing_available() {
        let snapshot = Snapshot::new(vec![FloorPlan {
            name: "Plan B2".to_string(),
            square_footage: "1,100".to_string(),
            availability: None,
        }]);
        assert_eq!(format_message(&snapshot), NOTHING_AVAILABLE);
        assert_eq!(format_message(&Snapshot::empty()), NOTHING_AVAILABLE);
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        let notifier = LogNotifier::new("Availability changed");
        assert!(notifier.notify(&Snapshot::empty()).await.is_ok());
        assert_eq!(notifier.transport(), "log");
    }
}
