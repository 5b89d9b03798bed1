//! Unit conversion collaborator.
//!
//! Building commands accept amounts such as `500`, `2.5kW` or `3 lb`; values are
//! stored in base units (grams, watts, metres, litres).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Mass,
    Power,
    Length,
    Volume,
}

pub trait UnitConverter: Send + Sync {
    /// Convert an author-supplied amount into base units. `None` when the text is not an amount of `kind`.
    fn parse(&self, text: &str, kind: UnitKind) -> Option<f64>;

    /// Describe a base-unit amount for humans.
    fn describe(&self, value: f64, kind: UnitKind) -> String;
}

/// Metric units with a handful of imperial aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricUnits;

impl MetricUnits {
    fn suffixes(kind: UnitKind) -> &'static [(&'static str, f64)] {
        match kind {
            UnitKind::Mass => &[
                ("mg", 0.001),
                ("g", 1.0),
                ("gram", 1.0),
                ("grams", 1.0),
                ("kg", 1000.0),
                ("kilogram", 1000.0),
                ("kilograms", 1000.0),
                ("t", 1_000_000.0),
                ("oz", 28.349_523_125),
                ("lb", 453.592_37),
                ("lbs", 453.592_37),
            ],
            UnitKind::Power => &[
                ("w", 1.0),
                ("watt", 1.0),
                ("watts", 1.0),
                ("kw", 1000.0),
                ("kilowatt", 1000.0),
                ("kilowatts", 1000.0),
                ("mw", 1_000_000.0),
                ("hp", 745.699_872),
            ],
            UnitKind::Length => &[
                ("mm", 0.001),
                ("cm", 0.01),
                ("m", 1.0),
                ("metre", 1.0),
                ("metres", 1.0),
                ("km", 1000.0),
                ("in", 0.0254),
                ("ft", 0.3048),
            ],
            UnitKind::Volume => &[
                ("ml", 0.001),
                ("cl", 0.01),
                ("l", 1.0),
                ("litre", 1.0),
                ("litres", 1.0),
                ("floz", 0.029_573_53),
                ("gal", 3.785_411_784),
            ],
        }
    }

    fn base_symbol(kind: UnitKind) -> &'static str {
        match kind {
            UnitKind::Mass => "g",
            UnitKind::Power => "W",
            UnitKind::Length => "m",
            UnitKind::Volume => "L",
        }
    }
}

fn trim_number(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

impl UnitConverter for MetricUnits {
    fn parse(&self, text: &str, kind: UnitKind) -> Option<f64> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        if compact.is_empty() {
            return None;
        }
        let split = compact
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(compact.len());
        let (number, suffix) = compact.split_at(split);
        let value: f64 = number.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        if suffix.is_empty() {
            return Some(value);
        }
        Self::suffixes(kind)
            .iter()
            .find(|(name, _)| *name == suffix)
            .map(|(_, factor)| value * factor)
    }

    fn describe(&self, value: f64, kind: UnitKind) -> String {
        let symbol = Self::base_symbol(kind);
        let magnitude = value.abs();
        let (scaled, prefix) = if magnitude >= 1_000_000.0 {
            (value / 1_000_000.0, "M")
        } else if magnitude >= 1000.0 {
            (value / 1000.0, "k")
        } else if magnitude > 0.0 && magnitude < 1.0 {
            (value * 1000.0, "m")
        } else {
            (value, "")
        };
        format!("{}{}{}", trim_number(scaled), prefix, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_numbers_as_base_units() {
        let units = MetricUnits;
        assert_eq!(units.parse("500", UnitKind::Power), Some(500.0));
        assert_eq!(units.parse("2.5kW", UnitKind::Power), Some(2500.0));
        assert_eq!(units.parse("3 kg", UnitKind::Mass), Some(3000.0));
        assert_eq!(units.parse("250ml", UnitKind::Volume), Some(0.25));
        assert_eq!(units.parse("lots", UnitKind::Mass), None);
        assert_eq!(units.parse("5 furlongs", UnitKind::Length), None);
    }

    #[test]
    fn describes_with_metric_prefixes() {
        let units = MetricUnits;
        assert_eq!(units.describe(500.0, UnitKind::Power), "500W");
        assert_eq!(units.describe(20000.0, UnitKind::Power), "20kW");
        assert_eq!(units.describe(0.25, UnitKind::Volume), "250mL");
        assert_eq!(units.describe(0.0, UnitKind::Mass), "0g");
    }
}
