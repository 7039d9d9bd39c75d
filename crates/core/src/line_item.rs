//! Sale/purchase document lines.

use serde::{Deserialize, Serialize};

/// One row of a sale or purchase document.
///
/// The line total is derived, never stored: it always equals
/// `quantity_kg * rate`, so it cannot drift out of sync when the quantity
/// or rate changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_name: String,
    /// Quantity in kilograms (user-facing unit).
    #[serde(default)]
    pub quantity_kg: f64,
    /// Currency per kilogram.
    #[serde(default)]
    pub rate: f64,
}

impl LineItem {
    pub fn new(item_name: impl Into<String>, quantity_kg: f64, rate: f64) -> Self {
        Self {
            item_name: item_name.into(),
            quantity_kg,
            rate,
        }
    }

    /// Line total = quantity × rate.
    pub fn total(&self) -> f64 {
        self.quantity_kg * self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tracks_quantity_and_rate() {
        let mut line = LineItem::new("Wheat", 60.0, 2.5);
        assert_eq!(line.total(), 150.0);

        line.quantity_kg = 90.0;
        assert_eq!(line.total(), 225.0);

        line.rate = 3.0;
        assert_eq!(line.total(), 270.0);
    }

    #[test]
    fn missing_quantity_deserializes_as_zero() {
        let line: LineItem = serde_json::from_str(r#"{"item_name":"Rice"}"#).unwrap();
        assert_eq!(line.quantity_kg, 0.0);
        assert_eq!(line.total(), 0.0);
    }
}
