//! Weight-unit conversion between kilograms and bags.
//!
//! Stock is persisted in bags; all user-facing weight entry and display is
//! in kilograms. The conversion factor is fixed: 1 bag = 30 kg. Bag
//! quantities are rounded to 2 decimals at every persist point, so the
//! round trip is exact for multiples of 30 kg and lossy-but-documented
//! otherwise (100 kg → 3.33 bags → 99.9 kg).

/// Kilograms per bag. Fixed, not configurable.
pub const KG_PER_BAG: f64 = 30.0;

/// Round to 2 decimal places (the precision stock is persisted at).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a kilogram quantity to bags, rounded to 2 decimals.
pub fn kg_to_bags(kg: f64) -> f64 {
    round2(kg / KG_PER_BAG)
}

/// Convert a bag quantity to kilograms, rounded to 2 decimals.
pub fn bags_to_kg(bags: f64) -> f64 {
    round2(bags * KG_PER_BAG)
}
