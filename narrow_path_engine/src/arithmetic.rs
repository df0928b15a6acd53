/// Narrow Path Engine — Arithmetic Primitives
///
/// All axis values and deltas: i64 fixed-point (SCALE = 10_000).
/// Floats only appear at the conversion boundary.

/// Fixed-point scale factor. 1.0 on any axis is stored as `SCALE` units.
pub const SCALE: i64 = 10_000;

/// Convert a fraction (1.0 == full axis) to fixed-point units,
/// rounding to the nearest unit. Non-finite input converts to 0.
pub fn units_from_fraction(fraction: f64) -> i64 {
    if !fraction.is_finite() {
        return 0;
    }
    let scaled = (fraction * SCALE as f64).round();
    // `as` saturates at the i64 range for out-of-range floats.
    scaled as i64
}

/// Convert fixed-point units back to a fraction.
pub fn fraction_from_units(units: i64) -> f64 {
    units as f64 / SCALE as f64
}

/// Whole percentage (0..=100 for in-range values), truncated.
pub fn percent_from_units(units: i64) -> i64 {
    units * 100 / SCALE
}

/// Apply a signed delta and clamp the result to `[0, SCALE]`.
/// Saturating, so no delta magnitude can overflow.
pub fn apply_clamped(value: i64, delta: i64) -> i64 {
    value.saturating_add(delta).clamp(0, SCALE)
}

/// True if `units` lies within `[0, SCALE]`.
pub fn in_unit_range(units: i64) -> bool {
    (0..=SCALE).contains(&units)
}
