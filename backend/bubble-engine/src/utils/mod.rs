// Utility functions for bubble-engine

/// Round half towards positive infinity (`-2.25 -> -2.2`, `2.25 -> 2.3`).
///
/// `f64::round` rounds half away from zero, which disagrees on negative
/// affinities, so every report goes through this helper instead.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Whole-number share of `part` in `whole`, 0 when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> u32 {
    if whole == 0.0 {
        return 0;
    }
    round_half_up(part / whole * 100.0).max(0.0) as u32
}

/// Clamp a percentage-like integer into [0, 100]
pub fn clamp_percent(value: i64) -> u32 {
    value.clamp(0, 100) as u32
}
