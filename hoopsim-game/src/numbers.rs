//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the u16 range, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_u16(value: f64) -> u16 {
    if !value.is_finite() {
        return 0;
    }
    let clamped = value.clamp(0.0, f64::from(u16::MAX)).round();
    cast::<f64, u16>(clamped).unwrap_or(0)
}

/// Convert a collection length to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Whole seconds remaining on a clock, rounded up so that 0.4s still reads as 1.
#[must_use]
pub fn ceil_seconds(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, u32>(value.ceil()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_rounding_clamps_and_handles_non_finite() {
        assert_eq!(round_f64_to_u16(1.6), 2);
        assert_eq!(round_f64_to_u16(-4.0), 0);
        assert_eq!(round_f64_to_u16(f64::NAN), 0);
        assert_eq!(round_f64_to_u16(1.0e9), u16::MAX);
    }

    #[test]
    fn ceil_seconds_rounds_up_partial_seconds() {
        assert_eq!(ceil_seconds(0.4), 1);
        assert_eq!(ceil_seconds(12.0), 12);
        assert_eq!(ceil_seconds(-3.0), 0);
        assert_eq!(ceil_seconds(f64::INFINITY), 0);
        assert!((usize_to_f64(5) - 5.0).abs() < f64::EPSILON);
    }
}
