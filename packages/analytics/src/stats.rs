//! Small aggregate helpers shared by the analyzers.

/// Arithmetic mean of a slice, or 0.0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

/// Rounds to 2 fractional digits, the precision of the severity, radius,
/// and confidence columns.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to 8 fractional digits, the precision of the coordinate columns.
#[must_use]
pub fn round8(value: f64) -> f64 {
    (value * 100_000_000.0).round() / 100_000_000.0
}

/// Most frequent value in a slice, ties broken by first occurrence.
/// Returns `None` for an empty slice.
#[must_use]
pub fn mode<T: PartialEq>(values: &[T]) -> Option<&T> {
    let mut best: Option<(&T, usize)> = None;

    for value in values {
        let count = values.iter().filter(|v| *v == value).count();
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }

    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_severities() {
        let m = mean(&[2.0, 3.0, 3.0, 4.0, 2.0, 3.0]);
        assert!((m - 17.0 / 6.0).abs() < 1e-12);
        assert!((round2(m) - 2.83).abs() < f64::EPSILON);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert!(mean(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn round2_half_up() {
        assert!((round2(0.005) - 0.01).abs() < f64::EPSILON);
        assert!((round2(1.0 / 3.0) - 0.33).abs() < f64::EPSILON);
    }

    #[test]
    fn round8_keeps_coordinate_precision() {
        assert!((round8(41.878_123_456_789) - 41.878_123_46).abs() < 1e-12);
    }

    #[test]
    fn mode_picks_most_frequent() {
        let values = ["theft", "robbery", "theft", "assault"];
        assert_eq!(mode(&values), Some(&"theft"));
    }

    #[test]
    fn mode_breaks_ties_by_first_occurrence() {
        let values = ["robbery", "theft", "theft", "robbery"];
        assert_eq!(mode(&values), Some(&"robbery"));
    }

    #[test]
    fn mode_of_empty_is_none() {
        assert_eq!(mode::<u32>(&[]), None);
    }
}
