//! Feature-space helpers for clustering over normalized vectors.
//!
//! The correlation analyzer clusters incidents in a combined space of
//! z-scored coordinates and cyclically encoded time-of-week. The cyclic
//! encoding maps a value with period `p` onto the unit circle, so hour 23
//! and hour 0 come out adjacent instead of a full day apart.

/// Z-scores a slice using the population standard deviation.
///
/// A zero-variance slice collapses to all zeros rather than dividing by
/// zero, which keeps a degenerate axis from poisoning distances.
#[must_use]
pub fn zscore(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    let mean = values.iter().sum::<f64>() / len;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / len;
    let std_dev = variance.sqrt();

    if std_dev < f64::EPSILON {
        return vec![0.0; values.len()];
    }

    values.iter().map(|v| (v - mean) / std_dev).collect()
}

/// Maps a cyclic value with the given period onto the unit circle,
/// returning the `(sin, cos)` pair.
#[must_use]
pub fn cyclic_pair(value: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * std::f64::consts::PI * value / period;
    (angle.sin(), angle.cos())
}

/// Euclidean distance between two equal-length feature vectors.
#[must_use]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Shortest circular distance between two bucket indices with the given
/// period (e.g. days 6 and 0 are 1 apart with period 7).
#[must_use]
pub const fn cyclic_bucket_distance(a: u32, b: u32, period: u32) -> u32 {
    let forward = (a + period - b % period) % period;
    let backward = (b + period - a % period) % period;
    if forward < backward { forward } else { backward }
}
