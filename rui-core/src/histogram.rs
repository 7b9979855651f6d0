//! Per-tile workload histogram, scaled for display.

/// Caption shown above the workload graph.
pub const CAPTION: &str = "Splats per tile";

/// Display-ready histogram. Each update replaces the previous one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileHistogram {
    /// Counts scaled into `[0, 1]` by the maximum count.
    pub values: Vec<f32>,
    /// Largest raw count in the sample set.
    pub max: u32,
    /// Summary line, e.g. `max tile: 42`.
    pub header: String,
}

impl TileHistogram {
    /// Scale `counts` by `1 / max`.
    ///
    /// An all-zero (or empty) input uses a scale of 1, so every value comes
    /// out as 0 instead of dividing by zero.
    pub fn normalize(counts: &[u32]) -> Self {
        let max = counts.iter().copied().max().unwrap_or(0);
        let scale = if max == 0 { 1.0 } else { 1.0 / max as f64 };
        let values = counts
            .iter()
            .map(|&c| (c as f64 * scale) as f32)
            .collect();
        Self {
            values,
            max,
            header: format!("max tile: {max}"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_by_maximum() {
        let h = TileHistogram::normalize(&[0, 5, 10, 2]);
        assert_eq!(h.values, vec![0.0, 0.5, 1.0, 0.2]);
        assert_eq!(h.max, 10);
        assert_eq!(h.header, "max tile: 10");
    }

    #[test]
    fn values_in_unit_range_with_a_one() {
        let counts: Vec<u32> = (0..64).map(|i| (i * 37 + 11) % 101).collect();
        let max = *counts.iter().max().unwrap();
        let h = TileHistogram::normalize(&counts);
        assert!(h.values.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(h.values.iter().any(|&v| v == 1.0));
        for (count, value) in counts.iter().zip(&h.values) {
            assert!((value - *count as f32 / max as f32).abs() < 1e-6);
        }
    }

    #[test]
    fn all_zero_counts_normalize_to_zero() {
        let h = TileHistogram::normalize(&[0, 0, 0]);
        assert_eq!(h.values, vec![0.0, 0.0, 0.0]);
        assert_eq!(h.header, "max tile: 0");
    }

    #[test]
    fn empty_input_is_empty_output() {
        let h = TileHistogram::normalize(&[]);
        assert!(h.is_empty());
        assert_eq!(h.max, 0);
    }

    #[test]
    fn large_counts_keep_precision() {
        let h = TileHistogram::normalize(&[u32::MAX, u32::MAX / 2]);
        assert_eq!(h.values[0], 1.0);
        assert!((h.values[1] - 0.5).abs() < 1e-6);
    }
}
