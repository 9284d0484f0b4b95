use chrono::{DateTime, Utc};

/// A stored measurement of one subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalDensityPoint {
    pub computed_at: DateTime<Utc>,
    pub density_index: f64,
}

/// Signed change of a new measurement against its references. A missing reference
/// yields `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendDelta {
    pub delta_vs_prev: f64,
    pub delta_vs_base: f64,
}

/// Reference values picked from a subject's history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendReferences {
    /// Latest measurement strictly before the evaluation time.
    pub previous: Option<f64>,
    /// Earliest measurement on record.
    pub baseline: Option<f64>,
}

impl TrendReferences {
    /// Picks both references from one snapshot of points so they always describe the
    /// same generation of history. A single point serves as both.
    pub fn from_points(points: &[HistoricalDensityPoint], now: DateTime<Utc>) -> Self {
        let previous = points
            .iter()
            .filter(|p| p.computed_at < now)
            .max_by_key(|p| p.computed_at)
            .map(|p| p.density_index);
        let baseline = points
            .iter()
            .min_by_key(|p| p.computed_at)
            .map(|p| p.density_index);

        Self { previous, baseline }
    }

    pub fn compare(&self, current: f64) -> TrendDelta {
        compare(current, self.previous, self.baseline)
    }
}

pub fn compare(current: f64, previous: Option<f64>, baseline: Option<f64>) -> TrendDelta {
    TrendDelta {
        delta_vs_prev: previous.map_or(0.0, |p| current - p),
        delta_vs_base: baseline.map_or(0.0, |b| current - b),
    }
}
