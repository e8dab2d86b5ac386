use argminmax::ArgMinMax;

/// Candidate distances between two axis labels, smallest first.
const AXIS_STEPS: [f64; 60] = [
    0.0001, 0.0002, 0.0004, 0.0005, 0.0006, 0.0008, 0.001, 0.002, 0.004, 0.005, 0.006, 0.008,
    0.01, 0.02, 0.04, 0.05, 0.06, 0.08, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.8, 1.0, 2.0, 3.0, 4.0,
    5.0, 6.0, 8.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 80.0, 100.0, 200.0, 300.0, 400.0, 500.0,
    600.0, 800.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 8000.0, 10000.0, 20000.0,
    30000.0, 40000.0, 50000.0, 60000.0, 80000.0,
];

/// Target number of labels on a price axis.
pub const MAX_AXIS_LABELS: usize = 10;

/// Axis labels for a price range, lowest first, spaced by `step`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    pub step: f64,
    pub labels: Vec<f64>,
}

#[inline]
pub(crate) fn get_max(vec: &[f64]) -> Option<f64> {
    if vec.is_empty() {
        return None;
    }
    let max_index: usize = vec.argmax();
    Some(vec[max_index])
}

#[inline]
pub(crate) fn get_min(vec: &[f64]) -> Option<f64> {
    if vec.is_empty() {
        return None;
    }
    let min_index: usize = vec.argmin();
    Some(vec[min_index])
}

/// Picks the smallest ladder step that is at least `range / (MAX_AXIS_LABELS - 2)`, then
/// lays labels from the step multiple at or below `min` to the first multiple above `max`.
pub fn scale_axis(min: f64, max: f64) -> AxisScale {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let quot = (hi - lo) / (MAX_AXIS_LABELS - 2) as f64;

    let step = AXIS_STEPS
        .iter()
        .copied()
        .find(|&s| quot <= s)
        .unwrap_or(AXIS_STEPS[AXIS_STEPS.len() - 1]);

    let first = (lo / step).floor() * step;
    let last = ((hi / step).floor() + 1.0) * step;
    let count = ((last - first) / step + 1.0).round() as usize;

    let labels = (0..count)
        .map(|i| ((first + i as f64 * step) * 10_000.0).round() / 10_000.0)
        .collect();
    AxisScale { step, labels }
}

/// Rounds a price to a precision that depends on its magnitude.
pub fn round_price(price: f64) -> f64 {
    let abs = price.abs();
    let decimals = if abs >= 10_000.0 {
        0
    } else if abs >= 1000.0 {
        1
    } else if abs >= 10.0 {
        2
    } else if abs >= 0.1 {
        3
    } else if abs >= 0.01 {
        4
    } else {
        5
    };
    let scale = 10f64.powi(decimals);
    (price * scale).round() / scale
}
