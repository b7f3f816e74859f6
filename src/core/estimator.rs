//! Offset Estimator (component G).
//!
//! Turns accepted alignment matches into weighted `(t, delta)` points,
//! rejects outliers via MAD, and chooses between a constant (uniform)
//! offset and a piecewise-linear (interpolated) one.

use crate::core::aligner::AlignmentMatch;

/// A single offset measurement: subtitles must be delayed by `delta`
/// seconds at time `t` to match the video. `weight` is always > 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetPoint {
    pub t: f64,
    pub delta: f64,
    pub weight: f32,
}

/// The estimated offset function.
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetFunction {
    /// A single constant delta applied everywhere.
    Uniform(f64),
    /// Piecewise-linear between sorted `(t, delta)` anchor points, flat
    /// beyond the first/last point.
    Interpolated(Vec<(f64, f64)>),
}

impl OffsetFunction {
    /// Evaluate the offset at time `t`.
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            OffsetFunction::Uniform(delta) => *delta,
            OffsetFunction::Interpolated(points) => {
                if points.is_empty() {
                    return 0.0;
                }
                if t <= points[0].0 {
                    return points[0].1;
                }
                if t >= points[points.len() - 1].0 {
                    return points[points.len() - 1].1;
                }
                for w in points.windows(2) {
                    let (t_a, d_a) = w[0];
                    let (t_b, d_b) = w[1];
                    if t >= t_a && t <= t_b {
                        if (t_b - t_a).abs() < f64::EPSILON {
                            return d_a;
                        }
                        let frac = (t - t_a) / (t_b - t_a);
                        return d_a + frac * (d_b - d_a);
                    }
                }
                points[points.len() - 1].1
            }
        }
    }
}

/// Outlier-rejection threshold floor, in seconds, applied alongside
/// `2.5 * MAD`.
const OUTLIER_FLOOR_SECS: f64 = 1.5;
const OUTLIER_MAD_MULTIPLIER: f64 = 2.5;
/// If rejecting outliers would remove more than this fraction of points,
/// abort rejection entirely (insufficient confidence to filter).
const MAX_REJECTION_FRACTION: f64 = 0.40;
/// Variance (std-dev) threshold below which uniform mode is preferred.
const UNIFORM_STD_DEV_THRESHOLD: f64 = 1.5;

/// Build offset points from sorted alignment matches. Matches must already
/// be sorted by `start_time` (the Synchronizer guarantees this before
/// calling in).
pub fn build_points(matches: &[AlignmentMatch]) -> Vec<OffsetPoint> {
    matches
        .iter()
        .map(|m| OffsetPoint {
            t: m.start_time,
            delta: (m.minute as f64) * 60.0 - m.start_time,
            weight: m.similarity,
        })
        .collect()
}

/// Reject statistical outliers from `points` using MAD, per spec: with <= 3
/// points keep all; with 4+, reject points whose absolute deviation from
/// the median exceeds `max(2.5*MAD, 1.5s)`, unless that would drop more
/// than 40% of points (in which case keep all).
pub fn reject_outliers(points: &[OffsetPoint]) -> Vec<OffsetPoint> {
    if points.len() <= 3 {
        return points.to_vec();
    }

    let mut deltas: Vec<f64> = points.iter().map(|p| p.delta).collect();
    let median = median(&mut deltas);

    let mut abs_devs: Vec<f64> = points.iter().map(|p| (p.delta - median).abs()).collect();
    let mad = median(&mut abs_devs);

    let cutoff = (OUTLIER_MAD_MULTIPLIER * mad).max(OUTLIER_FLOOR_SECS);

    let survivors: Vec<OffsetPoint> = points
        .iter()
        .filter(|p| (p.delta - median).abs() <= cutoff)
        .copied()
        .collect();

    let rejected_fraction = 1.0 - (survivors.len() as f64 / points.len() as f64);
    if rejected_fraction > MAX_REJECTION_FRACTION {
        points.to_vec()
    } else {
        survivors
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Weighted mean and (population) standard deviation of `points`' deltas.
pub fn weighted_mean_std_dev(points: &[OffsetPoint]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let total_weight: f64 = points.iter().map(|p| p.weight as f64).sum();
    if total_weight <= 0.0 {
        return (0.0, 0.0);
    }
    let mean = points.iter().map(|p| p.weight as f64 * p.delta).sum::<f64>() / total_weight;
    let variance = points
        .iter()
        .map(|p| p.weight as f64 * (p.delta - mean).powi(2))
        .sum::<f64>()
        / total_weight;
    (mean, variance.sqrt())
}

/// Estimate the [`OffsetFunction`] from accepted matches: reject outliers,
/// then pick uniform vs. interpolated mode per the variance rule. Returns
/// the function alongside the surviving points' standard deviation (used
/// by the Synchronizer's multi-pass refinement decision).
pub fn estimate(matches: &[AlignmentMatch]) -> (OffsetFunction, f64) {
    let points = build_points(matches);
    let survivors = reject_outliers(&points);
    let (mean, std_dev) = weighted_mean_std_dev(&survivors);

    if std_dev <= UNIFORM_STD_DEV_THRESHOLD || survivors.len() < 2 {
        (OffsetFunction::Uniform(mean), std_dev)
    } else {
        let mut sorted = survivors;
        sorted.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
        let anchors: Vec<(f64, f64)> = sorted.iter().map(|p| (p.t, p.delta)).collect();
        (OffsetFunction::Interpolated(anchors), std_dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(t: f64, delta: f64, weight: f32) -> OffsetPoint {
        OffsetPoint { t, delta, weight }
    }

    #[test]
    fn identity_offset_stays_zero() {
        let points = vec![point(0.0, 0.0, 0.9), point(300.0, 0.0, 0.9), point(600.0, 0.0, 0.9)];
        let survivors = reject_outliers(&points);
        let (mean, std_dev) = weighted_mean_std_dev(&survivors);
        assert!((mean - 0.0).abs() < 1e-9);
        assert!(std_dev < 1e-9);
    }

    #[test]
    fn constant_offset_is_recovered() {
        let points = vec![
            point(0.0, 30.0, 0.9),
            point(300.0, 30.0, 0.9),
            point(600.0, 30.0, 0.9),
            point(900.0, 30.0, 0.9),
        ];
        let survivors = reject_outliers(&points);
        let (mean, _) = weighted_mean_std_dev(&survivors);
        assert!((mean - 30.0).abs() < 1e-9);
    }

    #[test]
    fn one_bad_measurement_is_rejected() {
        let points = vec![
            point(0.0, 30.0, 0.95),
            point(300.0, 30.0, 0.92),
            point(600.0, 30.0, 0.90),
            point(900.0, 6.8, 0.61),
        ];
        let survivors = reject_outliers(&points);
        assert_eq!(survivors.len(), 3);
        let (mean, _) = weighted_mean_std_dev(&survivors);
        assert!((mean - 30.0).abs() < 0.2);
    }

    #[test]
    fn fewer_than_four_bypasses_outlier_filter() {
        let points = vec![point(0.0, 0.0, 0.9), point(300.0, 1000.0, 0.5)];
        let survivors = reject_outliers(&points);
        assert_eq!(survivors.len(), 2);
    }

    #[test]
    fn excessive_rejection_is_aborted() {
        // 4 points where MAD-based rejection would drop more than 40%.
        let points = vec![
            point(0.0, 0.0, 0.9),
            point(300.0, 100.0, 0.9),
            point(600.0, 200.0, 0.9),
            point(900.0, 300.0, 0.9),
        ];
        let survivors = reject_outliers(&points);
        assert_eq!(survivors.len(), points.len());
    }

    #[test]
    fn low_variance_selects_uniform_mode() {
        let matches = vec![];
        let (func, _) = estimate(&matches);
        assert!(matches!(func, OffsetFunction::Uniform(_)));
        let _ = func.eval(100.0);
    }

    #[test]
    fn piecewise_drift_selects_interpolated_mode_and_matches_points() {
        let points = vec![
            point(300.0, 60.0, 0.9),
            point(1800.0, -60.0, 0.9),
            point(3300.0, 30.0, 0.9),
        ];
        let (mean, std_dev) = weighted_mean_std_dev(&points);
        assert!(std_dev > UNIFORM_STD_DEV_THRESHOLD);
        let _ = mean;

        let func = OffsetFunction::Interpolated(points.iter().map(|p| (p.t, p.delta)).collect());
        assert!((func.eval(300.0) - 60.0).abs() < 1e-9);
        // Linear interpolation between (300, 60) and (1800, -60).
        assert!((func.eval(600.0) - 36.0).abs() < 1e-6);
        assert!((func.eval(1800.0) - (-60.0)).abs() < 1e-9);
        assert!((func.eval(2550.0) - (-15.0)).abs() < 1e-6);
        assert!((func.eval(3300.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn interpolated_mode_is_flat_beyond_ends() {
        let func = OffsetFunction::Interpolated(vec![(100.0, 5.0), (200.0, 10.0)]);
        assert_eq!(func.eval(0.0), 5.0);
        assert_eq!(func.eval(1000.0), 10.0);
    }

    #[test]
    fn permutation_invariance() {
        let matches_a = sample_matches();
        let mut matches_b = matches_a.clone();
        matches_b.reverse();

        let (func_a, std_a) = estimate(&matches_a);
        let (func_b, std_b) = estimate(&matches_b);
        assert_eq!(format!("{func_a:?}"), format!("{func_b:?}"));
        assert!((std_a - std_b).abs() < 1e-9);
    }

    fn sample_matches() -> Vec<AlignmentMatch> {
        vec![
            AlignmentMatch {
                sample_index: 0,
                start_time: 0.0,
                minute: 0,
                similarity: 0.9,
                subtitle_text: String::new(),
                ai_text: String::new(),
            },
            AlignmentMatch {
                sample_index: 1,
                start_time: 300.0,
                minute: 5,
                similarity: 0.9,
                subtitle_text: String::new(),
                ai_text: String::new(),
            },
            AlignmentMatch {
                sample_index: 2,
                start_time: 600.0,
                minute: 10,
                similarity: 0.9,
                subtitle_text: String::new(),
                ai_text: String::new(),
            },
        ]
    }
}
