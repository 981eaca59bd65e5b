use crate::functions;
use crate::partial_dependence::{PairSurface, PartialDependenceCurve};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

/// A pair of feature indices, kept in the order the caller requested them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeaturePair(pub usize, pub usize);

impl fmt::Display for FeaturePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

impl From<(usize, usize)> for FeaturePair {
    fn from((a, b): (usize, usize)) -> Self {
        Self(a, b)
    }
}

/// One family of effect estimates, keyed by feature index or feature pair.
///
/// Raw values are mean absolute deviations on the model's output scale.
/// Normalized values divide each raw value by the family's largest, so the
/// strongest entry reads `1.0`; a family of all-zero raw values normalizes
/// to all zeros.
#[derive(Debug, Clone)]
pub struct Effects<K> {
    raw: BTreeMap<K, f64>,
    normalized: BTreeMap<K, f64>,
}

impl<K: Copy + Ord> Effects<K> {
    pub(crate) fn new() -> Self {
        Self {
            raw: BTreeMap::new(),
            normalized: BTreeMap::new(),
        }
    }

    pub(crate) fn from_raw(raw: BTreeMap<K, f64>) -> Self {
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    /// Inserts or overwrites `entries`, then renormalizes the whole family.
    pub(crate) fn merge(&mut self, entries: impl IntoIterator<Item = (K, f64)>) {
        self.raw.extend(entries);
        self.normalized = normalize(&self.raw);
    }

    pub fn raw(&self, key: K) -> Option<f64> {
        self.raw.get(&key).copied()
    }

    pub fn normalized(&self, key: K) -> Option<f64> {
        self.normalized.get(&key).copied()
    }

    pub fn iter_raw(&self) -> impl '_ + Iterator<Item = (K, f64)> {
        self.raw.iter().map(|(&k, &v)| (k, v))
    }

    pub fn iter_normalized(&self) -> impl '_ + Iterator<Item = (K, f64)> {
        self.normalized.iter().map(|(&k, &v)| (k, v))
    }

    /// Entries sorted by descending raw effect, strongest first.
    pub fn ranked(&self) -> Vec<(K, f64)> {
        let mut entries = self.iter_raw().collect::<Vec<_>>();
        entries.sort_by_key(|&(_, v)| Reverse(OrderedFloat(v)));
        entries
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

fn normalize<K: Copy + Ord>(raw: &BTreeMap<K, f64>) -> BTreeMap<K, f64> {
    let max = raw
        .values()
        .copied()
        .max_by_key(|&v| OrderedFloat(v))
        .unwrap_or(0.0);
    raw.iter()
        .map(|(&k, &v)| (k, if max > 0.0 { v / max } else { 0.0 }))
        .collect()
}

/// Mean absolute deviation of the curve's least-squares line around that
/// line's own mean: the variation a first-order trend captures.
pub(crate) fn linear_effect(curve: &PartialDependenceCurve) -> f64 {
    let fitted = fitted_line(curve);
    let fit_mean = functions::mean(fitted.iter().copied());
    functions::mean(fitted.iter().map(|f| (f - fit_mean).abs()))
}

/// Mean absolute deviation of the curve from its least-squares line: the
/// variation a first-order trend leaves unexplained.
pub(crate) fn non_linear_effect(curve: &PartialDependenceCurve) -> f64 {
    let fitted = fitted_line(curve);
    functions::mean(
        curve
            .mean_predictions()
            .zip(fitted)
            .map(|(y, f)| (y - f).abs()),
    )
}

/// Mean absolute interaction residual: the centered joint surface minus what
/// the two centered univariate curves explain on their own.
pub(crate) fn pair_wise_effect(
    surface: &PairSurface,
    curve_a: &PartialDependenceCurve,
    curve_b: &PartialDependenceCurve,
) -> f64 {
    let centered_a = centered_means(curve_a);
    let centered_b = centered_means(curve_b);
    let surface_mean = functions::mean(surface.values().iter().copied());

    let residuals = centered_a.iter().enumerate().flat_map(|(i, a)| {
        centered_b
            .iter()
            .enumerate()
            .map(move |(j, b)| ((surface.value(i, j) - surface_mean) - a - b).abs())
    });
    functions::mean(residuals)
}

fn fitted_line(curve: &PartialDependenceCurve) -> Vec<f64> {
    let xs = curve.grid_values().collect::<Vec<_>>();
    let ys = curve.mean_predictions().collect::<Vec<_>>();
    let (slope, intercept) = functions::least_squares_line(&xs, &ys);
    xs.iter().map(|x| slope * x + intercept).collect()
}

fn centered_means(curve: &PartialDependenceCurve) -> Vec<f64> {
    let mean = functions::mean(curve.mean_predictions());
    curve.mean_predictions().map(|y| y - mean).collect()
}
