use crate::table::Table;
use ordered_float::OrderedFloat;
use thiserror::Error;

/// How representative values are drawn from a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridStrategy {
    /// Observed values at evenly spaced quantile levels (nearest rank).
    ///
    /// Every grid value is one the column actually contains, so a grid never
    /// holds more values than the column has distinct ones.
    Quantile,

    /// Evenly spaced values across the column's `[min, max]` range.
    ///
    /// Interior values are synthetic and need not occur in the column.
    Linspace,
}

impl Default for GridStrategy {
    fn default() -> Self {
        Self::Quantile
    }
}

/// Per-feature representative values swept during partial-dependence
/// evaluation.
///
/// Values are strictly increasing within each feature; duplicates that arise
/// from repeated observations collapse, so a constant column yields a single
/// value.
#[derive(Debug, Clone)]
pub struct FeatureGrid {
    features: Vec<Vec<f64>>,
}

impl FeatureGrid {
    /// Builds one grid per feature column of `table`.
    pub fn build(
        table: &Table<'_>,
        num_values: usize,
        strategy: GridStrategy,
    ) -> Result<Self, GridError> {
        if num_values < 2 {
            return Err(GridError::InvalidNumValues { got: num_values });
        }

        let features = (0..table.columns_len())
            .map(|i| {
                let mut sorted = table.column(i).collect::<Vec<_>>();
                sorted.sort_by_key(|&v| OrderedFloat(v));

                let mut values = match strategy {
                    GridStrategy::Quantile => quantile_values(&sorted, num_values),
                    GridStrategy::Linspace => {
                        linspace_values(sorted[0], sorted[sorted.len() - 1], num_values)
                    }
                };
                values.dedup();
                values
            })
            .collect();
        Ok(Self { features })
    }

    pub fn feature(&self, index: usize) -> &[f64] {
        &self.features[index]
    }

    pub fn features_len(&self) -> usize {
        self.features.len()
    }
}

fn quantile_values(sorted: &[f64], num_values: usize) -> Vec<f64> {
    (0..num_values)
        .map(|k| {
            let level = k as f64 / (num_values - 1) as f64;
            let rank = (level * (sorted.len() - 1) as f64).round() as usize;
            sorted[rank]
        })
        .collect()
}

fn linspace_values(min: f64, max: f64, num_values: usize) -> Vec<f64> {
    (0..num_values)
        .map(|k| min + (max - min) * (k as f64 / (num_values - 1) as f64))
        .collect()
}

#[derive(Debug, Error, Clone)]
pub enum GridError {
    #[error("`num_values` must be at least 2 to span a feature's range, got {got}")]
    InvalidNumValues { got: usize },
}
