use crate::functions;
use crate::model::{ModelError, PredictSurface};
use crate::table::Table;
use itertools::Itertools;

/// Partial dependence of the model on a single feature: the mean prediction
/// over all observed rows with that feature forced to each grid value.
#[derive(Debug, Clone)]
pub struct PartialDependenceCurve {
    feature: usize,
    points: Vec<(f64, f64)>,
}

impl PartialDependenceCurve {
    pub(crate) fn new(feature: usize, points: Vec<(f64, f64)>) -> Self {
        Self { feature, points }
    }

    pub fn feature(&self) -> usize {
        self.feature
    }

    /// `(grid value, mean prediction)` pairs, grid values strictly
    /// increasing.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn grid_values(&self) -> impl '_ + Iterator<Item = f64> + Clone {
        self.points.iter().map(|&(value, _)| value)
    }

    pub fn mean_predictions(&self) -> impl '_ + Iterator<Item = f64> + Clone {
        self.points.iter().map(|&(_, mean)| mean)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Joint partial dependence over the outer product of two grids, row-major
/// in the first feature's grid.
#[derive(Debug, Clone)]
pub(crate) struct PairSurface {
    means: Vec<f64>,
    columns: usize,
}

impl PairSurface {
    #[cfg(test)]
    pub(crate) fn new(means: Vec<f64>, columns: usize) -> Self {
        Self { means, columns }
    }

    pub(crate) fn values(&self) -> &[f64] {
        &self.means
    }

    pub(crate) fn value(&self, row: usize, column: usize) -> f64 {
        self.means[row * self.columns + column]
    }
}

/// Sweeps grid values through the model, averaging its predictions over the
/// observed rows.
#[derive(Debug)]
pub(crate) struct Evaluator<'a, S> {
    surface: &'a S,
    table: &'a Table<'a>,
}

impl<'a, S: PredictSurface> Evaluator<'a, S> {
    pub(crate) fn new(surface: &'a S, table: &'a Table<'a>) -> Self {
        Self { surface, table }
    }

    pub(crate) fn curve(
        &self,
        feature: usize,
        grid: &[f64],
    ) -> Result<PartialDependenceCurve, ModelError> {
        let mut points = Vec::with_capacity(grid.len());
        for &value in grid {
            let forced = vec![value; self.table.rows_len()];
            let modified = self.table.with_column(feature, &forced);
            points.push((value, self.mean_prediction(&modified)?));
        }
        Ok(PartialDependenceCurve::new(feature, points))
    }

    pub(crate) fn pair_surface(
        &self,
        feature_a: usize,
        feature_b: usize,
        grid_a: &[f64],
        grid_b: &[f64],
    ) -> Result<PairSurface, ModelError> {
        let mut means = Vec::with_capacity(grid_a.len() * grid_b.len());
        for (&value_a, &value_b) in grid_a.iter().cartesian_product(grid_b.iter()) {
            let forced_a = vec![value_a; self.table.rows_len()];
            let forced_b = vec![value_b; self.table.rows_len()];
            let modified = self.table.with_column(feature_a, &forced_a);
            let modified = modified.with_column(feature_b, &forced_b);
            means.push(self.mean_prediction(&modified)?);
        }
        Ok(PairSurface {
            means,
            columns: grid_b.len(),
        })
    }

    fn mean_prediction(&self, table: &Table<'_>) -> Result<f64, ModelError> {
        let predictions = self.surface.predict_surface(table)?;
        if predictions.len() != table.rows_len() {
            return Err(ModelError::PredictionCountMismatch {
                got: predictions.len(),
                expected: table.rows_len(),
            });
        }
        if let Some(row) = predictions.iter().position(|p| !p.is_finite()) {
            return Err(ModelError::NonFinitePrediction { row });
        }
        Ok(functions::mean(predictions.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Regression, RegressionModel};

    struct SumModel;

    impl RegressionModel for SumModel {
        fn predict(&self, table: &Table<'_>) -> Result<Vec<f64>, ModelError> {
            Ok((0..table.rows_len())
                .map(|row| table.row(row).sum::<f64>())
                .collect())
        }
    }

    fn table_fixture() -> (Vec<f64>, Vec<f64>) {
        (vec![0.0, 1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0, 40.0])
    }

    #[test]
    fn curve_averages_over_forced_rows() -> Result<(), anyhow::Error> {
        let (c0, c1) = table_fixture();
        let table = Table::new(vec![&c0, &c1])?;
        let surface = Regression(SumModel);
        let evaluator = Evaluator::new(&surface, &table);

        // Forcing feature 0 leaves the mean of feature 1 (25.0) in place.
        let curve = evaluator.curve(0, &[0.0, 2.0])?;
        assert_eq!(curve.feature(), 0);
        assert_eq!(curve.points(), [(0.0, 25.0), (2.0, 27.0)]);

        let curve = evaluator.curve(1, &[10.0, 40.0])?;
        assert_eq!(curve.points(), [(10.0, 11.5), (40.0, 41.5)]);
        Ok(())
    }

    #[test]
    fn pair_surface_covers_the_grid_product() -> Result<(), anyhow::Error> {
        let (c0, c1) = table_fixture();
        let table = Table::new(vec![&c0, &c1])?;
        let surface = Regression(SumModel);
        let evaluator = Evaluator::new(&surface, &table);

        let pair = evaluator.pair_surface(0, 1, &[0.0, 1.0], &[10.0, 20.0, 30.0])?;
        assert_eq!(pair.values(), [10.0, 20.0, 30.0, 11.0, 21.0, 31.0]);
        assert_eq!(pair.value(1, 2), 31.0);
        Ok(())
    }

    #[test]
    fn prediction_count_mismatch_is_reported() -> Result<(), anyhow::Error> {
        struct ShortModel;

        impl RegressionModel for ShortModel {
            fn predict(&self, _table: &Table<'_>) -> Result<Vec<f64>, ModelError> {
                Ok(vec![1.0])
            }
        }

        let (c0, c1) = table_fixture();
        let table = Table::new(vec![&c0, &c1])?;
        let surface = Regression(ShortModel);
        let evaluator = Evaluator::new(&surface, &table);

        assert!(matches!(
            evaluator.curve(0, &[0.0]),
            Err(ModelError::PredictionCountMismatch {
                got: 1,
                expected: 4
            })
        ));
        Ok(())
    }

    #[test]
    fn non_finite_predictions_are_reported() -> Result<(), anyhow::Error> {
        struct NanModel;

        impl RegressionModel for NanModel {
            fn predict(&self, table: &Table<'_>) -> Result<Vec<f64>, ModelError> {
                let mut predictions = vec![0.0; table.rows_len()];
                predictions[2] = f64::NAN;
                Ok(predictions)
            }
        }

        let (c0, c1) = table_fixture();
        let table = Table::new(vec![&c0, &c1])?;
        let surface = Regression(NanModel);
        let evaluator = Evaluator::new(&surface, &table);

        assert!(matches!(
            evaluator.curve(0, &[0.0]),
            Err(ModelError::NonFinitePrediction { row: 2 })
        ));
        Ok(())
    }
}
