use crate::table::Table;
use thiserror::Error;

/// Batch predictions of a fitted regression model, one scalar per row of the
/// table.
pub trait RegressionModel {
    fn predict(&self, table: &Table<'_>) -> Result<Vec<f64>, ModelError>;
}

/// Batch class probabilities of a fitted classification model, one
/// probability vector per row of the table.
pub trait ClassificationModel {
    fn predict_proba(&self, table: &Table<'_>) -> Result<Vec<Vec<f64>>, ModelError>;
}

/// The scalar surface swept during partial-dependence evaluation.
///
/// Implemented by [`Regression`] and [`Classification`], which read a model's
/// output in the two conventional ways.
pub trait PredictSurface {
    fn predict_surface(&self, table: &Table<'_>) -> Result<Vec<f64>, ModelError>;
}

/// Reads a regression model's predictions directly.
#[derive(Debug, Clone)]
pub struct Regression<M>(pub M);

impl<M: RegressionModel> PredictSurface for Regression<M> {
    fn predict_surface(&self, table: &Table<'_>) -> Result<Vec<f64>, ModelError> {
        self.0.predict(table)
    }
}

/// Reads the probability of one designated class from a classification
/// model.
#[derive(Debug, Clone)]
pub struct Classification<M> {
    model: M,
    positive_class: usize,
}

impl<M: ClassificationModel> Classification<M> {
    /// Wraps `model`, reading class `1`, the positive column of a binary
    /// classifier's probability output.
    pub fn new(model: M) -> Self {
        Self {
            model,
            positive_class: 1,
        }
    }

    /// Reads class `index` instead of class `1`.
    pub fn positive_class(mut self, index: usize) -> Self {
        self.positive_class = index;
        self
    }
}

impl<M: ClassificationModel> PredictSurface for Classification<M> {
    fn predict_surface(&self, table: &Table<'_>) -> Result<Vec<f64>, ModelError> {
        let probabilities = self.model.predict_proba(table)?;
        probabilities
            .into_iter()
            .map(|row| {
                row.get(self.positive_class)
                    .copied()
                    .ok_or(ModelError::PositiveClassOutOfRange {
                        index: self.positive_class,
                        classes: row.len(),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Error, Clone)]
pub enum ModelError {
    #[error("wrapped model failed: {0}")]
    Failed(String),

    #[error("model returned {got} predictions for {expected} rows")]
    PredictionCountMismatch { got: usize, expected: usize },

    #[error("model returned a non-finite prediction for row {row}")]
    NonFinitePrediction { row: usize },

    #[error("class {index} is out of range for a model with {classes} classes")]
    PositiveClassOutOfRange { index: usize, classes: usize },
}

impl ModelError {
    /// Wraps an arbitrary failure reported by the model itself.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed(error.to_string())
    }
}
