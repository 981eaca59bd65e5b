use crate::effects::{self, Effects, FeaturePair};
use crate::grid::{FeatureGrid, GridError, GridStrategy};
use crate::model::{ModelError, PredictSurface};
use crate::partial_dependence::{Evaluator, PartialDependenceCurve};
use crate::table::Table;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::BTreeMap;
use thiserror::Error;

/// Options to build a [`Fingerprint`].
#[derive(Debug, Clone)]
pub struct FingerprintOptions {
    num_values: usize,
    grid_strategy: GridStrategy,
    parallel: bool,
}

impl FingerprintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of grid values swept per feature.
    ///
    /// The default is `50`. Features with fewer distinct observations get
    /// correspondingly smaller grids.
    pub fn num_values(mut self, num_values: usize) -> Self {
        self.num_values = num_values;
        self
    }

    /// How grid values are drawn from each feature column.
    pub fn grid_strategy(mut self, strategy: GridStrategy) -> Self {
        self.grid_strategy = strategy;
        self
    }

    /// If `true`, model sweeps are spread across rayon workers.
    ///
    /// The default is `false`. Results are identical either way.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build<'a, S>(self, surface: &'a S, table: &'a Table<'a>) -> Fingerprint<'a, S> {
        Fingerprint {
            surface,
            table,
            options: self,
            state: None,
        }
    }
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            num_values: 50,
            grid_strategy: GridStrategy::default(),
            parallel: false,
        }
    }
}

/// Model fingerprint: linear, non-linear and pairwise effects of each
/// feature on a model's predictions, decomposed from partial-dependence
/// curves.
///
/// Follows Li, Turkington and Yazdani, "Beyond the black box: an intuitive
/// approach to investment prediction with machine learning" (2020).
#[derive(Debug)]
pub struct Fingerprint<'a, S> {
    surface: &'a S,
    table: &'a Table<'a>,
    options: FingerprintOptions,
    state: Option<FittedState>,
}

#[derive(Debug)]
struct FittedState {
    grid: FeatureGrid,
    curves: Vec<PartialDependenceCurve>,
    linear: Effects<usize>,
    non_linear: Effects<usize>,
    pair_wise: Effects<FeaturePair>,
}

impl<'a, S> Fingerprint<'a, S> {
    /// Fingerprint of `surface` over the observations in `table`, with
    /// default options.
    pub fn new(surface: &'a S, table: &'a Table<'a>) -> Self {
        FingerprintOptions::new().build(surface, table)
    }

    pub fn features_len(&self) -> usize {
        self.table.columns_len()
    }

    /// Linear effect per feature, keyed by feature index.
    pub fn linear_effect(&self) -> Result<&Effects<usize>, FingerprintError> {
        Ok(&self.fitted()?.linear)
    }

    /// Non-linear effect per feature, keyed by feature index.
    pub fn non_linear_effect(&self) -> Result<&Effects<usize>, FingerprintError> {
        Ok(&self.fitted()?.non_linear)
    }

    /// Pairwise effects computed so far via
    /// [`get_pairwise_effect`](Self::get_pairwise_effect).
    pub fn pair_wise_effect(&self) -> Result<&Effects<FeaturePair>, FingerprintError> {
        Ok(&self.fitted()?.pair_wise)
    }

    /// The stored partial-dependence curve of one feature.
    pub fn partial_dependence(
        &self,
        feature: usize,
    ) -> Result<&PartialDependenceCurve, FingerprintError> {
        let state = self.fitted()?;
        state
            .curves
            .get(feature)
            .ok_or(FingerprintError::FeatureOutOfRange {
                index: feature,
                features: self.table.columns_len(),
            })
    }

    fn fitted(&self) -> Result<&FittedState, FingerprintError> {
        self.state.as_ref().ok_or(FingerprintError::NotFitted)
    }
}

impl<'a, S: PredictSurface + Sync> Fingerprint<'a, S> {
    /// Builds the per-feature grids, sweeps every feature's partial
    /// dependence through the model and derives the linear and non-linear
    /// effects.
    ///
    /// On success any previously fitted state is replaced, including
    /// pairwise effects, which start out empty again. On failure the
    /// previous state is kept as is.
    pub fn fit(&mut self) -> Result<(), FingerprintError> {
        let grid = FeatureGrid::build(
            self.table,
            self.options.num_values,
            self.options.grid_strategy,
        )?;
        let evaluator = Evaluator::new(self.surface, self.table);

        let features = self.table.columns_len();
        let curves = if self.options.parallel {
            (0..features)
                .into_par_iter()
                .map(|i| evaluator.curve(i, grid.feature(i)))
                .collect::<Result<Vec<_>, ModelError>>()?
        } else {
            (0..features)
                .map(|i| evaluator.curve(i, grid.feature(i)))
                .collect::<Result<Vec<_>, ModelError>>()?
        };

        let linear = Effects::from_raw(
            curves
                .iter()
                .map(|curve| (curve.feature(), effects::linear_effect(curve)))
                .collect::<BTreeMap<_, _>>(),
        );
        let non_linear = Effects::from_raw(
            curves
                .iter()
                .map(|curve| (curve.feature(), effects::non_linear_effect(curve)))
                .collect::<BTreeMap<_, _>>(),
        );

        self.state = Some(FittedState {
            grid,
            curves,
            linear,
            non_linear,
            pair_wise: Effects::new(),
        });
        Ok(())
    }

    /// Computes the interaction effect of each requested feature pair and
    /// merges the results into the stored pairwise mapping, renormalizing
    /// it as a whole.
    ///
    /// Pairs computed by earlier calls stay untouched unless re-requested,
    /// in which case they are recomputed and overwritten. `(a, b)` and
    /// `(b, a)` are distinct entries. On failure the stored mapping is left
    /// exactly as it was, even for pairs that had already been evaluated
    /// within the failing call.
    pub fn get_pairwise_effect(
        &mut self,
        pairs: &[(usize, usize)],
    ) -> Result<&Effects<FeaturePair>, FingerprintError> {
        let features = self.table.columns_len();
        let state = self.state.as_mut().ok_or(FingerprintError::NotFitted)?;

        for &(a, b) in pairs {
            for index in [a, b] {
                if index >= features {
                    return Err(FingerprintError::FeatureOutOfRange { index, features });
                }
            }
            if a == b {
                return Err(FingerprintError::DegeneratePair { index: a });
            }
        }

        let evaluator = Evaluator::new(self.surface, self.table);
        let grid = &state.grid;
        let curves = &state.curves;
        let compute = |&(a, b): &(usize, usize)| -> Result<(FeaturePair, f64), ModelError> {
            let surface = evaluator.pair_surface(a, b, grid.feature(a), grid.feature(b))?;
            let raw = effects::pair_wise_effect(&surface, &curves[a], &curves[b]);
            Ok((FeaturePair(a, b), raw))
        };
        let computed = if self.options.parallel {
            pairs
                .into_par_iter()
                .map(compute)
                .collect::<Result<Vec<_>, ModelError>>()?
        } else {
            pairs
                .iter()
                .map(compute)
                .collect::<Result<Vec<_>, ModelError>>()?
        };

        state.pair_wise.merge(computed);
        Ok(&state.pair_wise)
    }
}

#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum FingerprintError {
    #[error("`num_values` must be at least 2 to span a feature's range, got {got}")]
    InvalidNumValues { got: usize },

    #[error("feature index {index} is out of range for a table with {features} features")]
    FeatureOutOfRange { index: usize, features: usize },

    #[error("a pairwise effect needs two distinct features, got ({index}, {index})")]
    DegeneratePair { index: usize },

    #[error("model evaluation failed")]
    ModelEvaluation(#[from] ModelError),

    #[error("`fit` must be called before effects are available")]
    NotFitted,
}

impl From<GridError> for FingerprintError {
    fn from(error: GridError) -> Self {
        match error {
            GridError::InvalidNumValues { got } => Self::InvalidNumValues { got },
        }
    }
}
