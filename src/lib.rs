pub use effects::{Effects, FeaturePair};
pub use fingerprint::{Fingerprint, FingerprintError, FingerprintOptions};
pub use grid::{FeatureGrid, GridError, GridStrategy};
pub use model::{
    Classification, ClassificationModel, ModelError, PredictSurface, Regression, RegressionModel,
};
pub use partial_dependence::PartialDependenceCurve;
pub use table::{Table, TableError};

mod effects;
mod fingerprint;
mod functions;
mod grid;
mod model;
mod partial_dependence;
mod table;
