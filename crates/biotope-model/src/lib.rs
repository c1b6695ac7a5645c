//! Presence/absence modeling for Biotope.
//!
//! A [`Model`] composes environmental layers (anything implementing
//! [`CovariateSource`]) with species presence and pseudo-absence grids
//! into a [`BaseTable`] holding one row per labeled cell and one
//! covariate column per layer. It then fits an [`Algorithm`], evaluates
//! discrimination with ROC/AUC, and cross-validates with seeded folds.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod algorithm;
pub mod covariate;
pub mod crossval;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod table;

pub use algorithm::{Algorithm, TrainedModel};
pub use covariate::{Covariate, CovariateSource, GridSpec};
pub use crossval::CrossValidation;
pub use error::ModelError;
pub use evaluate::{evaluate_scores, Evaluation};
pub use model::{Model, ModelConfig};
pub use table::BaseTable;
