//! Imputation module for handling missing values.
//!
//! Quantities are filled with the median, delivery statuses with the mode.

mod statistical;

pub use statistical::{Imputed, StatisticalImputer};
