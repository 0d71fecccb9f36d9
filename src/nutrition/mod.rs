//! Turning free-form model output into canonical nutrition estimates.

pub mod normalize;
pub mod repair;
pub mod types;
pub mod validate;

pub use normalize::{normalize_estimate, NormalizeError};
pub use types::{Macronutrients, NutritionEstimate, NutritionRecord, StoredMacros};
pub use validate::{Correction, Validated};
