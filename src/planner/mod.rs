//! Cost estimation for a surrounding query engine
//!
//! [`CardinalityCalculator`] turns a quad pattern into the fraction of stored
//! statements it is expected to match; [`JoinOrderOptimizer`] uses any
//! [`CardinalityEstimator`] to order the patterns of a basic graph pattern.

pub mod cardinality;
pub mod optimizer;

pub use cardinality::{CardinalityCalculator, CardinalityEstimator};
pub use optimizer::{JoinOrderOptimizer, PlannedPattern};
