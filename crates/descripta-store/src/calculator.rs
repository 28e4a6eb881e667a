//! Seam to the external descriptor-computation engine.
//!
//! The store never computes descriptors. It can only ask an engine to
//! rebuild a calculator compatible with the recorded descriptor sets.

use crate::error::StoreResult;
use crate::value::Value;

/// Computes a descriptor row for one molecule.
pub trait DescriptorCalculator: Send + Sync {
    /// Output column names, flags included, in row order.
    fn column_names(&self) -> Vec<String>;

    /// Compute the full row for a molecule representation.
    fn process(&self, moldata: &str) -> StoreResult<Vec<Value>>;
}

/// Builds calculators from descriptor-set identifiers.
pub trait DescriptorEngine {
    /// Build a calculator for `descriptor_sets` (e.g. `["RDKit2D"]`).
    fn build_calculator(&self, descriptor_sets: &[String])
        -> StoreResult<Box<dyn DescriptorCalculator>>;
}
