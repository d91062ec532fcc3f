//! Detection strategy seam.
//!
//! Detection algorithms live outside this crate; the engine only needs a
//! single capability from them.

use super::market::Market;
use super::opportunity::Opportunity;

/// A pluggable opportunity detector.
///
/// Implementations scan one cycle's market snapshot and return any
/// opportunities they find. Detectors run in registration order and their
/// results are validated and executed in the order returned.
pub trait Detector {
    /// Stable name used as the detector tag in audit records.
    fn name(&self) -> &str;

    /// Scan the snapshot for opportunities.
    fn detect(&self, markets: &[Market]) -> Vec<Opportunity>;
}
