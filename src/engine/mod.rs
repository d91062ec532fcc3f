//! Stateful execution machinery.
//!
//! - [`venue`] - Per-venue capability lookup
//! - [`ledger`] - Cash, position, and PnL bookkeeping
//! - [`fill`] - Deterministic fill simulation with fees and slippage
//! - [`validator`] - Ordered pre-trade checks
//! - [`audit`] - Append-only execution records with trace ids
//! - [`executor`] - The reserve → fill → settle state machine
//!
//! The [`executor::ExecutionEngine`] owns everything here; the other
//! modules are policy-free building blocks it composes.

pub mod audit;
pub mod executor;
pub mod fill;
pub mod ledger;
pub mod validator;
pub mod venue;

pub use audit::{AuditLog, ExecutionResult, ExecutionStatus, FailureFlag};
pub use executor::{ExecutionEngine, MarketSource};
pub use fill::{CostModel, FillPlan, FillSimulator};
pub use ledger::{LedgerError, LedgerSnapshot, LedgerStore, Position, PositionKey};
pub use validator::{OpportunityValidator, RejectReason, RiskLimits};
pub use venue::{VenueCapability, VenueCapabilityRegistry};
