//! Exchange-agnostic domain types.
//!
//! Value types shared by the validator, fill simulator, and execution
//! engine. Everything here is immutable snapshot data; the only stateful
//! types live in [`crate::engine`].

pub mod detector;
pub mod ids;
pub mod market;
pub mod money;
pub mod opportunity;
pub mod trade;

pub use detector::Detector;
pub use ids::{MarketId, OpportunityId, OutcomeId, VenueId};
pub use market::{Market, MarketError, MarketLookup, Outcome};
pub use money::{bps_to_rate, Price, Quantity};
pub use opportunity::{Opportunity, OpportunityBuildError, OpportunityBuilder};
pub use trade::{Fill, Side, TradeAction};
