//! Market-related domain types.
//!
//! - [`Outcome`] - A single tradeable outcome with a quoted price and depth
//! - [`Market`] - A venue-tagged, immutable market snapshot
//! - [`MarketLookup`] - Index of markets by id for one evaluation cycle

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ids::{MarketId, OutcomeId, VenueId};
use super::money::{Price, Quantity};

/// Error returned when a market snapshot violates a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("outcome price {price} is outside [0, 1]")]
    PriceOutOfRange { price: Decimal },

    #[error("outcome liquidity {liquidity} is negative")]
    NegativeLiquidity { liquidity: Decimal },

    #[error("market requires at least one outcome")]
    EmptyOutcomes,
}

/// A single outcome within a market.
///
/// Price is a probability-like quote in `[0, 1]`; liquidity is the quoted
/// depth in currency units available for this outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    outcome_id: OutcomeId,
    label: String,
    price: Price,
    liquidity: Quantity,
}

impl Outcome {
    /// Create a new outcome, validating the price and liquidity ranges.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError`] if the price is outside `[0, 1]` or the
    /// liquidity is negative.
    pub fn try_new(
        outcome_id: OutcomeId,
        label: impl Into<String>,
        price: Price,
        liquidity: Quantity,
    ) -> Result<Self, MarketError> {
        if price < Decimal::ZERO || price > Decimal::ONE {
            return Err(MarketError::PriceOutOfRange { price });
        }
        if liquidity < Decimal::ZERO {
            return Err(MarketError::NegativeLiquidity { liquidity });
        }
        Ok(Self {
            outcome_id,
            label: label.into(),
            price,
            liquidity,
        })
    }

    /// Get the outcome ID.
    #[must_use]
    pub const fn outcome_id(&self) -> &OutcomeId {
        &self.outcome_id
    }

    /// Get the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the quoted price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Get the quoted liquidity.
    #[must_use]
    pub const fn liquidity(&self) -> Quantity {
        self.liquidity
    }
}

/// A venue-tagged market snapshot.
///
/// Owned and created by the external data-acquisition collaborator each
/// polling cycle; immutable for the duration of one evaluation cycle.
#[derive(Debug, Clone)]
pub struct Market {
    market_id: MarketId,
    venue_id: VenueId,
    question: String,
    outcomes: Vec<Outcome>,
    expiry: Option<DateTime<Utc>>,
    resolution_source: Option<String>,
}

impl Market {
    /// Create a new market snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::EmptyOutcomes`] if no outcomes are provided.
    pub fn try_new(
        market_id: MarketId,
        venue_id: VenueId,
        question: impl Into<String>,
        outcomes: Vec<Outcome>,
        expiry: Option<DateTime<Utc>>,
        resolution_source: Option<String>,
    ) -> Result<Self, MarketError> {
        if outcomes.is_empty() {
            return Err(MarketError::EmptyOutcomes);
        }
        Ok(Self {
            market_id,
            venue_id,
            question: question.into(),
            outcomes,
            expiry,
            resolution_source,
        })
    }

    /// Get the market ID.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// Get the originating venue ID.
    #[must_use]
    pub const fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    /// Get the market question.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Get all outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Get the expiry timestamp, if known.
    #[must_use]
    pub const fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Get the resolution source descriptor, if known.
    #[must_use]
    pub fn resolution_source(&self) -> Option<&str> {
        self.resolution_source.as_deref()
    }

    /// Find an outcome by its ID.
    #[must_use]
    pub fn outcome(&self, outcome_id: &OutcomeId) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.outcome_id() == outcome_id)
    }

    /// Total quoted liquidity across all outcomes.
    #[must_use]
    pub fn total_liquidity(&self) -> Quantity {
        self.outcomes.iter().map(Outcome::liquidity).sum()
    }

    /// Sum of all outcome prices.
    #[must_use]
    pub fn outcome_sum(&self) -> Price {
        self.outcomes.iter().map(Outcome::price).sum()
    }

    /// Time remaining until expiry relative to `now`, if an expiry is set.
    #[must_use]
    pub fn time_to_expiry(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.expiry.map(|e| e - now)
    }
}

/// Index of markets by id, valid for one evaluation cycle.
#[derive(Debug, Default)]
pub struct MarketLookup {
    markets: HashMap<MarketId, Market>,
}

impl MarketLookup {
    /// Build a lookup from a cycle's market snapshot.
    #[must_use]
    pub fn from_markets(markets: Vec<Market>) -> Self {
        let markets = markets
            .into_iter()
            .map(|m| (m.market_id().clone(), m))
            .collect();
        Self { markets }
    }

    /// Look up a market by its ID.
    #[must_use]
    pub fn get(&self, market_id: &MarketId) -> Option<&Market> {
        self.markets.get(market_id)
    }

    /// Resolve a `(market, outcome)` pair.
    #[must_use]
    pub fn outcome(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Option<&Outcome> {
        self.get(market_id).and_then(|m| m.outcome(outcome_id))
    }

    /// Current mark price for an outcome, if present in the snapshot.
    #[must_use]
    pub fn mark_price(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Option<Price> {
        self.outcome(market_id, outcome_id).map(Outcome::price)
    }

    /// Get the number of indexed markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// Check if the lookup is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}
