//! Trade legs and fill records.
//!
//! - [`Side`] - BUY or SELL as a closed enum
//! - [`TradeAction`] - One intended leg of an opportunity
//! - [`Fill`] - A simulated execution applied to the ledger

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::ids::{MarketId, OutcomeId};
use super::money::{Price, Quantity};

/// Side of a trade leg.
///
/// A closed enumeration rather than a free-form string, so unhandled cases
/// are caught at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side that offsets this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns true for BUY.
    #[must_use]
    pub const fn is_buy(self) -> bool {
        matches!(self, Self::Buy)
    }

    /// Returns true for SELL.
    #[must_use]
    pub const fn is_sell(self) -> bool {
        matches!(self, Self::Sell)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// One intended leg of an opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeAction {
    market_id: MarketId,
    outcome_id: OutcomeId,
    side: Side,
    quantity: Quantity,
    limit_price: Price,
}

impl TradeAction {
    /// Create a new trade action.
    ///
    /// Quantity and price ranges are enforced by the validator, not here:
    /// a malformed action must surface as a rejection, never a panic.
    #[must_use]
    pub const fn new(
        market_id: MarketId,
        outcome_id: OutcomeId,
        side: Side,
        quantity: Quantity,
        limit_price: Price,
    ) -> Self {
        Self {
            market_id,
            outcome_id,
            side,
            quantity,
            limit_price,
        }
    }

    /// Get the market ID.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// Get the outcome ID.
    #[must_use]
    pub const fn outcome_id(&self) -> &OutcomeId {
        &self.outcome_id
    }

    /// Get the side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Get the requested quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Get the limit price.
    #[must_use]
    pub const fn limit_price(&self) -> Price {
        self.limit_price
    }

    /// Notional value at the limit price (quantity × limit).
    #[must_use]
    pub fn notional(&self) -> Price {
        self.quantity * self.limit_price
    }
}

/// A simulated execution applied to the ledger.
///
/// `realized_pnl` is the closing component of this fill net of the fill's
/// fee; it is zero for fills that only open or extend a position.
#[derive(Debug, Clone, Serialize)]
pub struct Fill {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    pub side: Side,
    pub quantity: Quantity,
    pub limit_price: Price,
    pub effective_price: Price,
    pub fee: Price,
    pub slippage_cost: Price,
    pub realized_pnl: Price,
}
