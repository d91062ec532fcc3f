//! Deterministic fill simulation.
//!
//! Given one trade leg and an outcome's liquidity snapshot, computes the
//! achievable fill quantity and effective price with fees and slippage
//! applied. Pure arithmetic; the ledger applies the result.

use rust_decimal::Decimal;

use crate::domain::{bps_to_rate, Outcome, Price, Quantity, Side, TradeAction};

/// Cost parameters for the simulation, expressed the way venue fee
/// schedules are quoted: basis points and a depth fraction.
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    /// Fee rate in basis points of filled notional.
    pub fee_bps: Decimal,
    /// Adverse price adjustment in basis points.
    pub slippage_bps: Decimal,
    /// Fraction of quoted liquidity assumed actually accessible.
    pub depth_fraction: Decimal,
}

impl CostModel {
    /// Frictionless model, useful in tests.
    #[must_use]
    pub fn frictionless() -> Self {
        Self {
            fee_bps: Decimal::ZERO,
            slippage_bps: Decimal::ZERO,
            depth_fraction: Decimal::ONE,
        }
    }
}

/// The outcome of simulating one leg: how much fills, and at what cost.
///
/// A `quantity` of zero means the leg cannot fill at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPlan {
    pub quantity: Quantity,
    pub effective_price: Price,
    pub fee: Price,
    pub slippage_cost: Price,
}

impl FillPlan {
    /// A plan that fills nothing at the given effective price.
    #[must_use]
    pub fn empty(effective_price: Price) -> Self {
        Self {
            quantity: Decimal::ZERO,
            effective_price,
            fee: Decimal::ZERO,
            slippage_cost: Decimal::ZERO,
        }
    }

    /// Returns true if nothing fills.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Returns true if the full requested quantity fills.
    #[must_use]
    pub fn fills_fully(&self, requested: Quantity) -> bool {
        self.quantity == requested
    }

    /// Total cash required to apply this plan as a BUY.
    #[must_use]
    pub fn buy_cost(&self) -> Price {
        self.effective_price * self.quantity + self.fee
    }
}

/// Computes achievable fills against an outcome's liquidity snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FillSimulator {
    costs: CostModel,
}

impl FillSimulator {
    /// Create a simulator with the given cost model.
    #[must_use]
    pub const fn new(costs: CostModel) -> Self {
        Self { costs }
    }

    /// Get the cost model.
    #[must_use]
    pub const fn costs(&self) -> &CostModel {
        &self.costs
    }

    /// Effective price for a side: limit adjusted adversely by slippage.
    #[must_use]
    pub fn effective_price(&self, side: Side, limit_price: Price) -> Price {
        let rate = bps_to_rate(self.costs.slippage_bps);
        match side {
            Side::Buy => limit_price * (Decimal::ONE + rate),
            Side::Sell => limit_price * (Decimal::ONE - rate),
        }
    }

    /// Simulate one leg against an outcome snapshot.
    ///
    /// Achievable quantity is `floor(liquidity × depth_fraction /
    /// effective_price)` capped at the requested quantity — floor, never
    /// round-up, so a fill can never exceed accessible depth. A
    /// non-positive effective price yields an empty plan.
    #[must_use]
    pub fn simulate(&self, action: &TradeAction, outcome: &Outcome) -> FillPlan {
        self.plan(
            action.side(),
            action.limit_price(),
            action.quantity(),
            outcome.liquidity(),
        )
    }

    /// Simulate an arbitrary order against quoted liquidity.
    #[must_use]
    pub fn plan(
        &self,
        side: Side,
        limit_price: Price,
        requested: Quantity,
        liquidity: Quantity,
    ) -> FillPlan {
        let effective = self.effective_price(side, limit_price);
        if effective <= Decimal::ZERO || requested <= Decimal::ZERO {
            return FillPlan::empty(effective);
        }

        let accessible = liquidity * self.costs.depth_fraction;
        let quantity = (accessible / effective).floor().min(requested);
        if quantity <= Decimal::ZERO {
            return FillPlan::empty(effective);
        }

        let fee = effective * quantity * bps_to_rate(self.costs.fee_bps);
        let slippage_cost = (effective - limit_price).abs() * quantity;
        FillPlan {
            quantity,
            effective_price: effective,
            fee,
            slippage_cost,
        }
    }
}
