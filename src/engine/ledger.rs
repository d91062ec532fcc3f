//! Cash, position, and PnL bookkeeping.
//!
//! - [`Position`] - Signed quantity plus average cost basis per key
//! - [`LedgerStore`] - The single source of truth for cash and positions
//! - [`LedgerSnapshot`] - Read-only view for external collaborators
//!
//! The ledger holds no policy: it only offers bookkeeping primitives
//! (reserve, release, apply-fill, mark-to-market). The execution engine is
//! its exclusive owner and the only writer.
//!
//! # Accounting identity
//!
//! At every observable point, in exact `Decimal` arithmetic:
//!
//! ```text
//! available + reserved + Σ quantity × basis = initial + realized_pnl − fees_paid
//! ```
//!
//! Realized PnL is price-only (at effective prices); fees and slippage
//! accumulate in their own drain counters.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::prelude::Signed;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Fill, MarketId, MarketLookup, OutcomeId, Price, Quantity, Side, TradeAction};

use super::fill::FillPlan;

/// Errors from ledger primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient cash: available {available} < requested {requested}")]
    InsufficientCash {
        available: Decimal,
        requested: Decimal,
    },
}

/// Key for a position entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PositionKey {
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
}

impl PositionKey {
    /// Create a new position key.
    #[must_use]
    pub const fn new(market_id: MarketId, outcome_id: OutcomeId) -> Self {
        Self {
            market_id,
            outcome_id,
        }
    }
}

/// A per-(market, outcome) position.
///
/// Quantity is signed: positive is long, negative is short. The average
/// cost basis is defined only while quantity is nonzero; entries are removed
/// from the ledger when quantity returns to exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    quantity: Quantity,
    avg_cost: Price,
}

impl Position {
    /// Get the signed quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Get the average cost basis.
    #[must_use]
    pub const fn avg_cost(&self) -> Price {
        self.avg_cost
    }

    /// Returns true for a long position.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// Returns true for a short position.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO
    }
}

/// Read-only view of the ledger for status and reporting collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub available_cash: Decimal,
    pub reserved_cash: Decimal,
    pub realized_pnl: Decimal,
    pub fees_paid: Decimal,
    pub slippage_cost: Decimal,
    pub positions: Vec<(PositionKey, Position)>,
}

/// Owns cash, reserved funds, positions, and cumulative PnL counters.
#[derive(Debug)]
pub struct LedgerStore {
    initial_cash: Decimal,
    available_cash: Decimal,
    reserved_cash: Decimal,
    realized_pnl: Decimal,
    fees_paid: Decimal,
    slippage_cost: Decimal,
    positions: HashMap<PositionKey, Position>,
}

impl LedgerStore {
    /// Create a ledger with the given starting cash.
    #[must_use]
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            initial_cash,
            available_cash: initial_cash,
            reserved_cash: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            fees_paid: Decimal::ZERO,
            slippage_cost: Decimal::ZERO,
            positions: HashMap::new(),
        }
    }

    /// Get the starting cash.
    #[must_use]
    pub const fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    /// Get the available (unreserved) cash.
    #[must_use]
    pub const fn available_cash(&self) -> Decimal {
        self.available_cash
    }

    /// Get the cash currently reserved for in-flight executions.
    #[must_use]
    pub const fn reserved_cash(&self) -> Decimal {
        self.reserved_cash
    }

    /// Get cumulative realized PnL (price-only, excludes fees and slippage).
    #[must_use]
    pub const fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    /// Get cumulative fees paid.
    #[must_use]
    pub const fn fees_paid(&self) -> Decimal {
        self.fees_paid
    }

    /// Get cumulative slippage cost.
    #[must_use]
    pub const fn slippage_cost(&self) -> Decimal {
        self.slippage_cost
    }

    /// Move cash from available to reserved.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientCash`] if available cash cannot
    /// cover the amount; the ledger is left unchanged.
    pub fn reserve(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount > self.available_cash {
            return Err(LedgerError::InsufficientCash {
                available: self.available_cash,
                requested: amount,
            });
        }
        self.available_cash -= amount;
        self.reserved_cash += amount;
        Ok(())
    }

    /// Move cash from reserved back to available, saturating at the
    /// reserved balance.
    pub fn release(&mut self, amount: Decimal) {
        let released = amount.min(self.reserved_cash);
        self.reserved_cash -= released;
        self.available_cash += released;
    }

    /// Returns true if reserved plus available cash can cover `amount`.
    #[must_use]
    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.available_cash + self.reserved_cash >= amount
    }

    /// Get a position by key, if one is open.
    #[must_use]
    pub fn position(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Option<&Position> {
        self.positions.get(&PositionKey {
            market_id: market_id.clone(),
            outcome_id: outcome_id.clone(),
        })
    }

    /// Signed quantity held for a key, zero if no position.
    #[must_use]
    pub fn position_quantity(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Quantity {
        self.position(market_id, outcome_id)
            .map_or(Decimal::ZERO, Position::quantity)
    }

    /// Number of open (nonzero) positions.
    #[must_use]
    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate over open positions.
    pub fn positions(&self) -> impl Iterator<Item = (&PositionKey, &Position)> {
        self.positions.iter()
    }

    /// Σ quantity × basis across open positions.
    #[must_use]
    pub fn position_book_value(&self) -> Decimal {
        self.positions
            .values()
            .map(|p| p.quantity * p.avg_cost)
            .sum()
    }

    /// Apply a simulated fill, updating cash, position, and PnL counters.
    ///
    /// BUY cost is drawn from reserved cash first and available cash for the
    /// remainder; SELL proceeds are credited to available cash. The caller
    /// must have verified coverage via [`Self::can_cover`]; positions and
    /// counters are updated per the weighted-average / realize-on-close
    /// rules.
    pub fn apply_fill(&mut self, action: &TradeAction, plan: &FillPlan) -> Fill {
        let quantity = plan.quantity;
        let effective = plan.effective_price;
        let fee = plan.fee;

        match action.side() {
            Side::Buy => {
                let total = effective * quantity + fee;
                let from_reserved = total.min(self.reserved_cash);
                self.reserved_cash -= from_reserved;
                self.available_cash -= total - from_reserved;
            }
            Side::Sell => {
                let proceeds = effective * quantity - fee;
                self.available_cash += proceeds;
            }
        }
        self.fees_paid += fee;
        self.slippage_cost += plan.slippage_cost;

        let closed = self.update_position(action, quantity, effective);
        let fill_realized = if closed == Decimal::ZERO {
            Decimal::ZERO
        } else {
            closed - fee
        };

        Fill {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            market_id: action.market_id().clone(),
            outcome_id: action.outcome_id().clone(),
            side: action.side(),
            quantity,
            limit_price: action.limit_price(),
            effective_price: effective,
            fee,
            slippage_cost: plan.slippage_cost,
            realized_pnl: fill_realized,
        }
    }

    /// Apply the signed position delta and return the realized (price-only)
    /// PnL component, which is also accumulated into the ledger counter.
    fn update_position(
        &mut self,
        action: &TradeAction,
        quantity: Quantity,
        effective: Price,
    ) -> Decimal {
        let key = PositionKey::new(action.market_id().clone(), action.outcome_id().clone());
        let delta = match action.side() {
            Side::Buy => quantity,
            Side::Sell => -quantity,
        };

        let current = self.positions.get(&key).copied();
        let (held, basis) = current.map_or((Decimal::ZERO, Decimal::ZERO), |p| {
            (p.quantity, p.avg_cost)
        });

        // Same direction (or flat): extend with a weighted-average basis.
        if held.is_zero() || held.signum() == delta.signum() {
            let new_qty = held + delta;
            let new_basis = if held.is_zero() {
                effective
            } else {
                (basis * held.abs() + effective * delta.abs()) / new_qty.abs()
            };
            self.positions.insert(
                key,
                Position {
                    quantity: new_qty,
                    avg_cost: new_basis,
                },
            );
            return Decimal::ZERO;
        }

        // Opposing direction: realize on the closed quantity.
        let closed_qty = delta.abs().min(held.abs());
        let realized = (effective - basis) * closed_qty * held.signum();
        self.realized_pnl += realized;

        let new_qty = held + delta;
        if new_qty.is_zero() {
            // Basis is undefined at zero; the entry is removed.
            self.positions.remove(&key);
        } else if new_qty.signum() == held.signum() {
            // Partial close keeps the original basis.
            self.positions.insert(
                key,
                Position {
                    quantity: new_qty,
                    avg_cost: basis,
                },
            );
        } else {
            // Sign flip: residual opens a new position at the fill price.
            self.positions.insert(
                key,
                Position {
                    quantity: new_qty,
                    avg_cost: effective,
                },
            );
        }
        realized
    }

    /// Mark-to-market unrealized PnL against current snapshot prices.
    ///
    /// Positions whose outcome is missing from the snapshot are marked at
    /// their own basis (zero unrealized contribution).
    #[must_use]
    pub fn unrealized_pnl(&self, lookup: &MarketLookup) -> Decimal {
        self.positions
            .iter()
            .map(|(key, p)| {
                let mark = lookup
                    .mark_price(&key.market_id, &key.outcome_id)
                    .unwrap_or(p.avg_cost);
                p.quantity * (mark - p.avg_cost)
            })
            .sum()
    }

    /// Equity: available + reserved + positions marked at snapshot prices.
    #[must_use]
    pub fn equity(&self, lookup: &MarketLookup) -> Decimal {
        let marked: Decimal = self
            .positions
            .iter()
            .map(|(key, p)| {
                let mark = lookup
                    .mark_price(&key.market_id, &key.outcome_id)
                    .unwrap_or(p.avg_cost);
                p.quantity * mark
            })
            .sum();
        self.available_cash + self.reserved_cash + marked
    }

    /// Produce a read-only snapshot for external consumers.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut positions: Vec<(PositionKey, Position)> = self
            .positions
            .iter()
            .map(|(k, p)| (k.clone(), *p))
            .collect();
        positions.sort_by(|a, b| a.0.cmp_key().cmp(&b.0.cmp_key()));
        LedgerSnapshot {
            available_cash: self.available_cash,
            reserved_cash: self.reserved_cash,
            realized_pnl: self.realized_pnl,
            fees_paid: self.fees_paid,
            slippage_cost: self.slippage_cost,
            positions,
        }
    }
}

impl PositionKey {
    fn cmp_key(&self) -> (&str, &str) {
        (self.market_id.as_str(), self.outcome_id.as_str())
    }
}
