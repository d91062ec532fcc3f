//! Opportunity type with builder pattern.
//!
//! This module provides the `Opportunity` struct representing a detected
//! arbitrage opportunity, along with `OpportunityBuilder` for safe
//! construction.

use std::fmt;

use rust_decimal::Decimal;

use super::ids::{MarketId, OpportunityId};
use super::trade::TradeAction;

/// Error returned when building an Opportunity fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpportunityBuildError {
    /// Opportunity ID is required but was not provided.
    MissingId,
    /// Detector type tag is required but was not provided.
    MissingKind,
    /// At least one trade action is required.
    MissingActions,
}

impl fmt::Display for OpportunityBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId => write!(f, "opportunity id is required"),
            Self::MissingKind => write!(f, "detector kind is required"),
            Self::MissingActions => write!(f, "at least one action is required"),
        }
    }
}

impl std::error::Error for OpportunityBuildError {}

/// A detected arbitrage opportunity.
///
/// Created once per detection cycle by an external detector; immutable and
/// consumed exactly once by the execution engine. The id is the idempotency
/// key: resubmitting the same id is rejected as a duplicate.
///
/// Use `Opportunity::builder()` to construct instances.
#[derive(Debug, Clone)]
pub struct Opportunity {
    id: OpportunityId,
    kind: String,
    market_ids: Vec<MarketId>,
    actions: Vec<TradeAction>,
    gross_edge: Decimal,
    net_edge: Decimal,
    confidence: Decimal,
}

impl Opportunity {
    /// Create a new builder for constructing an Opportunity.
    #[must_use]
    pub fn builder() -> OpportunityBuilder {
        OpportunityBuilder::new()
    }

    /// Get the opportunity ID (idempotency key).
    #[must_use]
    pub const fn id(&self) -> &OpportunityId {
        &self.id
    }

    /// Get the detector-provided type tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Get the involved market IDs.
    #[must_use]
    pub fn market_ids(&self) -> &[MarketId] {
        &self.market_ids
    }

    /// Get the ordered trade actions (legs).
    #[must_use]
    pub fn actions(&self) -> &[TradeAction] {
        &self.actions
    }

    /// Get the gross edge (expected profit fraction before costs).
    #[must_use]
    pub const fn gross_edge(&self) -> Decimal {
        self.gross_edge
    }

    /// Get the net edge (after estimated fees and slippage).
    #[must_use]
    pub const fn net_edge(&self) -> Decimal {
        self.net_edge
    }

    /// Get the detector confidence score.
    #[must_use]
    pub const fn confidence(&self) -> Decimal {
        self.confidence
    }

    /// Estimated total cost of all legs at their limit prices.
    #[must_use]
    pub fn estimated_cost(&self) -> Decimal {
        self.actions.iter().map(TradeAction::notional).sum()
    }
}

/// Builder for constructing `Opportunity` instances.
#[derive(Debug, Default)]
pub struct OpportunityBuilder {
    id: Option<OpportunityId>,
    kind: Option<String>,
    market_ids: Vec<MarketId>,
    actions: Vec<TradeAction>,
    gross_edge: Decimal,
    net_edge: Decimal,
    confidence: Decimal,
}

impl OpportunityBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the opportunity ID.
    #[must_use]
    pub fn id(mut self, id: OpportunityId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the detector type tag.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Add a trade action; its market id is recorded as involved.
    #[must_use]
    pub fn action(mut self, action: TradeAction) -> Self {
        if !self.market_ids.contains(action.market_id()) {
            self.market_ids.push(action.market_id().clone());
        }
        self.actions.push(action);
        self
    }

    /// Set the gross edge.
    #[must_use]
    pub const fn gross_edge(mut self, edge: Decimal) -> Self {
        self.gross_edge = edge;
        self
    }

    /// Set the net edge.
    #[must_use]
    pub const fn net_edge(mut self, edge: Decimal) -> Self {
        self.net_edge = edge;
        self
    }

    /// Set the confidence score.
    #[must_use]
    pub const fn confidence(mut self, confidence: Decimal) -> Self {
        self.confidence = confidence;
        self
    }

    /// Build the Opportunity.
    ///
    /// # Errors
    ///
    /// Returns `OpportunityBuildError` if any required field is missing.
    pub fn build(self) -> Result<Opportunity, OpportunityBuildError> {
        let id = self.id.ok_or(OpportunityBuildError::MissingId)?;
        let kind = self.kind.ok_or(OpportunityBuildError::MissingKind)?;
        if self.actions.is_empty() {
            return Err(OpportunityBuildError::MissingActions);
        }

        Ok(Opportunity {
            id,
            kind,
            market_ids: self.market_ids,
            actions: self.actions,
            gross_edge: self.gross_edge,
            net_edge: self.net_edge,
            confidence: self.confidence,
        })
    }
}
