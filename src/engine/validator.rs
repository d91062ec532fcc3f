//! Pre-trade opportunity validation.
//!
//! A pure function over (opportunity, market snapshot, ledger snapshot,
//! configured limits). Checks run in a fixed order and short-circuit on the
//! first failure, so tests and operators can rely on a specific rejection
//! reason for a given input.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::domain::{MarketLookup, Opportunity, Side, TradeAction};

use super::ledger::LedgerStore;
use super::venue::VenueCapabilityRegistry;

/// Why an opportunity was declined.
///
/// The `tag()` strings are part of the audit record schema; external
/// tooling keys off them and they must remain stable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("malformed opportunity: {reason}")]
    MalformedOpportunity { reason: String },

    #[error("unknown market in action list: {market_id}")]
    UnknownMarket { market_id: String },

    #[error("opportunity type disabled by configuration: {kind}")]
    TypeDisabled { kind: String },

    #[error("short not permitted on {market_id}:{outcome_id} (held {held}, requested {requested})")]
    ShortNotPermitted {
        market_id: String,
        outcome_id: String,
        held: Decimal,
        requested: Decimal,
    },

    #[error("opposing BUY and SELL on {market_id}:{outcome_id}")]
    OpposingActions {
        market_id: String,
        outcome_id: String,
    },

    #[error("net edge {net_edge} below minimum {minimum}")]
    NetEdgeBelowMinimum { net_edge: Decimal, minimum: Decimal },

    #[error("gross edge {gross_edge} below minimum {minimum}")]
    GrossEdgeBelowMinimum {
        gross_edge: Decimal,
        minimum: Decimal,
    },

    #[error("buy price {limit_price} below floor {floor}")]
    PriceBelowFloor { limit_price: Decimal, floor: Decimal },

    #[error("insufficient depth on {market_id}:{outcome_id}: {available} < {required}")]
    InsufficientDepth {
        market_id: String,
        outcome_id: String,
        available: Decimal,
        required: Decimal,
    },

    #[error("market {market_id} expires too soon")]
    ExpiryTooClose { market_id: String },

    #[error("open position count {open} at limit {limit}")]
    TooManyOpenPositions { open: usize, limit: usize },

    #[error("estimated cost {cost} exceeds allocation limit {limit}")]
    AllocationExceeded { cost: Decimal, limit: Decimal },

    #[error("market {market_id} liquidity {liquidity} below floor {floor}")]
    LiquidityBelowFloor {
        market_id: String,
        liquidity: Decimal,
        floor: Decimal,
    },

    #[error("duplicate opportunity id: {id}")]
    DuplicateOpportunity { id: String },

    #[error("insufficient cash: available {available} < required {required}")]
    InsufficientCash {
        available: Decimal,
        required: Decimal,
    },
}

impl RejectReason {
    /// Stable snake_case tag for audit records and alerting.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::MalformedOpportunity { .. } => "malformed_opportunity",
            Self::UnknownMarket { .. } => "unknown_market",
            Self::TypeDisabled { .. } => "type_disabled",
            Self::ShortNotPermitted { .. } => "short_not_permitted",
            Self::OpposingActions { .. } => "opposing_actions",
            Self::NetEdgeBelowMinimum { .. } => "net_edge_below_minimum",
            Self::GrossEdgeBelowMinimum { .. } => "gross_edge_below_minimum",
            Self::PriceBelowFloor { .. } => "price_below_floor",
            Self::InsufficientDepth { .. } => "insufficient_depth",
            Self::ExpiryTooClose { .. } => "expiry_too_close",
            Self::TooManyOpenPositions { .. } => "too_many_open_positions",
            Self::AllocationExceeded { .. } => "allocation_exceeded",
            Self::LiquidityBelowFloor { .. } => "liquidity_below_floor",
            Self::DuplicateOpportunity { .. } => "duplicate_opportunity",
            Self::InsufficientCash { .. } => "insufficient_cash",
        }
    }
}

/// Configured risk limits for validation.
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Opportunity type tags that are globally disabled.
    pub disabled_kinds: Vec<String>,
    /// Minimum net edge (inclusive).
    pub min_net_edge: Decimal,
    /// Minimum gross edge (inclusive).
    pub min_gross_edge: Decimal,
    /// Minimum BUY limit price; guards against dust-priced "fake edges".
    pub min_buy_price: Decimal,
    /// Required liquidity as a multiple of each leg's notional.
    pub depth_multiple: Decimal,
    /// Minimum time to expiry for every involved market.
    pub min_time_to_expiry: Duration,
    /// Maximum number of open positions.
    pub max_open_positions: usize,
    /// Maximum total leg cost as a fraction of current equity.
    pub max_allocation_fraction: Decimal,
    /// Absolute per-market liquidity floor.
    pub min_market_liquidity: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            disabled_kinds: Vec::new(),
            min_net_edge: Decimal::new(5, 3),    // 0.005
            min_gross_edge: Decimal::new(1, 2),  // 0.01
            min_buy_price: Decimal::new(2, 2),   // 0.02
            depth_multiple: Decimal::ONE,
            min_time_to_expiry: Duration::hours(1),
            max_open_positions: 20,
            max_allocation_fraction: Decimal::new(5, 2), // 0.05
            min_market_liquidity: Decimal::from(500),
        }
    }
}

/// Validates opportunities against venue constraints and risk limits.
#[derive(Debug, Clone)]
pub struct OpportunityValidator {
    limits: RiskLimits,
}

impl OpportunityValidator {
    /// Create a validator with the given limits.
    #[must_use]
    pub const fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    /// Get the configured limits.
    #[must_use]
    pub const fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Validate an opportunity; `Err` carries the first failing check.
    ///
    /// Pure over its inputs; the only side effect is a debug log of the
    /// rejection reason.
    pub fn validate(
        &self,
        opportunity: &Opportunity,
        lookup: &MarketLookup,
        ledger: &LedgerStore,
        venues: &VenueCapabilityRegistry,
        now: DateTime<Utc>,
    ) -> Result<(), RejectReason> {
        let result = self.run_checks(opportunity, lookup, ledger, venues, now);
        if let Err(ref reason) = result {
            debug!(
                opportunity_id = %opportunity.id(),
                kind = %opportunity.kind(),
                reason = reason.tag(),
                "Opportunity rejected"
            );
        }
        result
    }

    fn run_checks(
        &self,
        opportunity: &Opportunity,
        lookup: &MarketLookup,
        ledger: &LedgerStore,
        venues: &VenueCapabilityRegistry,
        now: DateTime<Utc>,
    ) -> Result<(), RejectReason> {
        self.check_well_formed(opportunity, lookup)?;
        self.check_kind_enabled(opportunity)?;
        self.check_short_legality(opportunity, lookup, ledger, venues)?;
        Self::check_no_round_trip(opportunity)?;
        self.check_edges(opportunity)?;
        self.check_price_floor(opportunity)?;
        self.check_depth(opportunity, lookup)?;
        self.check_expiry(opportunity, lookup, now)?;
        self.check_portfolio(opportunity, lookup, ledger)
    }

    /// Malformed input is a rejection, never a panic (spec taxonomy).
    fn check_well_formed(
        &self,
        opportunity: &Opportunity,
        lookup: &MarketLookup,
    ) -> Result<(), RejectReason> {
        if opportunity.actions().is_empty() {
            return Err(RejectReason::MalformedOpportunity {
                reason: "empty action list".to_string(),
            });
        }
        for action in opportunity.actions() {
            if action.quantity() <= Decimal::ZERO {
                return Err(RejectReason::MalformedOpportunity {
                    reason: format!("non-positive quantity {}", action.quantity()),
                });
            }
            if action.limit_price() < Decimal::ZERO || action.limit_price() > Decimal::ONE {
                return Err(RejectReason::MalformedOpportunity {
                    reason: format!("limit price {} outside [0, 1]", action.limit_price()),
                });
            }
            let market_id = action.market_id();
            if lookup.get(market_id).is_none() {
                return Err(RejectReason::UnknownMarket {
                    market_id: market_id.to_string(),
                });
            }
            if lookup.outcome(market_id, action.outcome_id()).is_none() {
                return Err(RejectReason::MalformedOpportunity {
                    reason: format!(
                        "unknown outcome {}:{}",
                        market_id,
                        action.outcome_id()
                    ),
                });
            }
        }
        Ok(())
    }

    fn check_kind_enabled(&self, opportunity: &Opportunity) -> Result<(), RejectReason> {
        if self
            .limits
            .disabled_kinds
            .iter()
            .any(|k| k == opportunity.kind())
        {
            return Err(RejectReason::TypeDisabled {
                kind: opportunity.kind().to_string(),
            });
        }
        Ok(())
    }

    fn check_short_legality(
        &self,
        opportunity: &Opportunity,
        lookup: &MarketLookup,
        ledger: &LedgerStore,
        venues: &VenueCapabilityRegistry,
    ) -> Result<(), RejectReason> {
        for action in opportunity.actions() {
            if action.side() != Side::Sell {
                continue;
            }
            // Well-formedness already guaranteed the market resolves.
            let Some(market) = lookup.get(action.market_id()) else {
                continue;
            };
            if venues.can_open_short(market.venue_id()) {
                continue;
            }
            let held = ledger.position_quantity(action.market_id(), action.outcome_id());
            if held < action.quantity() {
                return Err(RejectReason::ShortNotPermitted {
                    market_id: action.market_id().to_string(),
                    outcome_id: action.outcome_id().to_string(),
                    held,
                    requested: action.quantity(),
                });
            }
        }
        Ok(())
    }

    /// BUY and SELL on the same key signals an unintended round trip.
    fn check_no_round_trip(opportunity: &Opportunity) -> Result<(), RejectReason> {
        let actions = opportunity.actions();
        for (i, a) in actions.iter().enumerate() {
            for b in &actions[i + 1..] {
                if a.market_id() == b.market_id()
                    && a.outcome_id() == b.outcome_id()
                    && a.side() != b.side()
                {
                    return Err(RejectReason::OpposingActions {
                        market_id: a.market_id().to_string(),
                        outcome_id: a.outcome_id().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Both floors are inclusive: an edge exactly at the threshold passes.
    fn check_edges(&self, opportunity: &Opportunity) -> Result<(), RejectReason> {
        if opportunity.net_edge() < self.limits.min_net_edge {
            return Err(RejectReason::NetEdgeBelowMinimum {
                net_edge: opportunity.net_edge(),
                minimum: self.limits.min_net_edge,
            });
        }
        if opportunity.gross_edge() < self.limits.min_gross_edge {
            return Err(RejectReason::GrossEdgeBelowMinimum {
                gross_edge: opportunity.gross_edge(),
                minimum: self.limits.min_gross_edge,
            });
        }
        Ok(())
    }

    fn check_price_floor(&self, opportunity: &Opportunity) -> Result<(), RejectReason> {
        for action in opportunity.actions() {
            if action.side() == Side::Buy && action.limit_price() < self.limits.min_buy_price {
                return Err(RejectReason::PriceBelowFloor {
                    limit_price: action.limit_price(),
                    floor: self.limits.min_buy_price,
                });
            }
        }
        Ok(())
    }

    /// A no-partial-fill pre-check: don't even try a leg whose quoted depth
    /// cannot carry a configured multiple of its notional.
    fn check_depth(
        &self,
        opportunity: &Opportunity,
        lookup: &MarketLookup,
    ) -> Result<(), RejectReason> {
        for action in opportunity.actions() {
            let Some(outcome) = lookup.outcome(action.market_id(), action.outcome_id()) else {
                continue;
            };
            let required = self.limits.depth_multiple * action.notional();
            if outcome.liquidity() < required {
                return Err(RejectReason::InsufficientDepth {
                    market_id: action.market_id().to_string(),
                    outcome_id: action.outcome_id().to_string(),
                    available: outcome.liquidity(),
                    required,
                });
            }
        }
        Ok(())
    }

    fn check_expiry(
        &self,
        opportunity: &Opportunity,
        lookup: &MarketLookup,
        now: DateTime<Utc>,
    ) -> Result<(), RejectReason> {
        for market_id in opportunity.market_ids() {
            let Some(market) = lookup.get(market_id) else {
                continue;
            };
            if let Some(remaining) = market.time_to_expiry(now) {
                if remaining < self.limits.min_time_to_expiry {
                    return Err(RejectReason::ExpiryTooClose {
                        market_id: market_id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_portfolio(
        &self,
        opportunity: &Opportunity,
        lookup: &MarketLookup,
        ledger: &LedgerStore,
    ) -> Result<(), RejectReason> {
        let open = ledger.open_position_count();
        if open >= self.limits.max_open_positions {
            return Err(RejectReason::TooManyOpenPositions {
                open,
                limit: self.limits.max_open_positions,
            });
        }

        let cost: Decimal = opportunity
            .actions()
            .iter()
            .map(TradeAction::notional)
            .sum();
        let limit = self.limits.max_allocation_fraction * ledger.equity(lookup);
        if cost > limit {
            return Err(RejectReason::AllocationExceeded { cost, limit });
        }

        for market_id in opportunity.market_ids() {
            let Some(market) = lookup.get(market_id) else {
                continue;
            };
            let liquidity = market.total_liquidity();
            if liquidity < self.limits.min_market_liquidity {
                return Err(RejectReason::LiquidityBelowFloor {
                    market_id: market_id.to_string(),
                    liquidity,
                    floor: self.limits.min_market_liquidity,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Market, MarketId, OpportunityId, Outcome, OutcomeId, VenueId};
    use crate::engine::venue::VenueCapability;
    use rust_decimal_macros::dec;

    fn market(id: &str, venue: &str, liquidity: Decimal) -> Market {
        Market::try_new(
            MarketId::from(id),
            VenueId::from(venue),
            "Test?",
            vec![
                Outcome::try_new(OutcomeId::from("yes"), "Yes", dec!(0.45), liquidity).unwrap(),
                Outcome::try_new(OutcomeId::from("no"), "No", dec!(0.50), liquidity).unwrap(),
            ],
            None,
            None,
        )
        .unwrap()
    }

    fn lookup() -> MarketLookup {
        MarketLookup::from_markets(vec![market("m1", "polymarket", dec!(10000))])
    }

    fn action(side: Side, outcome: &str, quantity: Decimal, price: Decimal) -> TradeAction {
        TradeAction::new(
            MarketId::from("m1"),
            OutcomeId::from(outcome),
            side,
            quantity,
            price,
        )
    }

    fn opportunity(actions: Vec<TradeAction>) -> Opportunity {
        let mut builder = Opportunity::builder()
            .id(OpportunityId::from("opp-1"))
            .kind("parity")
            .gross_edge(dec!(0.05))
            .net_edge(dec!(0.04))
            .confidence(dec!(0.9));
        for a in actions {
            builder = builder.action(a);
        }
        builder.build().unwrap()
    }

    fn permissive_limits() -> RiskLimits {
        RiskLimits {
            min_net_edge: dec!(0),
            min_gross_edge: dec!(0),
            min_buy_price: dec!(0),
            depth_multiple: dec!(0),
            min_time_to_expiry: Duration::zero(),
            max_open_positions: 100,
            max_allocation_fraction: dec!(1),
            min_market_liquidity: dec!(0),
            disabled_kinds: Vec::new(),
        }
    }

    fn validate(limits: RiskLimits, opp: &Opportunity) -> Result<(), RejectReason> {
        let ledger = LedgerStore::new(dec!(10000));
        let venues = VenueCapabilityRegistry::default();
        OpportunityValidator::new(limits).validate(opp, &lookup(), &ledger, &venues, Utc::now())
    }

    #[test]
    fn accepts_well_formed_buy_pair() {
        let opp = opportunity(vec![
            action(Side::Buy, "yes", dec!(10), dec!(0.45)),
            action(Side::Buy, "no", dec!(10), dec!(0.50)),
        ]);
        assert!(validate(permissive_limits(), &opp).is_ok());
    }

    #[test]
    fn rejects_non_positive_quantity_as_malformed() {
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(0), dec!(0.45))]);
        let err = validate(permissive_limits(), &opp).unwrap_err();
        assert_eq!(err.tag(), "malformed_opportunity");
    }

    #[test]
    fn rejects_out_of_range_price_as_malformed() {
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(1.5))]);
        let err = validate(permissive_limits(), &opp).unwrap_err();
        assert_eq!(err.tag(), "malformed_opportunity");
    }

    #[test]
    fn rejects_unknown_market() {
        let opp = opportunity(vec![TradeAction::new(
            MarketId::from("nope"),
            OutcomeId::from("yes"),
            Side::Buy,
            dec!(10),
            dec!(0.45),
        )]);
        let err = validate(permissive_limits(), &opp).unwrap_err();
        assert!(matches!(err, RejectReason::UnknownMarket { .. }));
    }

    #[test]
    fn rejects_disabled_kind() {
        let limits = RiskLimits {
            disabled_kinds: vec!["parity".to_string()],
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(0.45))]);
        let err = validate(limits, &opp).unwrap_err();
        assert_eq!(err.tag(), "type_disabled");
    }

    #[test]
    fn rejects_short_on_buy_only_venue() {
        let opp = opportunity(vec![action(Side::Sell, "yes", dec!(5), dec!(0.60))]);
        let err = validate(permissive_limits(), &opp).unwrap_err();
        assert!(matches!(
            err,
            RejectReason::ShortNotPermitted {
                held,
                requested,
                ..
            } if held == dec!(0) && requested == dec!(5)
        ));
        assert_eq!(err.tag(), "short_not_permitted");
    }

    #[test]
    fn allows_sell_reducing_long_on_buy_only_venue() {
        let mut ledger = LedgerStore::new(dec!(10000));
        let buy = action(Side::Buy, "yes", dec!(10), dec!(0.45));
        let plan = crate::engine::fill::FillPlan {
            quantity: dec!(10),
            effective_price: dec!(0.45),
            fee: dec!(0),
            slippage_cost: dec!(0),
        };
        ledger.apply_fill(&buy, &plan);

        let opp = opportunity(vec![action(Side::Sell, "yes", dec!(10), dec!(0.60))]);
        let venues = VenueCapabilityRegistry::default();
        let result = OpportunityValidator::new(permissive_limits()).validate(
            &opp,
            &lookup(),
            &ledger,
            &venues,
            Utc::now(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn allows_short_on_shortable_venue() {
        let mut venues = VenueCapabilityRegistry::default();
        venues.register(VenueId::from("polymarket"), VenueCapability::ShortingAllowed);

        let ledger = LedgerStore::new(dec!(10000));
        let opp = opportunity(vec![action(Side::Sell, "yes", dec!(5), dec!(0.60))]);
        let result = OpportunityValidator::new(permissive_limits()).validate(
            &opp,
            &lookup(),
            &ledger,
            &venues,
            Utc::now(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_same_key_round_trip() {
        let mut venues = VenueCapabilityRegistry::default();
        venues.register(VenueId::from("polymarket"), VenueCapability::ShortingAllowed);

        let opp = opportunity(vec![
            action(Side::Buy, "yes", dec!(10), dec!(0.45)),
            action(Side::Sell, "yes", dec!(10), dec!(0.55)),
        ]);
        let ledger = LedgerStore::new(dec!(10000));
        let err = OpportunityValidator::new(permissive_limits())
            .validate(&opp, &lookup(), &ledger, &venues, Utc::now())
            .unwrap_err();
        assert_eq!(err.tag(), "opposing_actions");
    }

    #[test]
    fn edge_thresholds_are_inclusive() {
        let limits = RiskLimits {
            min_net_edge: dec!(0.04),
            min_gross_edge: dec!(0.05),
            ..permissive_limits()
        };
        // Opportunity has net 0.04 and gross 0.05: exactly at both floors.
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(0.45))]);
        assert!(validate(limits, &opp).is_ok());
    }

    #[test]
    fn rejects_net_edge_before_gross_edge() {
        let limits = RiskLimits {
            min_net_edge: dec!(0.10),
            min_gross_edge: dec!(0.10),
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(0.45))]);
        let err = validate(limits, &opp).unwrap_err();
        assert_eq!(err.tag(), "net_edge_below_minimum");
    }

    #[test]
    fn rejects_gross_edge_when_net_passes() {
        let limits = RiskLimits {
            min_net_edge: dec!(0.04),
            min_gross_edge: dec!(0.10),
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(0.45))]);
        let err = validate(limits, &opp).unwrap_err();
        assert_eq!(err.tag(), "gross_edge_below_minimum");
    }

    #[test]
    fn rejects_dust_priced_buy() {
        let limits = RiskLimits {
            min_buy_price: dec!(0.02),
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(0.01))]);
        let err = validate(limits, &opp).unwrap_err();
        assert_eq!(err.tag(), "price_below_floor");
    }

    #[test]
    fn rejects_insufficient_depth() {
        let limits = RiskLimits {
            depth_multiple: dec!(10000),
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(0.45))]);
        let err = validate(limits, &opp).unwrap_err();
        assert_eq!(err.tag(), "insufficient_depth");
    }

    #[test]
    fn rejects_market_near_expiry() {
        let expiring = Market::try_new(
            MarketId::from("m1"),
            VenueId::from("polymarket"),
            "Soon?",
            vec![
                Outcome::try_new(OutcomeId::from("yes"), "Yes", dec!(0.45), dec!(10000)).unwrap(),
                Outcome::try_new(OutcomeId::from("no"), "No", dec!(0.50), dec!(10000)).unwrap(),
            ],
            Some(Utc::now() + Duration::minutes(10)),
            None,
        )
        .unwrap();
        let lookup = MarketLookup::from_markets(vec![expiring]);
        let limits = RiskLimits {
            min_time_to_expiry: Duration::hours(1),
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(0.45))]);
        let ledger = LedgerStore::new(dec!(10000));
        let err = OpportunityValidator::new(limits)
            .validate(
                &opp,
                &lookup,
                &ledger,
                &VenueCapabilityRegistry::default(),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.tag(), "expiry_too_close");
    }

    #[test]
    fn rejects_when_position_count_at_limit() {
        let mut ledger = LedgerStore::new(dec!(10000));
        let plan = crate::engine::fill::FillPlan {
            quantity: dec!(1),
            effective_price: dec!(0.45),
            fee: dec!(0),
            slippage_cost: dec!(0),
        };
        ledger.apply_fill(&action(Side::Buy, "yes", dec!(1), dec!(0.45)), &plan);

        let limits = RiskLimits {
            max_open_positions: 1,
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "no", dec!(10), dec!(0.50))]);
        let err = OpportunityValidator::new(limits)
            .validate(
                &opp,
                &lookup(),
                &ledger,
                &VenueCapabilityRegistry::default(),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.tag(), "too_many_open_positions");
    }

    #[test]
    fn rejects_allocation_breach() {
        let limits = RiskLimits {
            max_allocation_fraction: dec!(0.0001),
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(100), dec!(0.45))]);
        let err = validate(limits, &opp).unwrap_err();
        assert_eq!(err.tag(), "allocation_exceeded");
    }

    #[test]
    fn rejects_market_below_liquidity_floor() {
        let limits = RiskLimits {
            min_market_liquidity: dec!(50000),
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Buy, "yes", dec!(10), dec!(0.45))]);
        let err = validate(limits, &opp).unwrap_err();
        assert_eq!(err.tag(), "liquidity_below_floor");
    }

    #[test]
    fn short_check_runs_before_edge_checks() {
        // Both the short rule and the edge floor would fail; the short rule
        // is earlier in the fixed order.
        let limits = RiskLimits {
            min_net_edge: dec!(0.99),
            ..permissive_limits()
        };
        let opp = opportunity(vec![action(Side::Sell, "yes", dec!(5), dec!(0.60))]);
        let err = validate(limits, &opp).unwrap_err();
        assert_eq!(err.tag(), "short_not_permitted");
    }
}
