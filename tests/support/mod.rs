//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use paperedge::domain::{
    Detector, Market, MarketId, Opportunity, OpportunityId, Outcome, OutcomeId, Side, TradeAction,
    VenueId,
};
use paperedge::engine::{
    CostModel, ExecutionEngine, FillSimulator, LedgerStore, MarketSource, OpportunityValidator,
    RiskLimits, VenueCapabilityRegistry,
};

/// A market source that replays the same snapshot every cycle.
pub struct StaticSource {
    markets: Vec<Market>,
}

impl StaticSource {
    pub fn new(markets: Vec<Market>) -> Self {
        Self { markets }
    }
}

impl MarketSource for StaticSource {
    fn get_market_snapshot(&mut self) -> Vec<Market> {
        self.markets.clone()
    }
}

/// A detector that surfaces a fixed list of opportunities each cycle.
pub struct StaticDetector {
    opportunities: Vec<Opportunity>,
}

impl StaticDetector {
    pub fn new(opportunities: Vec<Opportunity>) -> Self {
        Self { opportunities }
    }
}

impl Detector for StaticDetector {
    fn name(&self) -> &str {
        "static"
    }

    fn detect(&self, _markets: &[Market]) -> Vec<Opportunity> {
        self.opportunities.clone()
    }
}

/// Binary market on the given venue with symmetric depth on both outcomes.
pub fn binary_market(id: &str, venue: &str, liquidity: Decimal) -> Market {
    binary_market_with(id, venue, liquidity, liquidity, None)
}

pub fn binary_market_with(
    id: &str,
    venue: &str,
    yes_liquidity: Decimal,
    no_liquidity: Decimal,
    expiry: Option<DateTime<Utc>>,
) -> Market {
    Market::try_new(
        MarketId::from(id),
        VenueId::from(venue),
        "Will the fixture resolve yes?",
        vec![
            Outcome::try_new(OutcomeId::from("yes"), "Yes", dec!(0.45), yes_liquidity).unwrap(),
            Outcome::try_new(OutcomeId::from("no"), "No", dec!(0.50), no_liquidity).unwrap(),
        ],
        expiry,
        None,
    )
    .unwrap()
}

pub fn leg(market: &str, outcome: &str, side: Side, qty: Decimal, price: Decimal) -> TradeAction {
    TradeAction::new(
        MarketId::from(market),
        OutcomeId::from(outcome),
        side,
        qty,
        price,
    )
}

/// BUY both outcomes of `m1` at the fixture quotes.
pub fn parity_opportunity(id: &str, qty: Decimal) -> Opportunity {
    Opportunity::builder()
        .id(OpportunityId::from(id))
        .kind("parity")
        .action(leg("m1", "yes", Side::Buy, qty, dec!(0.45)))
        .action(leg("m1", "no", Side::Buy, qty, dec!(0.50)))
        .gross_edge(dec!(0.05))
        .net_edge(dec!(0.04))
        .confidence(dec!(0.9))
        .build()
        .unwrap()
}

/// Limits that pass everything, for tests exercising fills rather than
/// validation.
pub fn permissive_limits() -> RiskLimits {
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

/// Engine with permissive limits, a frictionless fill model, default
/// (buy-only) venues, and the given fixtures.
pub fn frictionless_engine(
    markets: Vec<Market>,
    opportunities: Vec<Opportunity>,
    initial_cash: Decimal,
) -> ExecutionEngine {
    engine_with_costs(
        markets,
        opportunities,
        initial_cash,
        CostModel::frictionless(),
    )
}

pub fn engine_with_costs(
    markets: Vec<Market>,
    opportunities: Vec<Opportunity>,
    initial_cash: Decimal,
    costs: CostModel,
) -> ExecutionEngine {
    ExecutionEngine::from_parts(
        LedgerStore::new(initial_cash),
        OpportunityValidator::new(permissive_limits()),
        FillSimulator::new(costs),
        VenueCapabilityRegistry::default(),
        Box::new(StaticSource::new(markets)),
        vec![Box::new(StaticDetector::new(opportunities))],
    )
}

/// Assert the exact cash-conservation identity on the engine's ledger.
pub fn assert_ledger_identity(engine: &ExecutionEngine) {
    let ledger = engine.ledger();
    assert_eq!(
        ledger.available_cash() + ledger.reserved_cash() + ledger.position_book_value(),
        ledger.initial_cash() + ledger.realized_pnl() - ledger.fees_paid(),
        "ledger identity violated"
    );
}
