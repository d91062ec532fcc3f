//! Accounting invariants and audit record schema under realistic costs.

mod support;

use rust_decimal_macros::dec;

use paperedge::config::Config;
use paperedge::domain::Detector;
use paperedge::engine::{
    CostModel, ExecutionEngine, ExecutionStatus, FillSimulator, LedgerStore, MarketSource,
    OpportunityValidator, RiskLimits, VenueCapabilityRegistry,
};

use support::{
    assert_ledger_identity, binary_market, engine_with_costs, parity_opportunity, StaticDetector,
    StaticSource,
};

#[test]
fn identity_holds_with_fees_and_slippage() {
    // Default venue schedule: 10 bps fee, 20 bps slippage, 5% depth.
    let costs = CostModel {
        fee_bps: dec!(10),
        slippage_bps: dec!(20),
        depth_fraction: dec!(0.05),
    };
    let markets = vec![binary_market("m1", "polymarket", dec!(10000))];
    let mut engine = engine_with_costs(
        markets,
        vec![parity_opportunity("opp-1", dec!(100))],
        dec!(1000),
        costs,
    );

    let results = engine.run_cycle().unwrap();
    assert_eq!(results[0].status, ExecutionStatus::Success);

    let ledger = engine.ledger();
    // yes: 0.45 × 1.002 × 100 × 0.001; no: 0.50 × 1.002 × 100 × 0.001
    assert_eq!(ledger.fees_paid(), dec!(0.09519));
    // 0.0009 × 100 + 0.0010 × 100
    assert_eq!(ledger.slippage_cost(), dec!(0.19));
    assert_eq!(ledger.reserved_cash(), dec!(0));
    assert_ledger_identity(&engine);
}

#[test]
fn unaffordable_leg_zero_fills_and_never_overdraws() {
    // A 100% fee makes the second leg unaffordable after the first fills.
    let costs = CostModel {
        fee_bps: dec!(10000),
        slippage_bps: dec!(0),
        depth_fraction: dec!(1),
    };
    let markets = vec![binary_market("m1", "polymarket", dec!(10000))];
    let mut engine = engine_with_costs(
        markets,
        vec![parity_opportunity("opp-1", dec!(10))],
        dec!(10),
        costs,
    );

    let results = engine.run_cycle().unwrap();
    assert_eq!(results[0].status, ExecutionStatus::PartialHedged);
    assert!(results[0]
        .failure_flags
        .contains(&paperedge::engine::FailureFlag::LegUnfilled));

    let ledger = engine.ledger();
    // leg 1: 4.50 notional + 4.50 fee; hedge sell: 4.50 proceeds − 4.50 fee.
    assert_eq!(ledger.available_cash(), dec!(1.0));
    assert!(ledger.available_cash() >= dec!(0));
    assert_eq!(ledger.fees_paid(), dec!(9.0));
    assert_eq!(ledger.realized_pnl(), dec!(0));
    assert_eq!(ledger.open_position_count(), 0);
    // The audit record charges the closing fee against the hedge fill.
    assert_eq!(results[0].realized_pnl, dec!(-4.5));
    assert_ledger_identity(&engine);
}

#[test]
fn default_config_drives_a_successful_execution() {
    let config = Config::default();
    let markets = vec![binary_market("m1", "polymarket", dec!(10000))];
    let mut engine = ExecutionEngine::new(
        &config,
        Box::new(StaticSource::new(markets)),
        vec![Box::new(StaticDetector::new(vec![parity_opportunity(
            "opp-1",
            dec!(100),
        )]))],
    );

    let results = engine.run_cycle().unwrap();
    assert_eq!(results[0].status, ExecutionStatus::Success);
    assert!(engine.ledger().fees_paid() > dec!(0));
    assert!(engine.ledger().slippage_cost() > dec!(0));
    assert_ledger_identity(&engine);
}

#[test]
fn default_limits_reject_thin_markets() {
    // Total liquidity 200 is below the default 500 floor; every earlier
    // check passes so the record carries the liquidity reason.
    let markets = vec![binary_market("m1", "polymarket", dec!(100))];
    let mut engine = ExecutionEngine::from_parts(
        LedgerStore::new(dec!(10000)),
        OpportunityValidator::new(RiskLimits::default()),
        FillSimulator::new(CostModel::frictionless()),
        VenueCapabilityRegistry::default(),
        Box::new(StaticSource::new(markets)),
        vec![Box::new(StaticDetector::new(vec![parity_opportunity(
            "opp-1",
            dec!(10),
        )]))],
    );

    let results = engine.run_cycle().unwrap();
    assert!(matches!(
        &results[0].status,
        ExecutionStatus::Rejected { reason, .. } if reason == "liquidity_below_floor"
    ));
    assert_eq!(engine.ledger().available_cash(), dec!(10000));
}

#[test]
fn audit_log_serializes_stable_json_lines() {
    let markets = vec![binary_market("m1", "polymarket", dec!(10000))];
    let mut engine = engine_with_costs(
        markets,
        vec![parity_opportunity("opp-1", dec!(10))],
        dec!(1000),
        CostModel::frictionless(),
    );
    engine.run_cycle().unwrap();

    let lines = engine.audit_log().to_json_lines().unwrap();
    assert_eq!(lines.lines().count(), 1);

    let record: serde_json::Value = serde_json::from_str(lines.trim()).unwrap();
    assert_eq!(record["status"], "success");
    assert_eq!(record["opportunity_id"], "opp-1");
    assert_eq!(record["kind"], "parity");
    assert_eq!(record["trace_id"].as_str().unwrap().len(), 16);
    assert_eq!(record["fills"].as_array().unwrap().len(), 2);
    assert_eq!(record["hedge_fills"].as_array().unwrap().len(), 0);
    assert_eq!(record["intended"].as_array().unwrap().len(), 2);
    assert_eq!(record["prices_before"][0]["mark_price"], "0.45");
    assert_eq!(record["fills"][0]["side"], "BUY");
    assert!(record["latency_ms"].is_number());
}

#[test]
fn trace_ids_are_deterministic_across_engines() {
    let run = || {
        let markets = vec![binary_market("m1", "polymarket", dec!(10000))];
        let mut engine = engine_with_costs(
            markets,
            vec![parity_opportunity("opp-1", dec!(10))],
            dec!(1000),
            CostModel::frictionless(),
        );
        engine.run_cycle().unwrap();
        engine.audit_log().records()[0].trace_id.clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn detector_trait_is_object_safe_in_engine_position() {
    let detector: Box<dyn Detector> = Box::new(StaticDetector::new(Vec::new()));
    assert_eq!(detector.name(), "static");

    let mut source: Box<dyn MarketSource> =
        Box::new(StaticSource::new(vec![binary_market("m1", "polymarket", dec!(100))]));
    assert_eq!(source.get_market_snapshot().len(), 1);
}
