//! Opportunity execution state machine.
//!
//! Drives each validated opportunity through reserve → fill → settle, with
//! hedge-or-cancel handling for partial fills. The engine is the exclusive
//! owner and only writer of the [`LedgerStore`]; collaborators see it
//! through read-only snapshots.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::domain::{
    Detector, Fill, Market, MarketLookup, Opportunity, Side, TradeAction,
};
use crate::error::{EngineError, Result};

use super::audit::{
    quotes_before, trace_id, AuditLog, ExecutionResult, ExecutionStatus, FailureFlag,
};
use super::fill::FillSimulator;
use super::ledger::{LedgerSnapshot, LedgerStore, PositionKey};
use super::validator::{OpportunityValidator, RejectReason};
use super::venue::VenueCapabilityRegistry;

/// Provides the market snapshot for each evaluation cycle.
pub trait MarketSource {
    /// Fetch the current snapshot of all tracked markets.
    fn get_market_snapshot(&mut self) -> Vec<Market>;
}

/// Outcome of one leg's fill attempt, before status aggregation.
enum LegOutcome {
    Filled(Fill),
    Unfilled,
    Fatal(EngineError),
}

/// Validates, executes, and accounts for detected opportunities.
pub struct ExecutionEngine {
    validator: OpportunityValidator,
    simulator: FillSimulator,
    venues: VenueCapabilityRegistry,
    ledger: LedgerStore,
    detectors: Vec<Box<dyn Detector>>,
    source: Box<dyn MarketSource>,
    executed: HashSet<crate::domain::OpportunityId>,
    audit: AuditLog,
    stop: Arc<AtomicBool>,
}

impl ExecutionEngine {
    /// Build an engine from configuration.
    #[must_use]
    pub fn new(
        config: &Config,
        source: Box<dyn MarketSource>,
        detectors: Vec<Box<dyn Detector>>,
    ) -> Self {
        Self::from_parts(
            LedgerStore::new(config.ledger.initial_cash),
            OpportunityValidator::new(config.risk_limits()),
            FillSimulator::new(config.cost_model()),
            config.venue_registry(),
            source,
            detectors,
        )
    }

    /// Build an engine from explicit parts; useful for seeding state.
    #[must_use]
    pub fn from_parts(
        ledger: LedgerStore,
        validator: OpportunityValidator,
        simulator: FillSimulator,
        venues: VenueCapabilityRegistry,
        source: Box<dyn MarketSource>,
        detectors: Vec<Box<dyn Detector>>,
    ) -> Self {
        Self {
            validator,
            simulator,
            venues,
            ledger,
            detectors,
            source,
            executed: HashSet::new(),
            audit: AuditLog::new(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for requesting a graceful stop between opportunities.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Read-only view of the ledger.
    #[must_use]
    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    /// Borrow the ledger for inspection.
    #[must_use]
    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    /// All audit records appended so far.
    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Run one full cycle: snapshot markets, detect, and execute.
    ///
    /// Returns the audit records produced this cycle. A stop request is
    /// honored between opportunities, never mid-opportunity.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::FatalViolation`] (after appending the audit
    /// record) if a fill attempt would breach a venue constraint; the rest
    /// of the cycle is abandoned.
    pub fn run_cycle(&mut self) -> Result<Vec<ExecutionResult>> {
        let markets = self.source.get_market_snapshot();
        let lookup = MarketLookup::from_markets(markets.clone());

        let mut opportunities = Vec::new();
        for detector in &self.detectors {
            let found = detector.detect(&markets);
            debug!(
                detector = detector.name(),
                count = found.len(),
                "Detector pass complete"
            );
            opportunities.extend(found);
        }
        info!(
            markets = markets.len(),
            opportunities = opportunities.len(),
            "Evaluation cycle started"
        );

        let mut results = Vec::new();
        for opportunity in opportunities {
            if self.stop.load(Ordering::Relaxed) {
                info!("Stop requested; abandoning remaining opportunities");
                break;
            }

            let (record, fatal) = self.execute(&opportunity, &lookup);
            self.audit.push(record.clone());
            results.push(record);

            if let Some(violation) = fatal {
                error!(error = %violation, "Aborting cycle");
                return Err(violation.into());
            }
        }
        Ok(results)
    }

    /// Drive one opportunity through the state machine.
    ///
    /// Always produces an audit record; a fatal violation is returned
    /// alongside it so the caller can abort after logging.
    fn execute(
        &mut self,
        opportunity: &Opportunity,
        lookup: &MarketLookup,
    ) -> (ExecutionResult, Option<EngineError>) {
        let started = Instant::now();
        let trace = trace_id(opportunity);

        if self.executed.contains(opportunity.id()) {
            let reason = RejectReason::DuplicateOpportunity {
                id: opportunity.id().to_string(),
            };
            return (
                self.record(opportunity, &trace, lookup, rejected(&reason), started),
                None,
            );
        }

        if let Err(reason) =
            self.validator
                .validate(opportunity, lookup, &self.ledger, &self.venues, Utc::now())
        {
            return (
                self.record(opportunity, &trace, lookup, rejected(&reason), started),
                None,
            );
        }

        let requirement = reservation_requirement(opportunity.actions());
        if let Err(err) = self.ledger.reserve(requirement) {
            let reason = match err {
                super::ledger::LedgerError::InsufficientCash {
                    available,
                    requested,
                } => RejectReason::InsufficientCash {
                    available,
                    required: requested,
                },
            };
            return (
                self.record(opportunity, &trace, lookup, rejected(&reason), started),
                None,
            );
        }

        // Cash is committed, so the id is consumed: the same opportunity is
        // never attempted twice, whatever happens below. Rejections above
        // this point leave the id free for a retry on a later cycle.
        self.executed.insert(opportunity.id().clone());

        let mut fills = Vec::new();
        let mut flags = Vec::new();
        let mut fatal = None;
        for action in opportunity.actions() {
            match self.fill_leg(action, lookup) {
                LegOutcome::Filled(fill) => {
                    if fill.quantity < action.quantity() {
                        flags.push(FailureFlag::PartialFill);
                    }
                    fills.push(fill);
                }
                LegOutcome::Unfilled => flags.push(FailureFlag::LegUnfilled),
                LegOutcome::Fatal(err) => {
                    fatal = Some(err);
                    break;
                }
            }
        }

        // One opportunity in flight at a time, so whatever remains reserved
        // belongs to it and can be returned wholesale.
        self.ledger.release(self.ledger.reserved_cash());

        if let Some(violation) = fatal {
            let record = self.record(
                opportunity,
                &trace,
                lookup,
                Settled {
                    status: ExecutionStatus::FatalViolation,
                    fills,
                    hedge_fills: Vec::new(),
                    flags,
                },
                started,
            );
            return (record, Some(violation));
        }

        let fully_filled = fills.len() == opportunity.actions().len()
            && fills
                .iter()
                .zip(opportunity.actions())
                .all(|(fill, action)| fill.quantity == action.quantity());

        let (status, hedge_fills) = if fully_filled {
            (ExecutionStatus::Success, Vec::new())
        } else if fills.is_empty() {
            (ExecutionStatus::PartialCancelled, Vec::new())
        } else {
            let (hedges, complete) = self.hedge(&fills, lookup);
            if !complete {
                flags.push(FailureFlag::HedgeIncomplete);
            }
            (ExecutionStatus::PartialHedged, hedges)
        };

        let record = self.record(
            opportunity,
            &trace,
            lookup,
            Settled {
                status,
                fills,
                hedge_fills,
                flags,
            },
            started,
        );
        (record, None)
    }

    /// Attempt one leg. Unaffordable or depth-starved legs fill at zero
    /// rather than overdrawing the ledger.
    fn fill_leg(&mut self, action: &TradeAction, lookup: &MarketLookup) -> LegOutcome {
        let Some(market) = lookup.get(action.market_id()) else {
            return LegOutcome::Unfilled;
        };
        let Some(outcome) = market.outcome(action.outcome_id()) else {
            return LegOutcome::Unfilled;
        };

        // The validator already enforced this; reaching it here means a
        // bug upstream, and the cycle must not continue on a corrupt
        // assumption.
        if action.side() == Side::Sell && !self.venues.can_open_short(market.venue_id()) {
            let held = self
                .ledger
                .position_quantity(action.market_id(), action.outcome_id());
            if held < action.quantity() {
                return LegOutcome::Fatal(EngineError::FatalViolation {
                    market_id: action.market_id().to_string(),
                    outcome_id: action.outcome_id().to_string(),
                    held,
                    requested: action.quantity(),
                });
            }
        }

        let plan = self.simulator.simulate(action, outcome);
        if plan.is_empty() {
            return LegOutcome::Unfilled;
        }
        if action.side() == Side::Buy && !self.ledger.can_cover(plan.buy_cost()) {
            debug!(
                market_id = %action.market_id(),
                outcome_id = %action.outcome_id(),
                cost = %plan.buy_cost(),
                "Leg unaffordable; filling at zero"
            );
            return LegOutcome::Unfilled;
        }

        let fill = self.ledger.apply_fill(action, &plan);
        debug!(
            market_id = %fill.market_id,
            outcome_id = %fill.outcome_id,
            side = %fill.side,
            quantity = %fill.quantity,
            effective_price = %fill.effective_price,
            "Leg filled"
        );
        LegOutcome::Filled(fill)
    }

    /// Flatten the net exposure left by a partial execution.
    ///
    /// Each (market, outcome) with a nonzero net fill gets an offsetting
    /// order at the current mark price through the same fill simulator.
    /// Returns the hedge fills and whether every key was fully flattened.
    fn hedge(&mut self, fills: &[Fill], lookup: &MarketLookup) -> (Vec<Fill>, bool) {
        let mut net: Vec<(PositionKey, Decimal)> = Vec::new();
        for fill in fills {
            let signed = match fill.side {
                Side::Buy => fill.quantity,
                Side::Sell => -fill.quantity,
            };
            let key = PositionKey::new(fill.market_id.clone(), fill.outcome_id.clone());
            match net.iter_mut().find(|(k, _)| *k == key) {
                Some((_, total)) => *total += signed,
                None => net.push((key, signed)),
            }
        }

        let mut hedges = Vec::new();
        let mut complete = true;
        for (key, exposure) in net {
            if exposure.is_zero() {
                continue;
            }
            let side = if exposure > Decimal::ZERO {
                Side::Sell
            } else {
                Side::Buy
            };
            let Some(outcome) = lookup.outcome(&key.market_id, &key.outcome_id) else {
                warn!(
                    market_id = %key.market_id,
                    outcome_id = %key.outcome_id,
                    "No quote for hedge leg; exposure remains"
                );
                complete = false;
                continue;
            };

            let action = TradeAction::new(
                key.market_id.clone(),
                key.outcome_id.clone(),
                side,
                exposure.abs(),
                outcome.price(),
            );
            let plan = self.simulator.simulate(&action, outcome);
            let affordable =
                side == Side::Sell || self.ledger.can_cover(plan.buy_cost());
            if plan.is_empty() || !affordable {
                warn!(
                    market_id = %key.market_id,
                    outcome_id = %key.outcome_id,
                    exposure = %exposure,
                    "Hedge leg could not fill; exposure remains"
                );
                complete = false;
                continue;
            }
            if plan.quantity < exposure.abs() {
                complete = false;
            }

            let fill = self.ledger.apply_fill(&action, &plan);
            info!(
                market_id = %fill.market_id,
                outcome_id = %fill.outcome_id,
                side = %fill.side,
                quantity = %fill.quantity,
                "Hedged residual exposure"
            );
            hedges.push(fill);
        }
        (hedges, complete)
    }

    fn record(
        &self,
        opportunity: &Opportunity,
        trace: &str,
        lookup: &MarketLookup,
        settled: Settled,
        started: Instant,
    ) -> ExecutionResult {
        let realized_pnl = settled
            .fills
            .iter()
            .chain(&settled.hedge_fills)
            .map(|f| f.realized_pnl)
            .sum();

        let latency_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
        let record = ExecutionResult {
            opportunity_id: opportunity.id().clone(),
            trace_id: trace.to_string(),
            kind: opportunity.kind().to_string(),
            timestamp: Utc::now(),
            prices_before: quotes_before(opportunity, lookup),
            intended: opportunity.actions().to_vec(),
            fills: settled.fills,
            hedge_fills: settled.hedge_fills,
            status: settled.status,
            realized_pnl,
            failure_flags: settled.flags,
            latency_ms,
        };
        info!(
            opportunity_id = %record.opportunity_id,
            trace_id = %record.trace_id,
            status = ?record.status,
            realized_pnl = %record.realized_pnl,
            "Opportunity settled"
        );
        record
    }
}

/// Terminal state handed to record construction.
struct Settled {
    status: ExecutionStatus,
    fills: Vec<Fill>,
    hedge_fills: Vec<Fill>,
    flags: Vec<FailureFlag>,
}

fn rejected(reason: &RejectReason) -> Settled {
    Settled {
        status: ExecutionStatus::Rejected {
            reason: reason.tag().to_string(),
            detail: reason.to_string(),
        },
        fills: Vec::new(),
        hedge_fills: Vec::new(),
        flags: Vec::new(),
    }
}

/// Cash to set aside before filling: net BUY notional at limit prices,
/// floored at zero when SELL proceeds dominate.
fn reservation_requirement(actions: &[TradeAction]) -> Decimal {
    let net: Decimal = actions
        .iter()
        .map(|a| match a.side() {
            Side::Buy => a.notional(),
            Side::Sell => -a.notional(),
        })
        .sum();
    net.max(Decimal::ZERO)
}
