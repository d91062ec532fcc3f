//! Execution audit records.
//!
//! Every processed opportunity produces exactly one [`ExecutionResult`],
//! whatever its outcome. Records are append-only and serialize to JSON lines
//! for downstream analysis, so field names and status tags are stable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::{
    Fill, MarketId, MarketLookup, Opportunity, OpportunityId, OutcomeId, Price, TradeAction,
};

/// Length of the hex trace id derived from the opportunity digest.
const TRACE_ID_LEN: usize = 16;

/// Terminal status of one opportunity execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Every leg filled at its full requested quantity.
    Success,
    /// At least one leg fell short and the exposure was hedged flat.
    PartialHedged,
    /// No leg filled at all; nothing to hedge.
    PartialCancelled,
    /// Declined before any fill was attempted.
    Rejected {
        /// Stable snake_case reason tag.
        reason: String,
        /// Human-readable detail.
        detail: String,
    },
    /// A fill attempt would have violated a venue constraint.
    FatalViolation,
}

impl ExecutionStatus {
    /// Returns true if any leg was filled under this status.
    #[must_use]
    pub const fn filled_anything(&self) -> bool {
        matches!(self, Self::Success | Self::PartialHedged)
    }
}

/// Non-fatal anomalies observed during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureFlag {
    /// A leg filled at less than its requested quantity.
    PartialFill,
    /// A leg did not fill at all.
    LegUnfilled,
    /// Hedging could not fully flatten the residual exposure.
    HedgeIncomplete,
}

/// Market price observed for one leg just before execution.
#[derive(Debug, Clone, Serialize)]
pub struct LegQuote {
    pub market_id: MarketId,
    pub outcome_id: OutcomeId,
    /// None when the outcome is absent from the snapshot.
    pub mark_price: Option<Price>,
}

/// One complete audit record for a processed opportunity.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub opportunity_id: OpportunityId,
    /// Deterministic digest of the opportunity; stable across retries.
    pub trace_id: String,
    /// Detector type tag.
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    /// Prices observed per leg before any fill was attempted.
    pub prices_before: Vec<LegQuote>,
    /// The intended legs, as detected.
    pub intended: Vec<TradeAction>,
    /// Primary fills, one per leg that filled at nonzero quantity.
    pub fills: Vec<Fill>,
    /// Offsetting fills placed to flatten residual exposure.
    pub hedge_fills: Vec<Fill>,
    #[serde(flatten)]
    pub status: ExecutionStatus,
    /// Realized PnL attributed to this execution (closing fills net of
    /// their fees), including hedges.
    pub realized_pnl: Decimal,
    pub failure_flags: Vec<FailureFlag>,
    pub latency_ms: i64,
}

impl ExecutionResult {
    /// Total fee paid across primary and hedge fills.
    #[must_use]
    pub fn total_fees(&self) -> Decimal {
        self.fills
            .iter()
            .chain(&self.hedge_fills)
            .map(|f| f.fee)
            .sum()
    }
}

/// Deterministic trace id for an opportunity.
///
/// Digest of the opportunity id, detector kind, sorted market ids, and every
/// intended leg. The same opportunity always maps to the same trace id, so
/// retries and duplicate submissions correlate in downstream logs.
#[must_use]
pub fn trace_id(opportunity: &Opportunity) -> String {
    let mut hasher = Sha256::new();
    hasher.update(opportunity.id().as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(opportunity.kind().as_bytes());

    let mut market_ids: Vec<&str> = opportunity
        .market_ids()
        .iter()
        .map(MarketId::as_str)
        .collect();
    market_ids.sort_unstable();
    for id in market_ids {
        hasher.update(b"|");
        hasher.update(id.as_bytes());
    }

    for action in opportunity.actions() {
        hasher.update(b"|");
        hasher.update(action.market_id().as_str().as_bytes());
        hasher.update(b":");
        hasher.update(action.outcome_id().as_str().as_bytes());
        hasher.update(b":");
        hasher.update(action.side().to_string().as_bytes());
        hasher.update(b":");
        hasher.update(action.quantity().normalize().to_string().as_bytes());
        hasher.update(b":");
        hasher.update(action.limit_price().normalize().to_string().as_bytes());
    }

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(TRACE_ID_LEN);
    digest
}

/// Capture per-leg mark prices from the current snapshot.
#[must_use]
pub fn quotes_before(opportunity: &Opportunity, lookup: &MarketLookup) -> Vec<LegQuote> {
    opportunity
        .actions()
        .iter()
        .map(|action| LegQuote {
            market_id: action.market_id().clone(),
            outcome_id: action.outcome_id().clone(),
            mark_price: lookup.mark_price(action.market_id(), action.outcome_id()),
        })
        .collect()
}

/// Append-only in-memory audit log.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Vec<ExecutionResult>,
}

impl AuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: ExecutionResult) {
        self.records.push(record);
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[ExecutionResult] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize the log as JSON lines, one record per line.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a record cannot be encoded.
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}
