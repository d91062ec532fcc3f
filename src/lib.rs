//! Paperedge - Opportunity validation, multi-leg paper execution, and accounting.
//!
//! This crate is the in-process core of a prediction market arbitrage
//! simulator: it decides whether a surfaced opportunity is safe to act on,
//! simulates filling its legs against quoted liquidity, recovers from partial
//! failures by hedging or cancelling, and keeps cash/position/PnL bookkeeping
//! exactly consistent across every outcome.
//!
//! # Architecture
//!
//! External collaborators (market data, detection algorithms, notification
//! and reporting surfaces) are reached only through traits:
//!
//! - **[`domain::detector::Detector`]** - Produces opportunities from a
//!   market snapshot; the engine is polymorphic over registered detectors.
//! - **[`engine::MarketSource`]** - Returns a venue-tagged market snapshot
//!   once per cycle.
//!
//! The stateful core lives in [`engine`]:
//!
//! - [`engine::LedgerStore`] - Cash, reservations, positions, PnL counters.
//! - [`engine::VenueCapabilityRegistry`] - Per-venue shorting capability.
//! - [`engine::validator`] - Ordered pre-trade risk checks.
//! - [`engine::FillSimulator`] - Deterministic fill model (slippage, fees,
//!   depth-capped quantity).
//! - [`engine::ExecutionEngine`] - The validate/reserve/fill/hedge state
//!   machine and the `run_cycle` entry point.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Exchange-agnostic types: markets, actions, opportunities
//! - [`engine`] - Ledger, validation, fill simulation, execution
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use paperedge::config::Config;
//! use paperedge::engine::ExecutionEngine;
//!
//! let config = Config::load("config.toml").expect("config");
//! # let source = unimplemented!();
//! # let detectors = vec![];
//! let mut engine = ExecutionEngine::new(&config, source, detectors);
//! let results = engine.run_cycle().expect("cycle");
//! ```

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
