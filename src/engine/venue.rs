//! Per-venue trading capabilities.
//!
//! Opportunities may span venues with different shorting policies, so the
//! capability is looked up per venue, never held as a global flag.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::VenueId;

/// Whether a venue permits SELL-to-open (shorting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueCapability {
    /// SELL may open or extend a short position.
    ShortingAllowed,
    /// SELL only reduces an existing long; never permitted at quantity ≤ 0.
    BuyOnly,
}

impl VenueCapability {
    /// Returns true if SELL-to-open is permitted.
    #[must_use]
    pub const fn can_open_short(self) -> bool {
        matches!(self, Self::ShortingAllowed)
    }
}

/// Static lookup of venue capabilities.
///
/// Venues absent from the map fall back to the configured default, which is
/// `BuyOnly` unless stated otherwise: the conservative reading for an
/// unknown venue.
#[derive(Debug, Clone)]
pub struct VenueCapabilityRegistry {
    capabilities: HashMap<VenueId, VenueCapability>,
    default: VenueCapability,
}

impl VenueCapabilityRegistry {
    /// Create a registry with the given fallback capability.
    #[must_use]
    pub fn new(default: VenueCapability) -> Self {
        Self {
            capabilities: HashMap::new(),
            default,
        }
    }

    /// Register a venue's capability, replacing any previous entry.
    pub fn register(&mut self, venue_id: VenueId, capability: VenueCapability) {
        self.capabilities.insert(venue_id, capability);
    }

    /// Look up a venue's capability.
    #[must_use]
    pub fn get(&self, venue_id: &VenueId) -> VenueCapability {
        self.capabilities
            .get(venue_id)
            .copied()
            .unwrap_or(self.default)
    }

    /// Returns true if the venue permits SELL-to-open.
    #[must_use]
    pub fn can_open_short(&self, venue_id: &VenueId) -> bool {
        self.get(venue_id).can_open_short()
    }
}

impl Default for VenueCapabilityRegistry {
    fn default() -> Self {
        Self::new(VenueCapability::BuyOnly)
    }
}
