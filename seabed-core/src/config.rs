//! Policy tunables.
//!
//! Everything here shapes behavior without changing the decision contracts:
//! the same engine with different tunables still emits one in-bounds command
//! per drone per turn. Loaded from JSON as a complete document; defaults
//! match the values the policy was built around.

use serde::{Deserialize, Serialize};

use crate::constants::{DANGER_RADIUS, DRONE_SPEED, EMERGENCY_THRESHOLD, LIGHT_BATTERY_COST};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tunables {
    /// Offset applied on both axes when projecting a radar quadrant into a
    /// concrete destination.
    pub bearing_projection: f64,
    /// Outer radius inside which a visible hazard participates in the
    /// deflection search.
    pub danger_radius: f64,
    /// Inner keep-out distance a vetted heading must maintain from every
    /// propagated hazard position.
    pub emergency_threshold: f64,
    /// Length of each candidate deflection segment: one drone move, so that
    /// progress along a candidate tracks time within the turn.
    pub avoid_step: f64,
    /// Fractional progress samples per candidate segment.
    pub avoid_samples: u32,
    /// Depth at which INGRESS hands over to DESCEND_DEEP.
    pub ingress_floor_y: f64,
    /// Depth at which DESCEND_DEEP hands over to HARVEST.
    pub harvest_trigger_y: f64,
    /// Battery level that forces the HARVEST transition early.
    pub battery_floor: i32,
    /// Turn-parity modulus for the battery-conserving light alternation.
    pub light_cadence: u32,
    /// Radius of the any-nearby-unscanned-creature light check in HARVEST.
    pub nearby_unscanned_radius: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Tunables {
            bearing_projection: 2_000.0,
            danger_radius: DANGER_RADIUS,
            emergency_threshold: EMERGENCY_THRESHOLD,
            avoid_step: DRONE_SPEED as f64,
            avoid_samples: 20,
            ingress_floor_y: 2_500.0,
            harvest_trigger_y: 7_500.0,
            battery_floor: LIGHT_BATTERY_COST,
            light_cadence: 2,
            nearby_unscanned_radius: DANGER_RADIUS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let cfg = Tunables::default();
        assert!(cfg.emergency_threshold < cfg.danger_radius);
        assert!(cfg.ingress_floor_y < cfg.harvest_trigger_y);
        assert!(cfg.avoid_samples > 0);
    }
}
