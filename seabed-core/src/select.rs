//! Target selection policy.
//!
//! Pure over the frozen [`WorldState`]: the same state, drone and claimed set
//! always produce the same target. Bands are finished shallow-first; within a
//! band a visible candidate beats radar, and a radar candidate whose quadrant
//! is free of hazard blips beats one that shares a direction with a predator.

use std::collections::BTreeSet;

use crate::config::Tunables;
use crate::constants::{BAND_COUNT, SURFACE_SAVE_Y};
use crate::geom::Point;
use crate::world::{CreatureId, Drone, WorldState};

/// A drone's pursuit choice for one cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    /// Creature to claim for the rest of the cycle; `None` on exhaustion.
    pub creature: Option<CreatureId>,
    pub dest: Point,
}

impl Target {
    fn harbor(drone: &Drone) -> Target {
        Target {
            creature: None,
            dest: Point::new(drone.pos.x, SURFACE_SAVE_Y as f64),
        }
    }
}

/// Pick the creature `drone` should pursue, excluding ids already claimed by
/// earlier drones this cycle. Exhaustion resolves to the surface harbor above
/// the drone, never an error.
pub fn select_target(
    world: &WorldState,
    drone: &Drone,
    claimed: &BTreeSet<CreatureId>,
    cfg: &Tunables,
) -> Target {
    for band in 0..BAND_COUNT as i32 {
        let candidates: Vec<_> = world
            .living_in_band(band)
            .filter(|c| !c.scanned_by_me && !claimed.contains(&c.id))
            .collect();
        if candidates.is_empty() {
            continue;
        }

        // Visible beats radar; nearest wins, id order breaks ties.
        let visible = candidates
            .iter()
            .filter_map(|c| c.pos.map(|pos| (c.id, pos)))
            .min_by(|a, b| {
                drone
                    .pos
                    .dist_sq(a.1)
                    .total_cmp(&drone.pos.dist_sq(b.1))
                    .then(a.0.cmp(&b.0))
            });
        if let Some((id, pos)) = visible {
            return Target {
                creature: Some(id),
                dest: pos,
            };
        }

        // Radar only. A quadrant that also holds a hazard blip is ambiguous:
        // steering into it may run the drone onto the predator instead.
        let hazard_dirs = world.hazard_bearings(drone.id);
        let on_radar: Vec<_> = candidates
            .iter()
            .filter_map(|c| world.bearing(drone.id, c.id).map(|q| (c.id, q)))
            .collect();
        let pick = on_radar
            .iter()
            .find(|(_, q)| !hazard_dirs.contains(q))
            .or_else(|| on_radar.first());
        if let Some(&(id, quadrant)) = pick {
            let (sx, sy) = quadrant.signs();
            let dest = (drone.pos + Point::new(sx, sy) * cfg.bearing_projection).clamp_to_map();
            return Target {
                creature: Some(id),
                dest,
            };
        }
    }

    Target::harbor(drone)
}
