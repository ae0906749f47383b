//! Hazard avoidance: the deflection search ("protection mode").
//!
//! Given a drone's position, its raw intended destination and the visible
//! hazards nearby, sweep 360 one-degree rotations of the intended heading and
//! keep the candidate whose endpoint stays closest to the raw destination
//! while clearing every hazard's predicted track. The search is pure and
//! deterministic; the caller always gets a destination back.

use crate::config::Tunables;
use crate::geom::Point;

/// A visible hazard's observed position and velocity for this turn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HazardTrack {
    pub pos: Point,
    pub vel: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvoidOutcome {
    /// The raw segment was already safe; destination unchanged.
    Clear,
    /// A rotated heading was substituted for the raw destination.
    Deflected,
    /// No candidate survived; the raw destination was kept unguarded.
    NoSafeHeading,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Avoidance {
    pub dest: Point,
    pub outcome: AvoidOutcome,
}

/// Deflect `raw_dest` away from `hazards`.
///
/// Every candidate is one drone move: the raw heading and its 359 one-degree
/// rotations, each scaled to `cfg.avoid_step` so that progress fraction `t`
/// along a candidate is also the fraction of a turn elapsed. Each segment is
/// sampled at `cfg.avoid_samples` fractional progress points; at fraction `t`
/// every hazard is propagated to `pos + vel * t`, and the candidate dies if
/// any sampled point comes within `cfg.emergency_threshold` of any propagated
/// hazard. The raw destination is only the scoring reference: the surviving
/// candidate whose endpoint is nearest to it wins, earlier sweep angles
/// taking ties.
pub fn avoid_hazards(
    pos: Point,
    raw_dest: Point,
    hazards: &[HazardTrack],
    cfg: &Tunables,
) -> Avoidance {
    let Some(heading) = (raw_dest - pos).unit() else {
        // Already there; nothing to deflect.
        return Avoidance {
            dest: raw_dest,
            outcome: AvoidOutcome::Clear,
        };
    };

    // Vet the raw heading over the move the drone will actually make this
    // turn; a leg shorter than one step ends at the destination itself.
    let direct_probe = if pos.dist(raw_dest) <= cfg.avoid_step {
        raw_dest
    } else {
        pos + heading * cfg.avoid_step
    };
    if hazards.is_empty() || segment_is_safe(pos, direct_probe, hazards, cfg) {
        return Avoidance {
            dest: raw_dest,
            outcome: AvoidOutcome::Clear,
        };
    }

    let mut best: Option<(Point, f64)> = None;
    for degree in 1..360u32 {
        let endpoint = (pos + heading.rotate(f64::from(degree).to_radians()) * cfg.avoid_step)
            .clamp_to_map();
        if !segment_is_safe(pos, endpoint, hazards, cfg) {
            continue;
        }
        let score = endpoint.dist(raw_dest);
        if best.map(|(_, s)| score < s).unwrap_or(true) {
            best = Some((endpoint, score));
        }
    }

    match best {
        Some((dest, _)) => Avoidance {
            dest,
            outcome: AvoidOutcome::Deflected,
        },
        // Documented fallback: prefer forward progress on the unguarded
        // heading over freezing in place; the caller annotates the command.
        None => Avoidance {
            dest: raw_dest,
            outcome: AvoidOutcome::NoSafeHeading,
        },
    }
}

fn segment_is_safe(pos: Point, endpoint: Point, hazards: &[HazardTrack], cfg: &Tunables) -> bool {
    for step in 1..=cfg.avoid_samples {
        let t = f64::from(step) / f64::from(cfg.avoid_samples);
        let probe = pos.lerp(endpoint, t);
        for hazard in hazards {
            let predicted = hazard.pos + hazard.vel * t;
            if probe.dist(predicted) < cfg.emergency_threshold {
                return false;
            }
        }
    }
    true
}
