//! World model: fixed rosters plus everything the engine knows this turn.
//!
//! Fields split into two groups. Turn-local facts (visibility, positions,
//! bearings, scan sets, battery, emergency) are cleared and rebuilt at the
//! start of every [`WorldState::apply_turn`]. Cumulative facts (saved flags,
//! alive flags, scores, turn counter) only ever move forward. The state is
//! frozen for the rest of the cycle once `apply_turn` returns; the decision
//! components read through the query surface and return values.

use std::collections::{BTreeMap, BTreeSet};

use crate::constants::is_hazard_type;
use crate::error::EngineError;
use crate::geom::Point;
use crate::hazard::HazardTrack;
use crate::protocol::{InitFrame, Quadrant, TurnFrame};

pub type CreatureId = i32;
pub type DroneId = i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Team {
    Mine,
    Foe,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Creature {
    pub id: CreatureId,
    pub color: i32,
    /// Depth-band type; negative marks a hazard.
    pub kind: i32,
    // turn-local
    pub pos: Option<Point>,
    pub vel: Option<Point>,
    pub scanned_by_me: bool,
    pub scanned_by_foe: bool,
    // cumulative
    pub saved_by_me: bool,
    pub saved_by_foe: bool,
    pub alive: bool,
}

impl Creature {
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.pos.is_some()
    }

    #[inline]
    pub fn is_hazard(&self) -> bool {
        is_hazard_type(self.kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drone {
    pub id: DroneId,
    pub team: Team,
    // turn-local
    pub pos: Point,
    pub battery: i32,
    pub emergency: bool,
    /// Unsaved scans held right now, as reported by the host this turn.
    pub scans: Vec<CreatureId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldState {
    turn: u32,
    my_score: i32,
    foe_score: i32,
    creatures: BTreeMap<CreatureId, Creature>,
    my_drones: BTreeMap<DroneId, Drone>,
    foe_drones: BTreeMap<DroneId, Drone>,
    bearings: BTreeMap<(DroneId, CreatureId), Quadrant>,
    roster_frozen: bool,
}

impl WorldState {
    /// Populate the fixed creature roster. Called once per match.
    pub fn new(init: &InitFrame) -> Self {
        let creatures = init
            .creatures
            .iter()
            .map(|spec| {
                (
                    spec.id,
                    Creature {
                        id: spec.id,
                        color: spec.color,
                        kind: spec.kind,
                        pos: None,
                        vel: None,
                        scanned_by_me: false,
                        scanned_by_foe: false,
                        saved_by_me: false,
                        saved_by_foe: false,
                        alive: true,
                    },
                )
            })
            .collect();

        WorldState {
            turn: 0,
            my_score: 0,
            foe_score: 0,
            creatures,
            my_drones: BTreeMap::new(),
            foe_drones: BTreeMap::new(),
            bearings: BTreeMap::new(),
            roster_frozen: false,
        }
    }

    /// Rebuild all turn-local facts from `frame` and merge the cumulative
    /// ones. The first frame also registers the drone roster; afterwards any
    /// unknown identity is a consistency fault.
    pub fn apply_turn(&mut self, frame: &TurnFrame) -> Result<(), EngineError> {
        self.turn += 1;
        self.my_score = frame.my_score;
        self.foe_score = frame.foe_score;

        for creature in self.creatures.values_mut() {
            creature.pos = None;
            creature.vel = None;
            // saved implies scanned, and neither ever clears
            creature.scanned_by_me = creature.saved_by_me;
            creature.scanned_by_foe = creature.saved_by_foe;
        }
        self.bearings.clear();

        for id in &frame.my_saved {
            let creature = self.creature_mut(*id)?;
            creature.saved_by_me = true;
            creature.scanned_by_me = true;
        }
        for id in &frame.foe_saved {
            let creature = self.creature_mut(*id)?;
            creature.saved_by_foe = true;
            creature.scanned_by_foe = true;
        }

        if !self.roster_frozen {
            for status in &frame.my_drones {
                self.my_drones.insert(
                    status.id,
                    Drone {
                        id: status.id,
                        team: Team::Mine,
                        pos: Point::default(),
                        battery: 0,
                        emergency: false,
                        scans: Vec::new(),
                    },
                );
            }
            for status in &frame.foe_drones {
                self.foe_drones.insert(
                    status.id,
                    Drone {
                        id: status.id,
                        team: Team::Foe,
                        pos: Point::default(),
                        battery: 0,
                        emergency: false,
                        scans: Vec::new(),
                    },
                );
            }
            self.roster_frozen = true;
        }

        for status in frame.my_drones.iter().chain(&frame.foe_drones) {
            let drone = self
                .my_drones
                .get_mut(&status.id)
                .or_else(|| self.foe_drones.get_mut(&status.id))
                .ok_or(EngineError::UnknownDrone { id: status.id })?;
            drone.pos = Point::new(status.x as f64, status.y as f64);
            drone.battery = status.battery;
            drone.emergency = status.emergency;
            drone.scans.clear();
        }

        for pair in &frame.scans {
            let team = self.drone_team(pair.drone_id)?;
            let creature = self.creature_mut(pair.creature_id)?;
            match team {
                Team::Mine => creature.scanned_by_me = true,
                Team::Foe => creature.scanned_by_foe = true,
            }
            let drone = match team {
                Team::Mine => self.my_drones.get_mut(&pair.drone_id),
                Team::Foe => self.foe_drones.get_mut(&pair.drone_id),
            }
            .ok_or(EngineError::UnknownDrone { id: pair.drone_id })?;
            drone.scans.push(pair.creature_id);
        }

        // ids seen alive this turn, either directly or on radar
        let mut referenced: BTreeSet<CreatureId> = BTreeSet::new();

        for visible in &frame.visibles {
            let creature = self.creature_mut(visible.id)?;
            if !creature.alive {
                continue;
            }
            creature.pos = Some(Point::new(visible.x as f64, visible.y as f64));
            creature.vel = Some(Point::new(visible.vx as f64, visible.vy as f64));
            referenced.insert(visible.id);
        }

        for blip in &frame.blips {
            if !self.my_drones.contains_key(&blip.drone_id) {
                return Err(EngineError::UnknownDrone { id: blip.drone_id });
            }
            let creature = self.creature_mut(blip.creature_id)?;
            if !creature.alive {
                continue;
            }
            referenced.insert(blip.creature_id);
            if creature.is_visible() {
                continue;
            }
            self.bearings
                .insert((blip.drone_id, blip.creature_id), blip.quadrant);
        }

        for creature in self.creatures.values_mut() {
            if creature.alive && !referenced.contains(&creature.id) {
                creature.alive = false;
            }
        }

        Ok(())
    }

    fn creature_mut(&mut self, id: CreatureId) -> Result<&mut Creature, EngineError> {
        self.creatures
            .get_mut(&id)
            .ok_or(EngineError::UnknownCreature { id })
    }

    fn drone_team(&self, id: DroneId) -> Result<Team, EngineError> {
        if self.my_drones.contains_key(&id) {
            Ok(Team::Mine)
        } else if self.foe_drones.contains_key(&id) {
            Ok(Team::Foe)
        } else {
            Err(EngineError::UnknownDrone { id })
        }
    }

    // ── Query surface ───────────────────────────────────────────────

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn scores(&self) -> (i32, i32) {
        (self.my_score, self.foe_score)
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn drone(&self, id: DroneId) -> Option<&Drone> {
        self.my_drones.get(&id).or_else(|| self.foe_drones.get(&id))
    }

    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    /// Own drones in identity order, the processing order of a cycle.
    pub fn my_drones(&self) -> impl Iterator<Item = &Drone> {
        self.my_drones.values()
    }

    pub fn foe_drones(&self) -> impl Iterator<Item = &Drone> {
        self.foe_drones.values()
    }

    pub fn visible_creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values().filter(|c| c.is_visible())
    }

    /// Living harvestable creatures of one depth-band type.
    pub fn living_in_band(&self, band: i32) -> impl Iterator<Item = &Creature> {
        self.creatures
            .values()
            .filter(move |c| c.alive && !c.is_hazard() && c.kind == band)
    }

    /// Radar quadrant of a non-visible living creature relative to a drone.
    pub fn bearing(&self, drone: DroneId, creature: CreatureId) -> Option<Quadrant> {
        self.bearings.get(&(drone, creature)).copied()
    }

    /// Quadrants in which this drone currently has living hazards on radar.
    pub fn hazard_bearings(&self, drone: DroneId) -> BTreeSet<Quadrant> {
        self.bearings
            .iter()
            .filter(|((d, c), _)| {
                *d == drone
                    && self
                        .creatures
                        .get(c)
                        .map(|creature| creature.is_hazard())
                        .unwrap_or(false)
            })
            .map(|(_, quadrant)| *quadrant)
            .collect()
    }

    /// Visible living hazards within `radius` of `origin`, with their
    /// observed velocities.
    pub fn visible_hazards_near(&self, origin: Point, radius: f64) -> Vec<HazardTrack> {
        self.creatures
            .values()
            .filter(|c| c.alive && c.is_hazard())
            .filter_map(|c| {
                let pos = c.pos?;
                if pos.dist(origin) <= radius {
                    Some(HazardTrack {
                        pos,
                        vel: c.vel.unwrap_or_default(),
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// True once every living harvestable creature is scanned or saved by us.
    pub fn all_scanned_by_me(&self) -> bool {
        self.creatures
            .values()
            .filter(|c| c.alive && !c.is_hazard())
            .all(|c| c.scanned_by_me)
    }

    /// Any visible, living, not-yet-scanned harvestable creature within
    /// `radius` of `origin`.
    pub fn any_unscanned_near(&self, origin: Point, radius: f64) -> bool {
        self.creatures.values().any(|c| {
            c.alive
                && !c.is_hazard()
                && !c.scanned_by_me
                && c.pos.map(|p| p.dist(origin) <= radius).unwrap_or(false)
        })
    }
}
