//! Per-drone phase machine and fleet sequencing.
//!
//! Each drone walks a one-way phase ladder: descend through the shallows
//! (INGRESS), push for the deep band (DESCEND_DEEP), then surface and keep
//! surfacing to bank scans (HARVEST, sticky for the rest of the match). The
//! fleet is processed in identity order and earlier drones' claims are
//! excluded from later drones' selection, so a cycle is fully deterministic.
//! Whatever a phase proposes, the deflection search has the final say on the
//! destination.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::Tunables;
use crate::constants::{LIGHT_BATTERY_COST, SURFACE_SAVE_Y};
use crate::geom::Point;
use crate::hazard::{avoid_hazards, AvoidOutcome};
use crate::protocol::Command;
use crate::select::{select_target, Target};
use crate::world::{CreatureId, Drone, DroneId, WorldState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ingress,
    DescendDeep,
    Harvest,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Ingress => "ingress",
            Phase::DescendDeep => "descend_deep",
            Phase::Harvest => "harvest",
        }
    }
}

/// Everything decided for one drone in one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub drone_id: DroneId,
    pub phase: Phase,
    pub target: Option<CreatureId>,
    pub avoidance: AvoidOutcome,
    pub command: Command,
}

/// Drives all own drones, one pass per turn.
#[derive(Clone, Debug)]
pub struct FleetPilot {
    cfg: Tunables,
    phases: BTreeMap<DroneId, Phase>,
}

impl FleetPilot {
    pub fn new(cfg: Tunables) -> Self {
        FleetPilot {
            cfg,
            phases: BTreeMap::new(),
        }
    }

    pub fn tunables(&self) -> &Tunables {
        &self.cfg
    }

    pub fn phase(&self, drone: DroneId) -> Option<Phase> {
        self.phases.get(&drone).copied()
    }

    /// One decision cycle: exactly one command per own drone, in identity
    /// order. Must be called after the world has applied the same turn.
    pub fn decide(&mut self, world: &WorldState) -> Vec<Decision> {
        let all_scanned = world.all_scanned_by_me();
        let mut claimed: BTreeSet<CreatureId> = BTreeSet::new();
        let mut decisions = Vec::new();

        for drone in world.my_drones() {
            let phase = self.phases.entry(drone.id).or_insert(Phase::Ingress);

            if drone.emergency {
                // Host is floating the drone back up; nothing to steer. Start
                // over from the top once control returns.
                *phase = Phase::Ingress;
                decisions.push(Decision {
                    drone_id: drone.id,
                    phase: *phase,
                    target: None,
                    avoidance: AvoidOutcome::Clear,
                    command: Command::hold(false, Some("emergency".to_string())),
                });
                continue;
            }

            if *phase == Phase::Ingress && drone.pos.y >= self.cfg.ingress_floor_y {
                *phase = Phase::DescendDeep;
            }
            if *phase == Phase::DescendDeep
                && (drone.pos.y >= self.cfg.harvest_trigger_y
                    || drone.battery < self.cfg.battery_floor)
            {
                *phase = Phase::Harvest;
            }
            let phase = *phase;

            let (target, raw_dest, light) = match phase {
                Phase::Ingress | Phase::DescendDeep => {
                    let target = select_target(world, drone, &claimed, &self.cfg);
                    if let Some(id) = target.creature {
                        claimed.insert(id);
                    }
                    let light = all_scanned || self.cruise_light(world, drone);
                    (target, target.dest, light)
                }
                Phase::Harvest => {
                    let dest = Point::new(drone.pos.x, SURFACE_SAVE_Y as f64);
                    let light = all_scanned
                        || (drone.battery >= LIGHT_BATTERY_COST
                            && world
                                .any_unscanned_near(drone.pos, self.cfg.nearby_unscanned_radius));
                    (Target { creature: None, dest }, dest, light)
                }
            };

            let hazards = world.visible_hazards_near(drone.pos, self.cfg.danger_radius);
            let avoided = avoid_hazards(drone.pos, raw_dest, &hazards, &self.cfg);

            let mut notes: Vec<String> = Vec::new();
            if let Some(id) = target.creature {
                notes.push(format!("tgt={id}"));
            }
            match avoided.outcome {
                AvoidOutcome::Clear => {}
                AvoidOutcome::Deflected => notes.push("deflect".to_string()),
                AvoidOutcome::NoSafeHeading => notes.push("no-safe-heading".to_string()),
            }
            let note = (!notes.is_empty()).then(|| notes.join(" "));

            decisions.push(Decision {
                drone_id: drone.id,
                phase,
                target: target.creature,
                avoidance: avoided.outcome,
                command: Command::move_to(avoided.dest, light, note),
            });
        }

        decisions
    }

    /// Turn-parity light while cruising, staggered per drone so the fleet
    /// does not burn battery in lockstep. Never fires on a drained battery.
    fn cruise_light(&self, world: &WorldState, drone: &Drone) -> bool {
        drone.battery >= LIGHT_BATTERY_COST
            && (world.turn() + drone.id.unsigned_abs()) % self.cfg.light_cadence == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        CreatureSpec, DroneStatus, InitFrame, Quadrant, RadarBlip, TurnFrame, VisibleCreature,
    };

    fn init() -> InitFrame {
        InitFrame {
            creatures: vec![
                CreatureSpec { id: 4, color: 0, kind: 0 },
                CreatureSpec { id: 5, color: 1, kind: 0 },
                CreatureSpec { id: 6, color: 0, kind: 1 },
                CreatureSpec { id: 13, color: -1, kind: -1 },
            ],
        }
    }

    fn frame(my_drones: Vec<DroneStatus>) -> TurnFrame {
        TurnFrame {
            my_score: 0,
            foe_score: 0,
            my_saved: vec![],
            foe_saved: vec![],
            my_drones,
            foe_drones: vec![],
            scans: vec![],
            visibles: vec![],
            blips: [4, 5, 6, 13]
                .iter()
                .map(|&creature_id| RadarBlip {
                    drone_id: 0,
                    creature_id,
                    quadrant: Quadrant::BottomRight,
                })
                .collect(),
        }
    }

    fn status(id: i32, x: i32, y: i32, battery: i32) -> DroneStatus {
        DroneStatus { id, x, y, emergency: false, battery }
    }

    #[test]
    fn phase_ladder_is_one_directional() {
        let mut world = WorldState::new(&init());
        let mut pilot = FleetPilot::new(Tunables::default());

        world.apply_turn(&frame(vec![status(0, 2_000, 500, 30)])).unwrap();
        pilot.decide(&world);
        assert_eq!(pilot.phase(0), Some(Phase::Ingress));

        world.apply_turn(&frame(vec![status(0, 2_000, 3_000, 30)])).unwrap();
        pilot.decide(&world);
        assert_eq!(pilot.phase(0), Some(Phase::DescendDeep));

        world.apply_turn(&frame(vec![status(0, 2_000, 7_800, 30)])).unwrap();
        pilot.decide(&world);
        assert_eq!(pilot.phase(0), Some(Phase::Harvest));

        // back near the surface, HARVEST sticks
        world.apply_turn(&frame(vec![status(0, 2_000, 600, 30)])).unwrap();
        let decisions = pilot.decide(&world);
        assert_eq!(pilot.phase(0), Some(Phase::Harvest));
        assert!(matches!(decisions[0].command, Command::Move { y, .. } if y == SURFACE_SAVE_Y));
    }

    #[test]
    fn low_battery_forces_the_harvest_transition() {
        let mut world = WorldState::new(&init());
        let mut pilot = FleetPilot::new(Tunables::default());

        world.apply_turn(&frame(vec![status(0, 2_000, 3_000, 2)])).unwrap();
        pilot.decide(&world);
        assert_eq!(pilot.phase(0), Some(Phase::Harvest));
    }

    #[test]
    fn emergency_drone_holds_dark_and_restarts_ingress() {
        let mut world = WorldState::new(&init());
        let mut pilot = FleetPilot::new(Tunables::default());

        world.apply_turn(&frame(vec![status(0, 2_000, 7_800, 30)])).unwrap();
        pilot.decide(&world);
        assert_eq!(pilot.phase(0), Some(Phase::Harvest));

        let mut f = frame(vec![status(0, 2_000, 4_000, 30)]);
        f.my_drones[0].emergency = true;
        world.apply_turn(&f).unwrap();
        let decisions = pilot.decide(&world);
        assert_eq!(
            decisions[0].command,
            Command::hold(false, Some("emergency".to_string()))
        );
        assert_eq!(pilot.phase(0), Some(Phase::Ingress));
    }

    #[test]
    fn one_command_per_drone_with_distinct_claims() {
        let mut world = WorldState::new(&init());
        let mut pilot = FleetPilot::new(Tunables::default());

        let mut f = frame(vec![
            status(0, 2_000, 3_000, 30),
            status(2, 8_000, 3_000, 30),
        ]);
        f.visibles = vec![
            VisibleCreature { id: 4, x: 2_200, y: 4_000, vx: 0, vy: 0 },
            VisibleCreature { id: 5, x: 7_800, y: 4_000, vx: 0, vy: 0 },
        ];
        f.blips.retain(|b| b.creature_id != 4 && b.creature_id != 5);
        world.apply_turn(&f).unwrap();

        let decisions = pilot.decide(&world);
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].target, Some(4));
        // drone 2 cannot re-claim drone 0's pick even if it were nearer
        assert_eq!(decisions[1].target, Some(5));
    }

    #[test]
    fn full_team_scan_forces_the_light_on() {
        let mut world = WorldState::new(&init());
        let mut pilot = FleetPilot::new(Tunables::default());

        let mut f = frame(vec![status(0, 2_000, 600, 0)]);
        f.my_saved = vec![4, 5, 6];
        world.apply_turn(&f).unwrap();

        let decisions = pilot.decide(&world);
        assert!(decisions[0].command.light());
        // selection exhausted: heading for the surface harbor
        assert_eq!(decisions[0].target, None);
        assert!(matches!(decisions[0].command, Command::Move { y, .. } if y == SURFACE_SAVE_Y));
    }

    #[test]
    fn avoidance_overrides_the_phase_destination() {
        let mut world = WorldState::new(&init());
        let mut pilot = FleetPilot::new(Tunables::default());

        // hazard sitting right on the descent line
        let mut f = frame(vec![status(0, 2_000, 2_000, 30)]);
        f.visibles = vec![VisibleCreature { id: 13, x: 2_000, y: 2_600, vx: 0, vy: 0 }];
        f.blips.retain(|b| b.creature_id != 13);
        world.apply_turn(&f).unwrap();

        let decisions = pilot.decide(&world);
        assert_eq!(decisions[0].avoidance, AvoidOutcome::Deflected);
        let note = match &decisions[0].command {
            Command::Move { note, .. } => note.clone(),
            Command::Hold { note, .. } => note.clone(),
        };
        assert!(note.unwrap().contains("deflect"));
    }
}
