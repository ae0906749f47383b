//! Full-cycle replay of an embedded match transcript: parse, apply, decide,
//! and check the engine-wide invariants every turn.

use seabed_core::config::Tunables;
use seabed_core::pilot::FleetPilot;
use seabed_core::protocol::{parse_init_frame, parse_turn_frame, Command, LineReader};
use seabed_core::world::WorldState;

// Two drones a side, six harvestables across three bands, one hazard. The
// hazard surfaces into view on turn 2 right on drone 0's descent line; the
// shallow pair is scanned by turn 3 and saved on turn 4.
const TRANSCRIPT: &str = "\
# roster
7
4 0 0
5 1 0
6 0 1
7 1 1
8 0 2
9 1 2
13 -1 -1
# turn 1
0
0
0
0
2
0 2000 500 0 30
2 8000 500 0 30
2
1 4000 500 0 30
3 6000 500 0 30
0
0
7
0 4 BR
0 5 BR
0 6 BR
0 7 BR
0 8 BR
0 9 BR
0 13 BR
# turn 2
0
0
0
0
2
0 2000 1100 0 30
2 8000 1100 0 29
2
1 4000 1100 0 30
3 6000 1100 0 30
0
1
13 2000 3000 0 -270
6
0 4 BR
0 5 BL
0 6 BR
0 7 BL
0 8 BR
0 9 BR
# turn 3
0
0
0
0
2
0 2300 1700 0 25
2 7700 1700 0 29
2
1 4000 1700 0 30
3 6000 1700 0 30
2
0 4
2 5
1
13 2000 2730 0 -270
6
0 4 BR
0 5 BL
0 6 BR
0 7 BL
0 8 BR
0 9 BR
# turn 4
2
0
2
4
5
0
2
0 2300 900 0 26
2 7700 900 0 30
2
1 4000 2300 0 30
3 6000 2300 0 30
0
0
6
0 4 BR
0 5 BL
0 6 BR
0 7 BL
0 8 BR
0 13 BR
";

#[test]
fn transcript_replay_holds_the_turn_invariants() {
    let mut reader = LineReader::new(TRANSCRIPT.lines().map(str::to_string));
    let init = parse_init_frame(&mut reader).expect("init frame");
    let mut world = WorldState::new(&init);
    let mut pilot = FleetPilot::new(Tunables::default());

    let mut turns = 0;
    while let Some(frame) = parse_turn_frame(&mut reader).expect("turn frame") {
        world.apply_turn(&frame).expect("consistent frame");
        turns += 1;

        let decisions = pilot.decide(&world);

        // one command per own drone, in identity order
        assert_eq!(decisions.len(), world.my_drones().count());
        let ids: Vec<_> = decisions.iter().map(|d| d.drone_id).collect();
        assert_eq!(ids, vec![0, 2]);

        for decision in &decisions {
            if let Command::Move { x, y, .. } = decision.command {
                assert!((0..10_000).contains(&x), "x out of bounds: {x}");
                assert!((0..10_000).contains(&y), "y out of bounds: {y}");
            }
            // rendered command is a valid host line
            let line = decision.command.to_string();
            assert!(line.starts_with("MOVE ") || line.starts_with("WAIT "));
        }

        // saved implies scanned, cumulatively
        for creature in world.creatures() {
            if creature.saved_by_me {
                assert!(creature.scanned_by_me, "creature {}", creature.id);
            }
        }
    }

    assert_eq!(turns, 4);
    assert_eq!(world.turn(), 4);
    assert_eq!(world.scores(), (2, 0));

    // the save on turn 4 stuck
    assert!(world.creature(4).unwrap().saved_by_me);
    assert!(world.creature(5).unwrap().saved_by_me);
    // creature 9 dropped off every sensor on turn 4: inferred dead
    assert!(!world.creature(9).unwrap().alive);
    assert!(world.creature(8).unwrap().alive);
}

#[test]
fn replaying_the_transcript_twice_is_deterministic() {
    let run = || {
        let mut reader = LineReader::new(TRANSCRIPT.lines().map(str::to_string));
        let init = parse_init_frame(&mut reader).unwrap();
        let mut world = WorldState::new(&init);
        let mut pilot = FleetPilot::new(Tunables::default());
        let mut lines = Vec::new();
        while let Some(frame) = parse_turn_frame(&mut reader).unwrap() {
            world.apply_turn(&frame).unwrap();
            for decision in pilot.decide(&world) {
                lines.push(decision.command.to_string());
            }
        }
        lines
    };
    assert_eq!(run(), run());
}
