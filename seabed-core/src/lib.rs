//! Per-turn decision engine for a two-team underwater survey game.
//!
//! The engine is pure and synchronous: the host delivers one turn frame,
//! [`world::WorldState::apply_turn`] rebuilds the frozen world picture, and
//! [`pilot::FleetPilot::decide`] emits exactly one command per own drone.
//! All I/O lives in the CLI crate; everything here is directly testable.

pub mod config;
pub mod constants;
pub mod error;
pub mod geom;
pub mod hazard;
pub mod pilot;
pub mod protocol;
pub mod select;
pub mod world;

pub use config::Tunables;
pub use error::{EngineError, ParseError};
pub use pilot::{Decision, FleetPilot, Phase};
pub use protocol::{parse_init_frame, parse_turn_frame, Command, LineReader};
pub use world::WorldState;
