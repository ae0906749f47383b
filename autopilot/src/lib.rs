//! CLI shell around `seabed-core`: the live stdin/stdout match loop plus the
//! offline tooling (transcript replay, batch benchmarks, inspection).

pub mod benchmark;
pub mod live;
pub mod runner;
pub mod util;
