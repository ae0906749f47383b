//! Game-world constants - exact match to the host referee rules.

// Operating area (origin top-left, +y is down)
pub const MAP_WIDTH: i32 = 10_000;
pub const MAP_HEIGHT: i32 = 10_000;

// Depth bands by creature type: type N occupies [start, end)
pub const BAND_COUNT: usize = 3;
pub const BAND_DEPTHS: [(i32, i32); BAND_COUNT] = [
    (2_500, 5_000),  // type 0
    (5_000, 7_500),  // type 1
    (7_500, 10_000), // type 2
];

// Hazards roam everywhere below the shallows
pub const HAZARD_MIN_Y: i32 = 2_500;

// Surfacing at or above this line commits unsaved scans
pub const SURFACE_SAVE_Y: i32 = 500;

// Movement per turn
pub const DRONE_SPEED: i32 = 600;
pub const HAZARD_SPEED_ANGRY: i32 = 540;

// Scan light
pub const LIGHT_RADIUS_BASE: i32 = 800;
pub const LIGHT_RADIUS_POWERED: i32 = 2_000;
pub const LIGHT_BATTERY_COST: i32 = 5;
pub const BATTERY_RECHARGE: i32 = 1;
pub const BATTERY_CAPACITY: i32 = 30;

// Hazard proximity
pub const DRONE_HIT_RANGE: i32 = 200;
pub const HAZARD_EAT_RANGE: i32 = 300;
pub const EMERGENCY_THRESHOLD: f64 = 500.0; // hit range + eat range
pub const DANGER_RADIUS: f64 = 2_000.0;     // powered light reach

/// Depth band `[start, end)` for a harvestable creature type.
///
/// Returns `None` for hazard types (negative) and unknown types.
pub fn band_for_type(creature_type: i32) -> Option<(i32, i32)> {
    if creature_type < 0 {
        return None;
    }
    BAND_DEPTHS.get(creature_type as usize).copied()
}

/// Whether a creature type marks a hazard rather than a harvestable species.
#[inline]
pub fn is_hazard_type(creature_type: i32) -> bool {
    creature_type < 0
}
