//! Plane geometry for the decision engine.
//!
//! Host coordinates are integers on a 10000 x 10000 grid with +y pointing
//! down; all intermediate math runs in f64 and is only rounded back to grid
//! coordinates at the command boundary.

use std::ops::{Add, Mul, Sub};

use crate::constants::{MAP_HEIGHT, MAP_WIDTH};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    #[inline]
    pub fn len(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn dist(self, other: Point) -> f64 {
        (other - self).len()
    }

    #[inline]
    pub fn dist_sq(self, other: Point) -> f64 {
        let d = other - self;
        d.x * d.x + d.y * d.y
    }

    /// Unit vector in this direction, `None` for the zero vector.
    pub fn unit(self) -> Option<Point> {
        let len = self.len();
        if len < 1e-9 {
            None
        } else {
            Some(Point::new(self.x / len, self.y / len))
        }
    }

    /// Rotate counterclockwise in screen space by `radians`.
    #[inline]
    pub fn rotate(self, radians: f64) -> Point {
        let (sin, cos) = radians.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Point at fraction `t` along the segment from `self` to `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        self + (other - self) * t
    }

    /// Clamp into the operating area.
    pub fn clamp_to_map(self) -> Point {
        Point::new(
            self.x.clamp(0.0, (MAP_WIDTH - 1) as f64),
            self.y.clamp(0.0, (MAP_HEIGHT - 1) as f64),
        )
    }

    /// Nearest grid coordinates, clamped into the operating area.
    pub fn grid_coords(self) -> (i32, i32) {
        let p = self.clamp_to_map();
        (p.x.round() as i32, p.y.round() as i32)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_rotation() {
        let p = Point::new(1.0, 0.0).rotate(std::f64::consts::FRAC_PI_2);
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 200.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Point::new(50.0, 100.0));
    }

    #[test]
    fn unit_of_zero_vector_is_none() {
        assert!(Point::new(0.0, 0.0).unit().is_none());
        let u = Point::new(3.0, 4.0).unit().unwrap();
        assert!((u.len() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn clamping_stays_on_grid() {
        assert_eq!(Point::new(-50.0, 12_500.0).grid_coords(), (0, 9_999));
        assert_eq!(Point::new(4_000.4, 700.6).grid_coords(), (4_000, 701));
    }
}
