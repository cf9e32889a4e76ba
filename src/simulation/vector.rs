//! Two-dimensional point / displacement value.

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A mutable 2D vector used for positions, velocities, sizes and directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component (grows rightwards).
    pub x: f64,
    /// Vertical component (grows downwards).
    pub y: f64,
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a vector from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Sets both components in place.
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Normalizes in place to unit length.
    ///
    /// A zero-length vector is left unchanged.
    pub fn unit(&mut self) {
        let length = self.length();
        if length == 0.0 {
            return;
        }
        self.x /= length;
        self.y /= length;
    }

    /// Returns the unit-length copy of this vector, or `None` for the zero vector.
    pub fn normalized(&self) -> Option<Vector> {
        let length = self.length();
        (length != 0.0).then(|| Vector::new(self.x / length, self.y / length))
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_of_zero_is_zero() {
        let mut v = Vector::ZERO;
        v.unit();
        assert_eq!(v, Vector::ZERO);
        assert!(v.normalized().is_none());
    }

    #[test]
    fn unit_has_length_one() {
        let mut v = Vector::new(3.0, -4.0);
        v.unit();
        assert!((v.length() - 1.0).abs() < 1e-12);
        assert!((v.x - 0.6).abs() < 1e-12);
        assert!((v.y + 0.8).abs() < 1e-12);
    }

    #[test]
    fn add_in_place() {
        let mut v = Vector::new(1.0, 2.0);
        v += Vector::new(0.5, -2.0);
        assert_eq!(v, Vector::new(1.5, 0.0));
    }
}
