use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

/// Screen-space vector: x grows right, y grows down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector for a heading in degrees. 0 points right, 270 points up.
    pub fn from_degrees(angle: f64) -> Self {
        let rad = angle.to_radians();
        Self::new(rad.cos(), rad.sin())
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    /// Same direction, new magnitude. The zero vector has no direction and
    /// is returned unchanged.
    pub fn scale_to_length(self, length: f64) -> Self {
        let current = self.length();
        if current == 0.0 {
            return self;
        }
        self * (length / current)
    }

    /// Rotate by `angle` degrees (clockwise on screen, since y is down).
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_to_length_keeps_direction() {
        let v = Vec2::new(3.0, -4.0).scale_to_length(10.0);
        assert!((v.length() - 10.0).abs() < 1e-9);
        assert!((v.x - 6.0).abs() < 1e-9);
        assert!((v.y + 8.0).abs() < 1e-9);
    }

    #[test]
    fn zero_vector_is_not_scaled() {
        assert_eq!(Vec2::ZERO.scale_to_length(5.0), Vec2::ZERO);
    }

    #[test]
    fn heading_270_points_up() {
        let up = Vec2::from_degrees(270.0);
        assert!(up.x.abs() < 1e-9);
        assert!((up.y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_matches_heading() {
        let v = Vec2::new(1.0, 0.0).rotated(90.0);
        let h = Vec2::from_degrees(90.0);
        assert!(v.distance(h) < 1e-9);
    }
}
