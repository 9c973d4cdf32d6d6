use crate::{utils::remap, Scalar};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Range, Sub},
};

/// Space in which a point is interpreted.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointSpace {
    /// Relative to the owning control point. Tangents are stored this way.
    #[default]
    Local,
    /// Absolute position.
    Global,
}

/// 2D point or vector.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Scalar,
    pub y: Scalar,
}

impl Point {
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn length_squared(&self) -> Scalar {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> Scalar {
        self.length_squared().sqrt()
    }

    /// Returns unit-length copy of this vector.
    ///
    /// Zero vector has no direction, so result components are not finite.
    pub fn normalize(&self) -> Self {
        *self / self.length()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns copy with each axis linearly mapped from one range into another.
    pub fn remap(
        &self,
        from_x: Range<Scalar>,
        to_x: Range<Scalar>,
        from_y: Range<Scalar>,
        to_y: Range<Scalar>,
    ) -> Self {
        Self::new(remap(self.x, from_x, to_x), remap(self.y, from_y, to_y))
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<Scalar> for Point {
    type Output = Self;

    fn mul(self, value: Scalar) -> Self {
        Self::new(self.x * value, self.y * value)
    }
}

impl Div<Scalar> for Point {
    type Output = Self;

    fn div(self, value: Scalar) -> Self {
        Self::new(self.x / value, self.y / value)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Renders as `x=<float>;y=<float>` with 6 decimal digits.
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x={:.6};y={:.6}", self.x, self.y)
    }
}

impl From<(Scalar, Scalar)> for Point {
    fn from(value: (Scalar, Scalar)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<[Scalar; 2]> for Point {
    fn from(value: [Scalar; 2]) -> Self {
        let [x, y] = value;
        Self::new(x, y)
    }
}

impl From<Point> for (Scalar, Scalar) {
    fn from(value: Point) -> Self {
        (value.x, value.y)
    }
}
