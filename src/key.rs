use crate::{
    point::{Point, PointSpace},
    Scalar,
};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Constraint under which key tangents behave in relation to each other.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TangentMode {
    /// Peer tangent mirrors both direction and length.
    #[default]
    Mirrored = 0,
    /// Peer tangent points the opposite way but keeps its own length.
    Aligned = 1,
    /// Tangents are independent.
    Broken = 2,
}

impl TangentMode {
    /// Computes new peer tangent after `edited` tangent got changed.
    ///
    /// `Aligned` mode requires non-zero `edited` tangent, otherwise result is not finite.
    pub fn constrain(self, edited: Point, peer: Point) -> Point {
        match self {
            Self::Mirrored => -edited,
            Self::Aligned => -edited.normalize() * peer.length(),
            Self::Broken => peer,
        }
    }
}

impl TryFrom<i64> for TangentMode {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Mirrored),
            1 => Ok(Self::Aligned),
            2 => Ok(Self::Broken),
            _ => Err(value),
        }
    }
}

impl From<TangentMode> for i64 {
    fn from(value: TangentMode) -> Self {
        value as i64
    }
}

/// One of three logical points owned by a key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointSlot {
    Control,
    RightTangent,
    LeftTangent,
}

impl PointSlot {
    /// Slot addressed by point index (`point_id % 3`).
    pub fn from_point_id(point_id: usize) -> Self {
        match point_id % 3 {
            0 => Self::Control,
            1 => Self::RightTangent,
            _ => Self::LeftTangent,
        }
    }
}

/// Spline knot: control point with two tangents stored relative to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub control: Point,
    pub left_tangent: Point,
    pub right_tangent: Point,
    #[serde(default)]
    pub tangent_mode: TangentMode,
    /// Arc length position of this key, filled by curve length computation.
    #[serde(skip)]
    pub distance: Scalar,
}

impl Default for Key {
    fn default() -> Self {
        Self::new(Point::zero())
    }
}

impl Key {
    /// Builds key with default `(-1, 0)` and `(1, 0)` mirrored tangents.
    pub fn new(control: Point) -> Self {
        Self::with_tangents(
            control,
            Point::new(-1.0, 0.0),
            Point::new(1.0, 0.0),
            TangentMode::Mirrored,
        )
    }

    /// Builds key from local space tangents, stored as given without applying the mode.
    pub fn with_tangents(
        control: Point,
        left_tangent: Point,
        right_tangent: Point,
        tangent_mode: TangentMode,
    ) -> Self {
        Self {
            control,
            left_tangent,
            right_tangent,
            tangent_mode,
            distance: 0.0,
        }
    }

    /// Sets left tangent (local space) and applies tangent mode to the right one.
    pub fn set_left_tangent(&mut self, tangent: Point) {
        self.left_tangent = tangent;
        self.right_tangent = self.tangent_mode.constrain(tangent, self.right_tangent);
    }

    /// Sets right tangent (local space) and applies tangent mode to the left one.
    pub fn set_right_tangent(&mut self, tangent: Point) {
        self.right_tangent = tangent;
        self.left_tangent = self.tangent_mode.constrain(tangent, self.left_tangent);
    }

    /// Changes tangent mode, optionally re-applying the constraint from the left tangent.
    pub fn set_tangent_mode(&mut self, mode: TangentMode, apply_constraint: bool) {
        self.tangent_mode = mode;
        if apply_constraint {
            self.set_left_tangent(self.left_tangent);
        }
    }

    /// Gets point at given slot. Control point is always global.
    pub fn point(&self, slot: PointSlot, space: PointSpace) -> Point {
        let tangent = match slot {
            PointSlot::Control => return self.control,
            PointSlot::RightTangent => self.right_tangent,
            PointSlot::LeftTangent => self.left_tangent,
        };
        match space {
            PointSpace::Local => tangent,
            PointSpace::Global => self.control + tangent,
        }
    }

    /// Sets point at given slot as is, without tangent constraint.
    pub fn set_point(&mut self, slot: PointSlot, point: Point) {
        match slot {
            PointSlot::Control => self.control = point,
            PointSlot::RightTangent => self.right_tangent = point,
            PointSlot::LeftTangent => self.left_tangent = point,
        }
    }

    /// Sets point at given slot, applying tangent constraint to the peer tangent.
    ///
    /// Global space tangents get converted into local space first. Control slot takes
    /// `point` unchanged.
    pub fn set_tangent(&mut self, slot: PointSlot, point: Point, space: PointSpace) {
        let tangent = match space {
            PointSpace::Local => point,
            PointSpace::Global => point - self.control,
        };
        match slot {
            PointSlot::Control => self.control = point,
            PointSlot::RightTangent => self.set_right_tangent(tangent),
            PointSlot::LeftTangent => self.set_left_tangent(tangent),
        }
    }
}

impl From<Point> for Key {
    fn from(control: Point) -> Self {
        Self::new(control)
    }
}

impl From<(Point, Point, Point)> for Key {
    fn from(value: (Point, Point, Point)) -> Self {
        Self::with_tangents(value.0, value.1, value.2, TangentMode::Mirrored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_key_defaults() {
        let key = Key::new(Point::new(2.0, 3.0));
        assert_eq!(key.control, Point::new(2.0, 3.0));
        assert_eq!(key.left_tangent, Point::new(-1.0, 0.0));
        assert_eq!(key.right_tangent, Point::new(1.0, 0.0));
        assert_eq!(key.tangent_mode, TangentMode::Mirrored);
    }

    #[test]
    fn test_mirrored_tangents() {
        let mut key = Key::new(Point::zero());
        for tangent in [
            Point::new(2.0, 3.0),
            Point::new(-0.5, 10.0),
            Point::new(0.0, -7.0),
        ] {
            key.set_right_tangent(tangent);
            assert_eq!(key.left_tangent, -key.right_tangent);
            key.set_left_tangent(tangent);
            assert_eq!(key.left_tangent, -key.right_tangent);
        }
    }

    #[test]
    fn test_aligned_tangents() {
        let mut key = Key::with_tangents(
            Point::zero(),
            Point::new(-3.0, 0.0),
            Point::new(1.0, 0.0),
            TangentMode::Aligned,
        );
        key.set_right_tangent(Point::new(3.0, 4.0));
        assert_eq!(key.right_tangent, Point::new(3.0, 4.0));
        assert_relative_eq!(key.left_tangent.x, -1.8, epsilon = 1.0e-5);
        assert_relative_eq!(key.left_tangent.y, -2.4, epsilon = 1.0e-5);
        assert_relative_eq!(key.left_tangent.length(), 3.0, epsilon = 1.0e-5);

        key.set_left_tangent(Point::new(0.0, 10.0));
        assert_relative_eq!(key.right_tangent.x, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(key.right_tangent.y, -5.0, epsilon = 1.0e-5);
    }

    #[test]
    fn test_broken_tangents() {
        let mut key = Key::with_tangents(
            Point::zero(),
            Point::new(-1.0, 0.0),
            Point::new(1.0, 0.0),
            TangentMode::Broken,
        );
        key.set_right_tangent(Point::new(1.0, 5.0));
        assert_eq!(key.left_tangent, Point::new(-1.0, 0.0));
        key.set_left_tangent(Point::new(-0.5, -0.5));
        assert_eq!(key.right_tangent, Point::new(1.0, 5.0));
    }

    #[test]
    fn test_tangent_mode_change() {
        let mut key = Key::with_tangents(
            Point::zero(),
            Point::new(-2.0, 0.0),
            Point::new(1.0, 1.0),
            TangentMode::Broken,
        );
        key.set_tangent_mode(TangentMode::Aligned, false);
        assert_eq!(key.right_tangent, Point::new(1.0, 1.0));

        key.set_tangent_mode(TangentMode::Mirrored, true);
        assert_eq!(key.left_tangent, Point::new(-2.0, 0.0));
        assert_eq!(key.right_tangent, Point::new(2.0, 0.0));
    }

    #[test]
    fn test_key_slots() {
        let mut key = Key::new(Point::new(1.0, 1.0));
        assert_eq!(key.point(PointSlot::Control, PointSpace::Local), Point::new(1.0, 1.0));
        assert_eq!(
            key.point(PointSlot::RightTangent, PointSpace::Global),
            Point::new(2.0, 1.0)
        );
        assert_eq!(
            key.point(PointSlot::LeftTangent, PointSpace::Local),
            Point::new(-1.0, 0.0)
        );

        key.set_point(PointSlot::RightTangent, Point::new(0.0, 2.0));
        assert_eq!(key.left_tangent, Point::new(-1.0, 0.0));

        key.set_tangent(PointSlot::RightTangent, Point::new(1.0, 3.0), PointSpace::Global);
        assert_eq!(key.right_tangent, Point::new(0.0, 2.0));
        assert_eq!(key.left_tangent, Point::new(0.0, -2.0));
    }

    #[test]
    fn test_tangent_mode_codes() {
        for mode in [TangentMode::Mirrored, TangentMode::Aligned, TangentMode::Broken] {
            assert_eq!(TangentMode::try_from(i64::from(mode)), Ok(mode));
        }
        assert_eq!(TangentMode::try_from(3_i64), Err(3));
        assert_eq!(TangentMode::try_from(-1_i64), Err(-1));
        assert_eq!(PointSlot::from_point_id(6), PointSlot::Control);
        assert_eq!(PointSlot::from_point_id(4), PointSlot::RightTangent);
        assert_eq!(PointSlot::from_point_id(2), PointSlot::LeftTangent);
    }
}
