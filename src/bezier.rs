use crate::{point::Point, Scalar};

/// Interpolate trait gives an interface over values a Bezier segment can be built from.
pub trait Interpolate: Copy {
    /// Linear interpolation, exact at both `factor` ends.
    fn interpolate(&self, other: &Self, factor: Scalar) -> Self;
}

impl Interpolate for Scalar {
    fn interpolate(&self, other: &Self, factor: Scalar) -> Self {
        self * (1.0 - factor) + other * factor
    }
}

impl Interpolate for Point {
    fn interpolate(&self, other: &Self, factor: Scalar) -> Self {
        *self * (1.0 - factor) + *other * factor
    }
}

/// Cubic Bezier segment.
///
/// It's made out of points:
/// - P0 - starting point (`from`).
/// - P1 - starting tangent point (`from param`).
/// - P2 - ending tangent point (`to param`).
/// - P3 - ending point (`to`).
///
/// It's solved by interpolating each layer of it's points instead of using Bezier equation:
/// - A := lerp(from, from param, factor)
/// - B := lerp(from param, to param, factor)
/// - C := lerp(to param, to, factor)
/// - D := lerp(A, B, factor)
/// - E := lerp(B, C, factor)
/// - Result: lerp(D, E, factor)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bezier<T>
where
    T: Interpolate,
{
    pub from: T,
    pub from_param: T,
    pub to_param: T,
    pub to: T,
}

impl<T> Bezier<T>
where
    T: Interpolate,
{
    pub fn new(from: T, from_param: T, to_param: T, to: T) -> Self {
        Self {
            from,
            from_param,
            to_param,
            to,
        }
    }

    /// Samples segment at given factor in <0; 1> range.
    #[allow(clippy::many_single_char_names)]
    pub fn sample(&self, mut factor: Scalar) -> T {
        factor = factor.clamp(0.0, 1.0);
        let a = self.from.interpolate(&self.from_param, factor);
        let b = self.from_param.interpolate(&self.to_param, factor);
        let c = self.to_param.interpolate(&self.to, factor);
        let d = a.interpolate(&b, factor);
        let e = b.interpolate(&c, factor);
        d.interpolate(&e, factor)
    }
}
