//! Keyed 2D cubic Bezier splines.
//!
//! [`Curve`](curve::Curve) holds ordered [`Key`](key::Key)s and can be evaluated by percent,
//! by distance along its length or by time (X axis). [`CurveSerializer`](serializer::CurveSerializer)
//! reads and writes curves in a simple versioned text format.

pub mod bezier;
pub mod curve;
pub mod key;
pub mod point;
pub mod serializer;
pub mod utils;

pub mod prelude {
    pub use crate::{Scalar, bezier::*, curve::*, key::*, point::*, serializer::*, utils::*};
}

/// Scalar number type.
///
/// by default it is 32-bit float but you can change it to 64-bit float with `scalar64` feature.
#[cfg(not(feature = "scalar64"))]
pub type Scalar = f32;
#[cfg(feature = "scalar64")]
pub type Scalar = f64;
