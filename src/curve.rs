use crate::{
    bezier::Bezier,
    key::{Key, PointSlot, TangentMode},
    point::{Point, PointSpace},
    utils::{factor_iter, range_iter},
    Scalar,
};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Default number of samples used to approximate curve length.
pub const LENGTH_STEPS: usize = 100;
/// Default distance increment used by nearest point search.
pub const NEAREST_STEP: Scalar = 0.01;

/// Errors happening within index-addressed curve operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CurveError {
    #[error("key index {index} is out of range for {count} keys")]
    InvalidKeyIndex { index: usize, count: usize },
    #[error("point index {index} is out of range for {count} points")]
    InvalidPointIndex { index: usize, count: usize },
}

/// Coordinates extrems of all curve points (controls and global tangents).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveExtrems {
    pub min_x: Scalar,
    pub max_x: Scalar,
    pub min_y: Scalar,
    pub max_y: Scalar,
}

impl Default for CurveExtrems {
    fn default() -> Self {
        Self {
            min_x: Scalar::INFINITY,
            max_x: Scalar::NEG_INFINITY,
            min_y: Scalar::INFINITY,
            max_y: Scalar::NEG_INFINITY,
        }
    }
}

impl CurveExtrems {
    pub fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn width(&self) -> Scalar {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> Scalar {
        self.max_y - self.min_y
    }
}

/// Last computed curve length with its staleness flag.
///
/// Stale value stays readable, only explicit recomputation refreshes it.
#[derive(Debug, Copy, Clone)]
struct CachedLength {
    value: Scalar,
    dirty: bool,
}

impl Default for CachedLength {
    fn default() -> Self {
        Self {
            value: 0.0,
            dirty: true,
        }
    }
}

impl CachedLength {
    fn fresh(&self) -> Option<Scalar> {
        if self.dirty {
            None
        } else {
            Some(self.value)
        }
    }

    fn store(&mut self, value: Scalar) {
        self.value = value;
        self.dirty = false;
    }

    fn invalidate(&mut self) {
        self.dirty = true;
    }
}

/// Serializable curve definition defined by its keys.
pub type CurveDef = Vec<Key>;

/// Piecewise cubic Bezier 2D spline made out of keys.
///
/// Each pair of neighbor keys builds one segment:
/// - P0 - first key control point.
/// - P1 - first key control point offset by its right tangent.
/// - P2 - second key control point offset by its left tangent.
/// - P3 - second key control point.
///
/// Keys are addressed by key index. Point index addresses flattened sequence of all
/// points in this order: control 0, right tangent 0, left tangent 1, control 1,
/// right tangent 1, left tangent 2, control 2 and so on.
///
/// Curve can be evaluated only when it holds at least two keys, see [`Curve::is_valid`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "CurveDef")]
#[serde(into = "CurveDef")]
pub struct Curve {
    keys: Vec<Key>,
    length: CachedLength,
}

impl Curve {
    /// Builds empty curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds curve out of keys. Length stays dirty until computed.
    pub fn from_keys(keys: Vec<Key>) -> Self {
        Self {
            keys,
            length: Default::default(),
        }
    }

    /// Replaces all keys.
    pub fn set_keys(&mut self, keys: Vec<Key>) {
        self.keys = keys;
        self.length.invalidate();
    }

    /// Gets slice of keys.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn key(&self, key_id: usize) -> Option<&Key> {
        self.keys.get(key_id)
    }

    /// Gets mutable key. Since key can be changed through it, length gets marked dirty.
    pub fn key_mut(&mut self, key_id: usize) -> Option<&mut Key> {
        let key = self.keys.get_mut(key_id)?;
        self.length.invalidate();
        Some(key)
    }

    pub fn keys_count(&self) -> usize {
        self.keys.len()
    }

    /// Number of segments formed by keys.
    pub fn curves_count(&self) -> usize {
        self.keys.len().saturating_sub(1)
    }

    /// Number of addressable points.
    pub fn points_count(&self) -> usize {
        (self.keys.len() * 3).saturating_sub(2)
    }

    /// Tells if curve holds enough keys to be evaluated.
    pub fn is_valid(&self) -> bool {
        self.keys.len() > 1
    }

    pub fn is_valid_key_id(&self, key_id: usize) -> bool {
        key_id < self.keys_count()
    }

    pub fn is_valid_point_id(&self, point_id: usize) -> bool {
        point_id < self.points_count()
    }

    pub fn is_control_point_id(point_id: usize) -> bool {
        PointSlot::from_point_id(point_id) == PointSlot::Control
    }

    /// Converts any point index to index of the key owning it.
    pub fn point_to_key_id(point_id: usize) -> usize {
        (point_id + 1) / 3
    }

    /// Converts key index to index of its control point.
    pub fn key_to_point_id(key_id: usize) -> usize {
        key_id * 3
    }

    /// Appends key at the end.
    pub fn add_key(&mut self, key: Key) {
        self.keys.push(key);
        self.length.invalidate();
    }

    /// Inserts key before given index. Index equal to keys count appends.
    pub fn insert_key(&mut self, key_id: usize, key: Key) -> Result<(), CurveError> {
        if key_id > self.keys.len() {
            return Err(self.key_error(key_id));
        }
        self.keys.insert(key_id, key);
        self.length.invalidate();
        Ok(())
    }

    /// Removes and returns key at given index.
    pub fn remove_key(&mut self, key_id: usize) -> Result<Key, CurveError> {
        self.check_key_id(key_id)?;
        let key = self.keys.remove(key_id);
        self.length.invalidate();
        Ok(key)
    }

    /// Sets point at given point index as is, without applying tangent mode.
    pub fn set_point(&mut self, point_id: usize, point: Point) -> Result<(), CurveError> {
        let key_id = self.check_point_id(point_id)?;
        self.keys[key_id].set_point(PointSlot::from_point_id(point_id), point);
        self.length.invalidate();
        Ok(())
    }

    /// Sets tangent point at given point index and applies tangent mode to its peer.
    ///
    /// Global space point gets converted into local space of its key first.
    pub fn set_tangent_point(
        &mut self,
        point_id: usize,
        point: Point,
        space: PointSpace,
    ) -> Result<(), CurveError> {
        let key_id = self.check_point_id(point_id)?;
        self.keys[key_id].set_tangent(PointSlot::from_point_id(point_id), point, space);
        self.length.invalidate();
        Ok(())
    }

    /// Gets point at given point index. Control points are always global.
    pub fn point(&self, point_id: usize, space: PointSpace) -> Result<Point, CurveError> {
        let key_id = self.check_point_id(point_id)?;
        Ok(self.keys[key_id].point(PointSlot::from_point_id(point_id), space))
    }

    /// Changes tangent mode of given key, optionally applying the new constraint.
    pub fn set_tangent_mode(
        &mut self,
        key_id: usize,
        mode: TangentMode,
        apply_constraint: bool,
    ) -> Result<(), CurveError> {
        self.check_key_id(key_id)?;
        self.keys[key_id].set_tangent_mode(mode, apply_constraint);
        self.length.invalidate();
        Ok(())
    }

    pub fn tangent_mode(&self, key_id: usize) -> Result<TangentMode, CurveError> {
        self.check_key_id(key_id)?;
        Ok(self.keys[key_id].tangent_mode)
    }

    /// Gets time (X axis) range between first and last key.
    pub fn time_frame(&self) -> Option<Range<Scalar>> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        Some(first.control.x..last.control.x)
    }

    /// Evaluates curve point at given percent in <0; 1> range.
    ///
    /// # Panics
    /// When curve is not valid.
    pub fn evaluate_by_percent(&self, t: Scalar) -> Point {
        self.assert_valid();
        let (index, factor) = self.find_segment_by_percent(t);
        self.segment(index).sample(factor)
    }

    /// Evaluates curve point at given distance along the curve.
    ///
    /// Uses last computed length, even if it is dirty.
    ///
    /// # Panics
    /// When curve is not valid.
    pub fn evaluate_by_distance(&self, distance: Scalar) -> Point {
        self.evaluate_by_percent(distance / self.length.value)
    }

    /// Evaluates Y axis value at given time on X axis.
    ///
    /// Keys are expected to be ordered by increasing X. Tangents X axis is not taken
    /// into account, segment is solved on Y axis only.
    ///
    /// # Panics
    /// When curve is not valid.
    pub fn evaluate_by_time(&self, time: Scalar) -> Scalar {
        self.assert_valid();
        let first = self.keys[0].control;
        let last = self.keys[self.keys.len() - 1].control;
        if time <= first.x {
            return first.y;
        }
        if time >= last.x {
            return last.y;
        }
        let index = self.find_segment_by_time(time);
        let from = &self.keys[index];
        let to = &self.keys[index + 1];
        let factor = (time - from.control.x) / (to.control.x - from.control.x);
        Bezier::new(
            from.control.y,
            from.control.y + from.right_tangent.y,
            to.control.y + to.left_tangent.y,
            to.control.y,
        )
        .sample(factor)
    }

    /// Finds segment index and its local factor for given percent.
    pub fn find_segment_by_percent(&self, t: Scalar) -> (usize, Scalar) {
        let count = self.curves_count();
        if t >= 1.0 {
            return (count.saturating_sub(1), 1.0);
        }
        let key = t.max(0.0) * count as Scalar;
        let index = (key.floor() as usize).min(count.saturating_sub(1));
        (index, key - index as Scalar)
    }

    /// Finds segment index containing given time, using binary search over keys X axis.
    pub fn find_segment_by_time(&self, time: Scalar) -> usize {
        let count = self.curves_count();
        if count == 0 {
            return 0;
        }
        self.keys[1..count].partition_point(|key| time >= key.control.x)
    }

    /// Finds segment ending at first key which distance is at least given distance.
    ///
    /// Relies on keys distances filled by [`Curve::compute_length`].
    pub fn find_segment_by_distance(&self, distance: Scalar) -> Option<usize> {
        self.keys
            .iter()
            .position(|key| distance <= key.distance)
            .map(|index| index.saturating_sub(1).min(self.curves_count().saturating_sub(1)))
    }

    /// Approximates curve length by summing distances between samples.
    ///
    /// Total of `steps` samples gets spread evenly over segments. Every key gets its
    /// distance along the curve assigned.
    pub fn compute_length(&mut self, steps: usize) -> Scalar {
        let mut length = 0.0;
        if let Some(first) = self.keys.first_mut() {
            first.distance = 0.0;
        }
        if self.is_valid() {
            let count = self.curves_count();
            let segment_steps = steps.div_ceil(count).max(1);
            for index in 0..count {
                let segment = self.segment(index);
                let mut last = segment.from;
                for factor in factor_iter(segment_steps).skip(1) {
                    let point = segment.sample(factor);
                    length += (point - last).length();
                    last = point;
                }
                self.keys[index + 1].distance = length;
            }
        }
        log::debug!(
            "Computed curve length: {} ({} keys, {} steps)",
            length,
            self.keys.len(),
            steps
        );
        self.length.store(length);
        length
    }

    /// Gets curve length, recomputing it first if dirty.
    pub fn refresh_length(&mut self) -> Scalar {
        match self.length.fresh() {
            Some(length) => length,
            None => self.compute_length(LENGTH_STEPS),
        }
    }

    /// Gets last computed curve length.
    ///
    /// It is NOT recomputed when dirty; call [`Curve::refresh_length`] or
    /// [`Curve::compute_length`] after changes if freshness matters.
    pub fn length(&self) -> Scalar {
        self.length.value
    }

    pub fn is_length_dirty(&self) -> bool {
        self.length.dirty
    }

    /// Marks length as requiring recomputation.
    pub fn mark_length_dirty(&mut self) {
        self.length.invalidate();
    }

    /// Gets coordinates extrems of all points in global space.
    pub fn extrems(&self) -> CurveExtrems {
        let mut result = CurveExtrems::default();
        for point_id in 0..self.points_count() {
            let key = &self.keys[Self::point_to_key_id(point_id)];
            result.include(key.point(PointSlot::from_point_id(point_id), PointSpace::Global));
        }
        result
    }

    /// Finds distance along the curve of point closest to `target`.
    ///
    /// Marches along last computed length by `step` increments.
    ///
    /// # Panics
    /// When curve is not valid.
    pub fn nearest_distance_to(&self, target: Point, step: Scalar) -> Scalar {
        self.assert_valid();
        let length = self.length.value;
        if step.is_nan() || step <= 0.0 || !length.is_finite() || length <= 0.0 {
            log::trace!("Skipping nearest point search: length {length}, step {step}");
            return 0.0;
        }
        let steps = (length / step).ceil() as usize;
        let mut nearest_distance = 0.0;
        let mut lowest = Scalar::INFINITY;
        for distance in range_iter(steps, 0.0, length) {
            let squared = (target - self.evaluate_by_distance(distance)).length_squared();
            if squared < lowest {
                lowest = squared;
                nearest_distance = distance;
            }
        }
        nearest_distance
    }

    /// Finds point on the curve closest to `target`.
    ///
    /// # Panics
    /// When curve is not valid.
    pub fn nearest_point_to(&self, target: Point, step: Scalar) -> Point {
        self.evaluate_by_distance(self.nearest_distance_to(target, step))
    }

    fn segment(&self, index: usize) -> Bezier<Point> {
        let from = &self.keys[index];
        let to = &self.keys[index + 1];
        Bezier::new(
            from.control,
            from.control + from.right_tangent,
            to.control + to.left_tangent,
            to.control,
        )
    }

    fn assert_valid(&self) {
        assert!(
            self.is_valid(),
            "Curve needs at least 2 keys to be evaluated, got {}",
            self.keys.len()
        );
    }

    fn key_error(&self, key_id: usize) -> CurveError {
        CurveError::InvalidKeyIndex {
            index: key_id,
            count: self.keys.len(),
        }
    }

    fn check_key_id(&self, key_id: usize) -> Result<(), CurveError> {
        if self.is_valid_key_id(key_id) {
            Ok(())
        } else {
            Err(self.key_error(key_id))
        }
    }

    fn check_point_id(&self, point_id: usize) -> Result<usize, CurveError> {
        if self.is_valid_point_id(point_id) {
            Ok(Self::point_to_key_id(point_id))
        } else {
            Err(CurveError::InvalidPointIndex {
                index: point_id,
                count: self.points_count(),
            })
        }
    }
}

impl From<CurveDef> for Curve {
    fn from(keys: CurveDef) -> Self {
        Self::from_keys(keys)
    }
}

impl From<Curve> for CurveDef {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}

impl FromIterator<Key> for Curve {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self::from_keys(iter.into_iter().collect())
    }
}
