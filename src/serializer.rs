use crate::{
    curve::Curve,
    key::{Key, TangentMode},
    point::Point,
    Scalar,
};
use regex::{Captures, Regex};
use std::{convert::TryFrom, fmt::Write};
use thiserror::Error;

/// Current text format version.
///
/// Older versions are accepted when reading, newer ones are rejected.
pub const FORMAT_VERSION: u32 = 1;
/// Conventional file extension for serialized curves.
pub const FORMAT_EXTENSION: &str = "cvx";

/// Errors happening when reading serialized curves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializerError {
    #[error("expected format version at the first line")]
    MissingVersion,
    #[error("malformed format version: {0}")]
    MalformedVersion(String),
    #[error("unsupported format version {0}, supported up to {max}", max = FORMAT_VERSION)]
    UnsupportedVersion(u32),
    #[error("unknown tangent mode {mode} at line {line}")]
    UnknownTangentMode { line: usize, mode: i64 },
}

/// Converts curves to and from line oriented text format:
///
/// ```text
/// version:1
/// 0:x=0.000000;y=0.000000,x=-1.000000;y=0.000000,x=1.000000;y=0.000000,0
/// 1:x=1.000000;y=1.000000,x=-1.000000;y=0.000000,x=1.000000;y=0.000000,0
/// ```
///
/// Each key line holds key index, control point, left tangent, right tangent and
/// tangent mode code.
#[derive(Debug, Clone)]
pub struct CurveSerializer {
    version: Regex,
    key_id: Regex,
    point: Regex,
    number: Regex,
}

impl Default for CurveSerializer {
    fn default() -> Self {
        Self {
            version: Regex::new(r"^version:(\d+)$").expect("Could not compile version pattern"),
            key_id: Regex::new(r"(\d+):").expect("Could not compile key index pattern"),
            point: Regex::new(r"x=(-?\d+\.\d+);y=(-?\d+\.\d+)")
                .expect("Could not compile point pattern"),
            number: Regex::new(r"(-?\d+)").expect("Could not compile number pattern"),
        }
    }
}

impl CurveSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes curve keys into text. Curve validity is not checked.
    pub fn serialize(&self, curve: &Curve) -> String {
        let mut result = String::new();
        // writing into `String` never fails
        let _ = writeln!(result, "version:{}", FORMAT_VERSION);
        for (index, key) in curve.keys().iter().enumerate() {
            let _ = writeln!(
                result,
                "{}:{},{},{},{}",
                index,
                key.control,
                key.left_tangent,
                key.right_tangent,
                i64::from(key.tangent_mode)
            );
        }
        result
    }

    /// Reads curve out of text.
    ///
    /// First line must hold format version. Key lines missing any field are skipped,
    /// lines without key index are ignored. Resulting curve has its length dirty.
    pub fn unserialize(&self, data: &str) -> Result<Curve, SerializerError> {
        let mut lines = data.lines().map(|line| line.trim_end_matches('\r'));
        let version = lines.next().ok_or(SerializerError::MissingVersion)?;
        let version = self.read_version(version)?;
        log::debug!("Reading curve format version {}", version);

        let mut keys = Vec::new();
        for (index, line) in lines.enumerate() {
            // version takes first line
            let line_number = index + 2;
            let Some(rest) = self.key_id.captures(line).map(|captures| suffix(line, &captures))
            else {
                log::trace!("Ignoring line {}: {:?}", line_number, line);
                continue;
            };
            match self.read_key(rest) {
                Some((key, mode)) => {
                    let mode = TangentMode::try_from(mode).map_err(|mode| {
                        SerializerError::UnknownTangentMode {
                            line: line_number,
                            mode,
                        }
                    })?;
                    keys.push(Key { tangent_mode: mode, ..key });
                }
                None => log::warn!("Skipping malformed key at line {}: {:?}", line_number, line),
            }
        }
        Ok(Curve::from_keys(keys))
    }

    fn read_version(&self, line: &str) -> Result<u32, SerializerError> {
        let captures = self
            .version
            .captures(line)
            .ok_or(SerializerError::MissingVersion)?;
        let version = captures[1]
            .parse::<u32>()
            .map_err(|_| SerializerError::MalformedVersion(captures[1].to_owned()))?;
        if version > FORMAT_VERSION {
            return Err(SerializerError::UnsupportedVersion(version));
        }
        Ok(version)
    }

    /// Reads key fields in fixed order, returning key and its raw tangent mode code.
    fn read_key(&self, mut line: &str) -> Option<(Key, i64)> {
        let mut points = [Point::zero(); 3];
        for point in &mut points {
            let captures = self.point.captures(line)?;
            *point = Point::new(
                captures[1].parse::<Scalar>().ok()?,
                captures[2].parse::<Scalar>().ok()?,
            );
            line = suffix(line, &captures);
        }
        let captures = self.number.captures(line)?;
        let mode = captures[1].parse::<i64>().ok()?;
        let [control, left_tangent, right_tangent] = points;
        let key = Key::with_tangents(control, left_tangent, right_tangent, TangentMode::default());
        Some((key, mode))
    }
}

fn suffix<'a>(line: &'a str, captures: &Captures) -> &'a str {
    captures
        .get(0)
        .map(|found| &line[found.end()..])
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SIMPLE: &str = "version:1
0:x=0.000000;y=0.000000,x=-1.000000;y=0.000000,x=1.000000;y=0.000000,0
1:x=1.000000;y=1.000000,x=-1.000000;y=0.000000,x=1.000000;y=0.000000,0
";

    fn simple_curve() -> Curve {
        Curve::from_keys(vec![
            Key::new(Point::new(0.0, 0.0)),
            Key::new(Point::new(1.0, 1.0)),
        ])
    }

    #[test]
    fn test_serialize() {
        let serializer = CurveSerializer::new();
        assert_eq!(serializer.serialize(&simple_curve()), SIMPLE);
        assert_eq!(serializer.serialize(&Curve::new()), "version:1\n");
    }

    #[test]
    fn test_unserialize() {
        let curve = CurveSerializer::new().unserialize(SIMPLE).unwrap();
        assert_eq!(curve.keys(), simple_curve().keys());
        assert!(curve.is_length_dirty());
    }

    #[test]
    fn test_round_trip() {
        let mut curve = Curve::new();
        curve.add_key(Key::with_tangents(
            Point::new(-0.5, 2.125),
            Point::new(-1.0, -0.333333),
            Point::new(0.25, 0.75),
            TangentMode::Broken,
        ));
        curve.add_key(Key::with_tangents(
            Point::new(12.345678, -7.654321),
            Point::new(-0.6, 0.8),
            Point::new(1.2, -1.6),
            TangentMode::Aligned,
        ));
        curve.add_key(Key::new(Point::new(100.0, -250.5)));

        let serializer = CurveSerializer::new();
        let data = serializer.serialize(&curve);
        let result = serializer.unserialize(&data).unwrap();
        assert_eq!(result.keys_count(), curve.keys_count());
        for (a, b) in curve.keys().iter().zip(result.keys()) {
            for (a, b) in [
                (a.control, b.control),
                (a.left_tangent, b.left_tangent),
                (a.right_tangent, b.right_tangent),
            ] {
                assert_relative_eq!(a.x, b.x, epsilon = 1.0e-6);
                assert_relative_eq!(a.y, b.y, epsilon = 1.0e-6);
            }
            assert_eq!(a.tangent_mode, b.tangent_mode);
        }
        assert_eq!(serializer.serialize(&result), data);
    }

    #[test]
    fn test_missing_version() {
        let serializer = CurveSerializer::new();
        assert_eq!(
            serializer.unserialize("").unwrap_err(),
            SerializerError::MissingVersion
        );
        assert_eq!(
            serializer
                .unserialize("0:x=0.000000;y=0.000000,x=-1.000000;y=0.000000,x=1.000000;y=0.000000,0")
                .unwrap_err(),
            SerializerError::MissingVersion
        );
        assert_eq!(
            serializer.unserialize("version:one\n").unwrap_err(),
            SerializerError::MissingVersion
        );
        assert_eq!(
            serializer
                .unserialize("version:99999999999999999999\n")
                .unwrap_err(),
            SerializerError::MalformedVersion("99999999999999999999".to_owned())
        );
        assert_eq!(
            serializer.unserialize("version:2\n").unwrap_err(),
            SerializerError::UnsupportedVersion(2)
        );
    }

    #[test]
    fn test_lax_key_lines() {
        let data = "version:1\r
0:x=1.000000;y=2.000000,broken\r
\r
just a comment\r
1:x=0.500000;y=0.500000,x=-0.500000;y=-0.500000,x=1.000000;y=5.000000,2;extra\r
";
        let curve = CurveSerializer::new().unserialize(data).unwrap();
        assert_eq!(curve.keys_count(), 1);
        let key = &curve.keys()[0];
        assert_eq!(key.control, Point::new(0.5, 0.5));
        assert_eq!(key.left_tangent, Point::new(-0.5, -0.5));
        assert_eq!(key.right_tangent, Point::new(1.0, 5.0));
        assert_eq!(key.tangent_mode, TangentMode::Broken);
    }

    #[test]
    fn test_unknown_tangent_mode() {
        let data = "version:1
0:x=0.000000;y=0.000000,x=-1.000000;y=0.000000,x=1.000000;y=0.000000,7
";
        assert_eq!(
            CurveSerializer::new().unserialize(data).unwrap_err(),
            SerializerError::UnknownTangentMode { line: 2, mode: 7 }
        );
    }

    #[test]
    fn test_empty_curve() {
        let curve = CurveSerializer::new().unserialize("version:1\n").unwrap();
        assert_eq!(curve.keys_count(), 0);
        assert!(!curve.is_valid());
    }
}
