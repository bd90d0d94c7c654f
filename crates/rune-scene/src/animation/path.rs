//! Motion paths for path-following tweens and custom easing.
//!
//! A [`GPath`] is built from a list of [`PathPoint`]s. Each point names the
//! kind of curve that leaves it: straight lines, quadratic or cubic Bezier
//! curves, or Catmull-Rom splines that run through consecutive spline points.
//! Sampling is by arc length, so `point_at(0.5)` is halfway along the path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in path space. Paths are 3D; 2D callers leave `z` at zero.
pub type Vec3 = [f32; 3];

/// Curve leaving a [`PathPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CurveType {
    #[default]
    CrSpline = 0,
    Bezier = 1,
    CubicBezier = 2,
    Straight = 3,
}

impl CurveType {
    /// Map a stored id to a curve type. Unknown ids become splines.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Self::Bezier,
            2 => Self::CubicBezier,
            3 => Self::Straight,
            _ => Self::CrSpline,
        }
    }
}

/// One control point of a path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathPoint {
    pub pos: Vec3,
    pub control1: Vec3,
    pub control2: Vec3,
    pub curve_type: CurveType,
}

impl PathPoint {
    pub fn straight(x: f32, y: f32) -> Self {
        Self {
            pos: [x, y, 0.0],
            curve_type: CurveType::Straight,
            ..Self::default()
        }
    }

    pub fn spline(x: f32, y: f32) -> Self {
        Self {
            pos: [x, y, 0.0],
            curve_type: CurveType::CrSpline,
            ..Self::default()
        }
    }

    /// A quadratic Bezier leaving `(x, y)` with one control point.
    pub fn bezier(x: f32, y: f32, cx: f32, cy: f32) -> Self {
        Self {
            pos: [x, y, 0.0],
            control1: [cx, cy, 0.0],
            curve_type: CurveType::Bezier,
            ..Self::default()
        }
    }

    /// A cubic Bezier leaving `(x, y)` with two control points.
    pub fn cubic_bezier(x: f32, y: f32, c1x: f32, c1y: f32, c2x: f32, c2y: f32) -> Self {
        Self {
            pos: [x, y, 0.0],
            control1: [c1x, c1y, 0.0],
            control2: [c2x, c2y, 0.0],
            curve_type: CurveType::CubicBezier,
        }
    }
}

/// Anything a tween can follow.
pub trait PathSampler: Send + Sync + fmt::Debug {
    /// Point at normalized arc length `t` in `0..=1`.
    fn point_at(&self, t: f32) -> Vec3;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    curve_type: CurveType,
    length: f32,
    pt_start: usize,
    pt_count: usize,
}

/// A piecewise path sampled by arc length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GPath {
    segments: Vec<Segment>,
    points: Vec<Vec3>,
    full_length: f32,
}

impl GPath {
    pub fn new(points: &[PathPoint]) -> Self {
        let mut path = Self::default();
        if points.is_empty() {
            return path;
        }

        let mut spline_points: Vec<Vec3> = Vec::new();
        let mut prev = points[0];
        if prev.curve_type == CurveType::CrSpline {
            spline_points.push(prev.pos);
        }

        for current in &points[1..] {
            let pt_start = path.points.len();
            let segment = match prev.curve_type {
                CurveType::CrSpline => None,
                CurveType::Straight => {
                    path.points.extend_from_slice(&[prev.pos, current.pos]);
                    Some(Segment {
                        curve_type: CurveType::Straight,
                        length: distance(prev.pos, current.pos),
                        pt_start,
                        pt_count: 2,
                    })
                }
                CurveType::Bezier | CurveType::CubicBezier => {
                    path.points
                        .extend_from_slice(&[prev.pos, current.pos, prev.control1, prev.control2]);
                    Some(Segment {
                        curve_type: prev.curve_type,
                        length: distance(prev.pos, current.pos),
                        pt_start,
                        pt_count: 4,
                    })
                }
            };
            if let Some(segment) = segment {
                path.full_length += segment.length;
                path.segments.push(segment);
            }

            if current.curve_type != CurveType::CrSpline {
                if !spline_points.is_empty() {
                    spline_points.push(current.pos);
                    path.push_spline(&spline_points);
                    spline_points.clear();
                }
            } else {
                spline_points.push(current.pos);
            }
            prev = *current;
        }

        if spline_points.len() > 1 {
            path.push_spline(&spline_points);
        }
        path
    }

    fn push_spline(&mut self, spline_points: &[Vec3]) {
        let (Some(&first), Some(&last)) = (spline_points.first(), spline_points.last()) else {
            return;
        };
        let pt_start = self.points.len();
        self.points.push(first);
        self.points.extend_from_slice(spline_points);
        self.points.push(last);

        let length: f32 = spline_points
            .windows(2)
            .map(|pair| distance(pair[0], pair[1]))
            .sum();
        self.full_length += length;
        self.segments.push(Segment {
            curve_type: CurveType::CrSpline,
            length,
            pt_start,
            pt_count: spline_points.len() + 2,
        });
    }

    /// Total approximate length (chord length for curved segments).
    pub fn length(&self) -> f32 {
        self.full_length
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Point at normalized arc length `t`, clamped to `0..=1`.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let Some(last) = self.segments.last() else {
            return [0.0; 3];
        };
        if self.full_length <= 0.0 {
            return self.segment_point(self.segments[0], 0.0);
        }

        let mut remaining = t * self.full_length;
        for segment in &self.segments {
            remaining -= segment.length;
            if remaining < 0.0 {
                let local = 1.0 + remaining / segment.length;
                return self.segment_point(*segment, local);
            }
        }
        self.segment_point(*last, 1.0)
    }

    fn segment_point(&self, segment: Segment, t: f32) -> Vec3 {
        let pts = &self.points[segment.pt_start..segment.pt_start + segment.pt_count];
        match segment.curve_type {
            CurveType::Straight => lerp(pts[0], pts[1], t),
            CurveType::Bezier => quadratic_bezier(pts[0], pts[2], pts[1], t),
            CurveType::CubicBezier => cubic_bezier(pts[0], pts[2], pts[3], pts[1], t),
            CurveType::CrSpline => catmull_rom(pts, t),
        }
    }
}

impl PathSampler for GPath {
    fn point_at(&self, t: f32) -> Vec3 {
        GPath::point_at(self, t)
    }
}

fn distance(a: Vec3, b: Vec3) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

fn quadratic_bezier(p0: Vec3, c: Vec3, p1: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    let (a, b, d) = (u * u, 2.0 * t * u, t * t);
    [
        a * p0[0] + b * c[0] + d * p1[0],
        a * p0[1] + b * c[1] + d * p1[1],
        a * p0[2] + b * c[2] + d * p1[2],
    ]
}

fn cubic_bezier(p0: Vec3, c1: Vec3, c2: Vec3, p1: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * t * u * u, 3.0 * t * t * u, t * t * t);
    [
        a * p0[0] + b * c1[0] + c * c2[0] + d * p1[0],
        a * p0[1] + b * c1[1] + c * c2[1] + d * p1[1],
        a * p0[2] + b * c1[2] + c * c2[2] + d * p1[2],
    ]
}

/// Catmull-Rom through `pts`, whose first and last entries duplicate the ends.
fn catmull_rom(pts: &[Vec3], t: f32) -> Vec3 {
    let spans = pts.len().saturating_sub(3);
    if spans == 0 {
        return pts.first().copied().unwrap_or([0.0; 3]);
    }
    let scaled = t * spans as f32;
    let index = (scaled.floor() as usize).min(spans - 1);
    let local = if t >= 1.0 { 1.0 } else { scaled - index as f32 };

    let (p0, p1, p2, p3) = (pts[index], pts[index + 1], pts[index + 2], pts[index + 3]);
    let t2 = local * local;
    let t3 = t2 * local;
    std::array::from_fn(|i| {
        0.5 * ((2.0 * p1[i])
            + (-p0[i] + p2[i]) * local
            + (2.0 * p0[i] - 5.0 * p1[i] + 4.0 * p2[i] - p3[i]) * t2
            + (-p0[i] + 3.0 * p1[i] - 3.0 * p2[i] + p3[i]) * t3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < EPSILON)
    }

    #[test]
    fn test_straight_segments_by_length() {
        let path = GPath::new(&[
            PathPoint::straight(0.0, 0.0),
            PathPoint::straight(30.0, 0.0),
            PathPoint::straight(30.0, 10.0),
        ]);
        assert_eq!(path.segment_count(), 2);
        assert!((path.length() - 40.0).abs() < EPSILON);
        assert!(approx(path.point_at(0.0), [0.0, 0.0, 0.0]));
        assert!(approx(path.point_at(0.5), [20.0, 0.0, 0.0]));
        assert!(approx(path.point_at(0.875), [30.0, 5.0, 0.0]));
        assert!(approx(path.point_at(1.0), [30.0, 10.0, 0.0]));
        assert!(approx(path.point_at(3.0), [30.0, 10.0, 0.0]));
    }

    #[test]
    fn test_quadratic_bezier_midpoint() {
        let path = GPath::new(&[
            PathPoint::bezier(0.0, 0.0, 50.0, 100.0),
            PathPoint::straight(100.0, 0.0),
        ]);
        assert_eq!(path.segment_count(), 1);
        assert!(approx(path.point_at(0.5), [50.0, 50.0, 0.0]));
    }

    #[test]
    fn test_cubic_bezier_endpoints() {
        let path = GPath::new(&[
            PathPoint::cubic_bezier(0.0, 0.0, 0.0, 50.0, 100.0, 50.0),
            PathPoint::straight(100.0, 0.0),
        ]);
        assert!(approx(path.point_at(0.0), [0.0, 0.0, 0.0]));
        assert!(approx(path.point_at(1.0), [100.0, 0.0, 0.0]));
        assert!(approx(path.point_at(0.5), [50.0, 37.5, 0.0]));
    }

    #[test]
    fn test_spline_passes_through_points() {
        let path = GPath::new(&[
            PathPoint::spline(0.0, 0.0),
            PathPoint::spline(10.0, 0.0),
            PathPoint::spline(20.0, 0.0),
        ]);
        assert_eq!(path.segment_count(), 1);
        assert!(approx(path.point_at(0.0), [0.0, 0.0, 0.0]));
        assert!(approx(path.point_at(0.5), [10.0, 0.0, 0.0]));
        assert!(approx(path.point_at(1.0), [20.0, 0.0, 0.0]));
    }

    #[test]
    fn test_spline_then_straight() {
        let path = GPath::new(&[
            PathPoint::spline(0.0, 0.0),
            PathPoint::straight(10.0, 0.0),
            PathPoint::straight(10.0, 10.0),
        ]);
        assert_eq!(path.segment_count(), 2);
        assert!(approx(path.point_at(1.0), [10.0, 10.0, 0.0]));
    }

    #[test]
    fn test_empty_path_samples_origin() {
        let path = GPath::new(&[]);
        assert!(path.is_empty());
        assert_eq!(path.point_at(0.5), [0.0; 3]);
    }

    #[test]
    fn test_curve_type_ids() {
        assert_eq!(CurveType::from_id(0), CurveType::CrSpline);
        assert_eq!(CurveType::from_id(3), CurveType::Straight);
        assert_eq!(CurveType::from_id(9), CurveType::CrSpline);
    }
}
