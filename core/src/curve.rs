//! Parametric paths embedded in tiles and traversed by movers.
//!
//! A [`Curve`] is evaluated at a parameter inside `[min_parameter,
//! max_parameter]`. Raw distances produced by integrating speed over time are
//! first passed through [`Curve::standardize_parameter`], which maps them back
//! into the valid range. Positions are expressed in tile-local space: the
//! tile centre sits at the origin, `+X` points toward [`crate::Side::Right`]
//! and `+Z` points toward [`crate::Side::Up`].

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Quat, Vec3};
use thiserror::Error;

const MIN_SEGMENT_LENGTH: f32 = 1.0e-5;

/// Parametric path with declared parameter bounds.
pub trait Curve: fmt::Debug {
    /// Lower parameter bound; evaluates to the path's first declared end.
    fn min_parameter(&self) -> f32;

    /// Upper parameter bound; evaluates to the path's second declared end.
    fn max_parameter(&self) -> f32;

    /// Maps a raw distance into `[min_parameter, max_parameter]`.
    fn standardize_parameter(&self, raw: f32) -> f32;

    /// Position on the path at parameter `t`.
    fn evaluate_position(&self, t: f32) -> Vec3;

    /// Orientation whose forward axis (`+Z`) follows the path tangent at `t`
    /// in the direction of increasing parameter.
    fn evaluate_orientation(&self, t: f32) -> Quat;
}

/// Reasons a polyline could not be constructed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CurveError {
    /// Fewer than two distinct points were supplied.
    #[error("a curve needs at least two distinct points")]
    TooFewPoints,
}

/// Piecewise-linear path parameterized by travelled distance.
#[derive(Clone, Debug, PartialEq)]
pub struct PolylineCurve {
    points: Vec<Vec3>,
    distances: Vec<f32>,
}

impl PolylineCurve {
    /// Builds a polyline through the provided points, dropping consecutive
    /// duplicates.
    pub fn new(points: impl IntoIterator<Item = Vec3>) -> Result<Self, CurveError> {
        let mut kept: Vec<Vec3> = Vec::new();
        let mut distances = Vec::new();
        let mut travelled = 0.0;
        for point in points {
            if let Some(last) = kept.last() {
                let step = last.distance(point);
                if step < MIN_SEGMENT_LENGTH {
                    continue;
                }
                travelled += step;
            }
            kept.push(point);
            distances.push(travelled);
        }

        if kept.len() < 2 {
            return Err(CurveError::TooFewPoints);
        }

        Ok(Self {
            points: kept,
            distances,
        })
    }

    /// Straight segment between two points.
    pub fn straight(from: Vec3, to: Vec3) -> Result<Self, CurveError> {
        Self::new([from, to])
    }

    /// Quarter ellipse from `start` to `end` swept around `pivot`.
    ///
    /// `start - pivot` and `end - pivot` must be perpendicular; tile corners
    /// satisfy this for every pair of adjacent side anchors.
    pub fn quarter_arc(
        start: Vec3,
        end: Vec3,
        pivot: Vec3,
        segments: u32,
    ) -> Result<Self, CurveError> {
        let segments = segments.max(1);
        let to_start = start - pivot;
        let to_end = end - pivot;
        let points = (0..=segments).map(|step| {
            let angle = FRAC_PI_2 * step as f32 / segments as f32;
            pivot + to_start * angle.cos() + to_end * angle.sin()
        });
        Self::new(points)
    }

    /// Total length of the path in world units.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    fn locate(&self, t: f32) -> (usize, f32) {
        let t = self.standardize_parameter(t);
        let last_segment = self.points.len() - 2;
        let segment = self
            .distances
            .partition_point(|distance| *distance <= t)
            .saturating_sub(1)
            .min(last_segment);
        let start = self.distances[segment];
        let span = self.distances[segment + 1] - start;
        let fraction = ((t - start) / span).clamp(0.0, 1.0);
        (segment, fraction)
    }
}

impl Curve for PolylineCurve {
    fn min_parameter(&self) -> f32 {
        0.0
    }

    fn max_parameter(&self) -> f32 {
        self.length()
    }

    fn standardize_parameter(&self, raw: f32) -> f32 {
        if raw.is_nan() {
            return self.min_parameter();
        }
        raw.clamp(self.min_parameter(), self.max_parameter())
    }

    fn evaluate_position(&self, t: f32) -> Vec3 {
        let (segment, fraction) = self.locate(t);
        self.points[segment].lerp(self.points[segment + 1], fraction)
    }

    fn evaluate_orientation(&self, t: f32) -> Quat {
        let (segment, _) = self.locate(t);
        let tangent = self.points[segment + 1] - self.points[segment];
        Quat::from_rotation_y(tangent.x.atan2(tangent.z))
    }
}
