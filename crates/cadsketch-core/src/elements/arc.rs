//! Circular arc element.

use super::{ElementError, ElementKind, ElementShape, finite, finite_point, non_negative, require};
use crate::geometry::{normalize_angle, polyline_intersects_rect};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Maximum angular step when flattening an arc into segments.
const FLATTEN_STEP: f64 = std::f64::consts::PI / 32.0;

/// An arc running from `start_angle` to `end_angle` in the direction of
/// increasing angle. Angles are radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcParams {
    pub center: Option<Point>,
    pub radius: Option<f64>,
    pub start_angle: Option<f64>,
    pub end_angle: Option<f64>,
}

impl Arc {
    pub fn new(center: Point, radius: f64, start_angle: f64, end_angle: f64) -> Result<Self, ElementError> {
        let kind = ElementKind::Arc;
        Ok(Self {
            center: finite_point(center, kind, "center")?,
            radius: non_negative(radius, kind, "radius")?,
            start_angle: finite(start_angle, kind, "startAngle")?,
            end_angle: finite(end_angle, kind, "endAngle")?,
        })
    }

    pub fn from_params(params: ArcParams) -> Result<Self, ElementError> {
        let kind = ElementKind::Arc;
        Self::new(
            require(params.center, kind, "center")?,
            require(params.radius, kind, "radius")?,
            require(params.start_angle, kind, "startAngle")?,
            require(params.end_angle, kind, "endAngle")?,
        )
    }

    /// Angular extent in `[0, 2π)`.
    pub fn sweep(&self) -> f64 {
        normalize_angle(self.end_angle - self.start_angle)
    }

    /// Whether the sweep exceeds half a turn (SVG large-arc flag).
    pub fn is_large(&self) -> bool {
        self.sweep() > std::f64::consts::PI
    }

    pub fn point_at(&self, angle: f64) -> Point {
        self.center + Vec2::from_angle(angle) * self.radius
    }

    pub fn start_point(&self) -> Point {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> Point {
        self.point_at(self.end_angle)
    }

    fn covers_angle(&self, angle: f64) -> bool {
        normalize_angle(angle - self.start_angle) <= self.sweep()
    }

    /// Approximate the arc with a chain of points.
    pub fn flatten(&self) -> Vec<Point> {
        let sweep = self.sweep();
        let steps = ((sweep / FLATTEN_STEP).ceil() as usize).max(1);
        (0..=steps)
            .map(|i| self.point_at(self.start_angle + sweep * i as f64 / steps as f64))
            .collect()
    }
}

impl ElementShape for Arc {
    fn kind(&self) -> ElementKind {
        ElementKind::Arc
    }

    fn bounds(&self) -> Rect {
        let start = self.start_point();
        // Endpoints plus every axis extreme the arc passes through
        (0..4)
            .map(|k| k as f64 * FRAC_PI_2)
            .filter(|a| self.covers_angle(*a))
            .map(|a| self.point_at(a))
            .fold(Rect::from_points(start, self.end_point()), |r, p| r.union_pt(p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let offset = point - self.center;
        (offset.hypot() - self.radius).abs() <= tolerance && self.covers_angle(offset.atan2())
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        polyline_intersects_rect(&self.flatten(), rect)
    }
}
