//! Rectangle element.

use super::{ElementError, ElementKind, ElementShape, finite, finite_point, non_negative, require};
use crate::geometry::{point_in_polygon, point_to_segment_dist, polygon_intersects_rect, rotate_point};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A rectangle anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    /// Top-left corner position.
    pub top_left: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleParams {
    pub top_left: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
}

impl Rectangle {
    pub fn new(top_left: Point, width: f64, height: f64) -> Result<Self, ElementError> {
        let kind = ElementKind::Rectangle;
        Ok(Self {
            top_left: finite_point(top_left, kind, "topLeft")?,
            width: non_negative(width, kind, "width")?,
            height: non_negative(height, kind, "height")?,
            rotation: 0.0,
        })
    }

    pub fn with_rotation(mut self, rotation: f64) -> Result<Self, ElementError> {
        self.rotation = finite(rotation, ElementKind::Rectangle, "rotation")?;
        Ok(self)
    }

    /// Create a rectangle from two corner points, in any drag direction.
    pub fn from_corners(p1: Point, p2: Point) -> Result<Self, ElementError> {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        let width = (p2.x - p1.x).abs();
        let height = (p2.y - p1.y).abs();

        Self::new(Point::new(min_x, min_y), width, height)
    }

    pub fn from_params(params: RectangleParams) -> Result<Self, ElementError> {
        let kind = ElementKind::Rectangle;
        let top_left = require(params.top_left, kind, "topLeft")?;
        let width = require(params.width, kind, "width")?;
        let height = require(params.height, kind, "height")?;
        Self::new(top_left, width, height)?.with_rotation(params.rotation.unwrap_or(0.0))
    }

    /// The unrotated rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.top_left, (self.width, self.height))
    }

    pub fn center(&self) -> Point {
        self.as_rect().center()
    }

    /// Corners in world space with rotation applied, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        let r = self.as_rect();
        let c = r.center();
        [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
        ]
        .map(|p| rotate_point(p, c, self.rotation))
    }
}

impl ElementShape for Rectangle {
    fn kind(&self) -> ElementKind {
        ElementKind::Rectangle
    }

    fn bounds(&self) -> Rect {
        if self.rotation == 0.0 {
            return self.as_rect();
        }
        let corners = self.corners();
        corners[1..]
            .iter()
            .fold(Rect::from_points(corners[0], corners[0]), |r, p| r.union_pt(*p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let corners = self.corners();
        point_in_polygon(point, &corners)
            || (0..4).any(|i| point_to_segment_dist(point, corners[i], corners[(i + 1) % 4]) <= tolerance)
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        polygon_intersects_rect(&self.corners(), rect)
    }
}
