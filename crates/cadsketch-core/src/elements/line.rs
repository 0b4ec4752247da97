//! Line segment element.

use super::{ElementError, ElementKind, ElementShape, finite_point, require};
use crate::geometry::{point_to_segment_dist, polyline_intersects_rect};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A straight segment between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

/// Unvalidated line fields, as received from a creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineParams {
    pub start: Option<Point>,
    pub end: Option<Point>,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Result<Self, ElementError> {
        Ok(Self {
            start: finite_point(start, ElementKind::Line, "start")?,
            end: finite_point(end, ElementKind::Line, "end")?,
        })
    }

    pub fn from_params(params: LineParams) -> Result<Self, ElementError> {
        let start = require(params.start, ElementKind::Line, "start")?;
        let end = require(params.end, ElementKind::Line, "end")?;
        Self::new(start, end)
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }
}

impl ElementShape for Line {
    fn kind(&self) -> ElementKind {
        ElementKind::Line
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start, self.end) <= tolerance
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        polyline_intersects_rect(&[self.start, self.end], rect)
    }
}
