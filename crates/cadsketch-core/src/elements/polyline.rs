//! Polyline element.

use super::{ElementError, ElementKind, ElementShape, finite_point, require};
use crate::geometry::{
    point_in_polygon, point_to_segment_dist, polygon_intersects_rect, polyline_intersects_rect,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An ordered chain of at least two vertices, optionally closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolylineParams {
    pub points: Option<Vec<Point>>,
    pub closed: Option<bool>,
}

impl Polyline {
    pub fn new(points: Vec<Point>, closed: bool) -> Result<Self, ElementError> {
        if points.len() < 2 {
            return Err(ElementError::TooFewPoints(points.len()));
        }
        for p in &points {
            finite_point(*p, ElementKind::Polyline, "points")?;
        }
        Ok(Self { points, closed })
    }

    /// An open polyline.
    pub fn open(points: Vec<Point>) -> Result<Self, ElementError> {
        Self::new(points, false)
    }

    pub fn from_params(params: PolylineParams) -> Result<Self, ElementError> {
        let points = require(params.points, ElementKind::Polyline, "points")?;
        Self::new(points, params.closed.unwrap_or(false))
    }

    /// Segments to draw, including the closing one when closed.
    fn chain(&self) -> Vec<Point> {
        let mut chain = self.points.clone();
        if self.closed {
            if let Some(first) = self.points.first() {
                chain.push(*first);
            }
        }
        chain
    }
}

impl ElementShape for Polyline {
    fn kind(&self) -> ElementKind {
        ElementKind::Polyline
    }

    fn bounds(&self) -> Rect {
        let Some(&first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .skip(1)
            .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.closed && point_in_polygon(point, &self.points) {
            return true;
        }
        self.chain()
            .windows(2)
            .any(|w| point_to_segment_dist(point, w[0], w[1]) <= tolerance)
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        if self.closed {
            polygon_intersects_rect(&self.points, rect)
        } else {
            polyline_intersects_rect(&self.points, rect)
        }
    }
}
