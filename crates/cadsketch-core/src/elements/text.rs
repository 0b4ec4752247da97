//! Text element.

use super::{ElementError, ElementKind, ElementShape, finite, finite_point, require};
use crate::geometry::{point_in_polygon, point_to_segment_dist, polygon_intersects_rect, rotate_point};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Approximate glyph advance as a fraction of the font size.
const AVG_CHAR_WIDTH: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// A single-line text label anchored at `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub position: Point,
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
    /// Rotation in radians around `position`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub horizontal_align: HorizontalAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextParams {
    pub position: Option<Point>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub rotation: Option<f64>,
    pub horizontal_align: Option<HorizontalAlign>,
    pub vertical_align: Option<VerticalAlign>,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 14.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";

    /// Text with the default font metrics and alignment.
    pub fn new(position: Point, content: impl Into<String>) -> Result<Self, ElementError> {
        let content = content.into();
        if content.is_empty() {
            return Err(ElementError::EmptyText);
        }
        Ok(Self {
            position: finite_point(position, ElementKind::Text, "position")?,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            rotation: 0.0,
            horizontal_align: HorizontalAlign::default(),
            vertical_align: VerticalAlign::default(),
        })
    }

    pub fn with_font_size(mut self, font_size: f64) -> Result<Self, ElementError> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(ElementError::InvalidFontSize(font_size));
        }
        self.font_size = font_size;
        Ok(self)
    }

    pub fn from_params(params: TextParams) -> Result<Self, ElementError> {
        let position = require(params.position, ElementKind::Text, "position")?;
        let content = require(params.content, ElementKind::Text, "content")?;
        let mut text = Self::new(position, content)?
            .with_font_size(params.font_size.unwrap_or(Self::DEFAULT_FONT_SIZE))?;
        if let Some(family) = params.font_family.filter(|f| !f.trim().is_empty()) {
            text.font_family = family;
        }
        text.rotation = finite(params.rotation.unwrap_or(0.0), ElementKind::Text, "rotation")?;
        text.horizontal_align = params.horizontal_align.unwrap_or_default();
        text.vertical_align = params.vertical_align.unwrap_or_default();
        Ok(text)
    }

    /// Estimated unrotated extent; no font metrics are available here.
    fn layout_rect(&self) -> Rect {
        let width = self.content.chars().count() as f64 * self.font_size * AVG_CHAR_WIDTH;
        let height = self.font_size;
        let x = match self.horizontal_align {
            HorizontalAlign::Left => self.position.x,
            HorizontalAlign::Center => self.position.x - width / 2.0,
            HorizontalAlign::Right => self.position.x - width,
        };
        let y = match self.vertical_align {
            VerticalAlign::Top => self.position.y,
            VerticalAlign::Middle => self.position.y - height / 2.0,
            VerticalAlign::Bottom => self.position.y - height,
        };
        Rect::new(x, y, x + width, y + height)
    }

    fn corners(&self) -> [Point; 4] {
        let r = self.layout_rect();
        [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
        ]
        .map(|p| rotate_point(p, self.position, self.rotation))
    }
}

impl ElementShape for Text {
    fn kind(&self) -> ElementKind {
        ElementKind::Text
    }

    fn bounds(&self) -> Rect {
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
