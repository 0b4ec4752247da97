//! Element definitions for the drawing.
//!
//! Every element variant has a validating constructor that rejects missing or
//! malformed geometry up front, so a stored [`Element`] is always well formed.

mod arc;
mod circle;
mod line;
mod polyline;
mod rectangle;
mod style;
mod text;

pub use arc::{Arc, ArcParams};
pub use circle::{Circle, CircleParams};
pub use line::{Line, LineParams};
pub use polyline::{Polyline, PolylineParams};
pub use rectangle::{Rectangle, RectangleParams};
pub use style::{Color, ColorParseError, ElementStyle, LineType};
pub use text::{HorizontalAlign, Text, TextParams, VerticalAlign};

use crate::store::LayerId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Free-form key/value data attached to an element.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// The closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Line,
    Polyline,
    Rectangle,
    Circle,
    Arc,
    Text,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Line,
        ElementKind::Polyline,
        ElementKind::Rectangle,
        ElementKind::Circle,
        ElementKind::Arc,
        ElementKind::Text,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Line => "line",
            ElementKind::Polyline => "polyline",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Circle => "circle",
            ElementKind::Arc => "arc",
            ElementKind::Text => "text",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected element construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementError {
    #[error("{kind} is missing required field `{field}`")]
    MissingField {
        kind: ElementKind,
        field: &'static str,
    },
    #[error("{kind} field `{field}` must be finite")]
    NonFinite {
        kind: ElementKind,
        field: &'static str,
    },
    #[error("{kind} field `{field}` must not be negative")]
    Negative {
        kind: ElementKind,
        field: &'static str,
    },
    #[error("polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("text content must not be empty")]
    EmptyText,
    #[error("font size must be positive, got {0}")]
    InvalidFontSize(f64),
}

pub(crate) fn require<T>(
    value: Option<T>,
    kind: ElementKind,
    field: &'static str,
) -> Result<T, ElementError> {
    value.ok_or(ElementError::MissingField { kind, field })
}

pub(crate) fn finite(value: f64, kind: ElementKind, field: &'static str) -> Result<f64, ElementError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ElementError::NonFinite { kind, field })
    }
}

pub(crate) fn finite_point(
    point: Point,
    kind: ElementKind,
    field: &'static str,
) -> Result<Point, ElementError> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(ElementError::NonFinite { kind, field })
    }
}

pub(crate) fn non_negative(
    value: f64,
    kind: ElementKind,
    field: &'static str,
) -> Result<f64, ElementError> {
    let value = finite(value, kind, field)?;
    if value < 0.0 {
        Err(ElementError::Negative { kind, field })
    } else {
        Ok(value)
    }
}

/// Common behaviour of element geometry.
pub trait ElementShape {
    fn kind(&self) -> ElementKind;

    /// Axis-aligned bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a world point lies on (or within `tolerance` of) the element.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Check if the element overlaps a world-space rectangle.
    fn intersects_rect(&self, rect: Rect) -> bool;
}

/// Geometry of an element, one variant per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementGeometry {
    Line(Line),
    Polyline(Polyline),
    Rectangle(Rectangle),
    Circle(Circle),
    Arc(Arc),
    Text(Text),
}

impl ElementGeometry {
    fn as_shape(&self) -> &dyn ElementShape {
        match self {
            ElementGeometry::Line(s) => s,
            ElementGeometry::Polyline(s) => s,
            ElementGeometry::Rectangle(s) => s,
            ElementGeometry::Circle(s) => s,
            ElementGeometry::Arc(s) => s,
            ElementGeometry::Text(s) => s,
        }
    }
}

impl ElementShape for ElementGeometry {
    fn kind(&self) -> ElementKind {
        self.as_shape().kind()
    }

    fn bounds(&self) -> Rect {
        self.as_shape().bounds()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_shape().hit_test(point, tolerance)
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        self.as_shape().intersects_rect(rect)
    }
}

impl From<Line> for ElementGeometry {
    fn from(v: Line) -> Self {
        ElementGeometry::Line(v)
    }
}

impl From<Polyline> for ElementGeometry {
    fn from(v: Polyline) -> Self {
        ElementGeometry::Polyline(v)
    }
}

impl From<Rectangle> for ElementGeometry {
    fn from(v: Rectangle) -> Self {
        ElementGeometry::Rectangle(v)
    }
}

impl From<Circle> for ElementGeometry {
    fn from(v: Circle) -> Self {
        ElementGeometry::Circle(v)
    }
}

impl From<Arc> for ElementGeometry {
    fn from(v: Arc) -> Self {
        ElementGeometry::Arc(v)
    }
}

impl From<Text> for ElementGeometry {
    fn from(v: Text) -> Self {
        ElementGeometry::Text(v)
    }
}

/// A stored drawing element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub(crate) id: ElementId,
    pub layer_id: LayerId,
    pub style: ElementStyle,
    pub(crate) selected: bool,
    pub locked: bool,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(flatten)]
    pub geometry: ElementGeometry,
}

impl Element {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn kind(&self) -> ElementKind {
        self.geometry.kind()
    }

    pub fn bounds(&self) -> Rect {
        self.geometry.bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.geometry.hit_test(point, tolerance)
    }

    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.geometry.intersects_rect(rect)
    }
}

/// A creation request handed to the store.
///
/// Unset fields are resolved by the store: the layer falls back to the active
/// layer and the style is derived from the layer color.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDraft {
    pub geometry: ElementGeometry,
    pub layer_id: Option<LayerId>,
    pub style: Option<ElementStyle>,
    pub metadata: Option<Metadata>,
}

impl ElementDraft {
    pub fn new(geometry: impl Into<ElementGeometry>) -> Self {
        Self {
            geometry: geometry.into(),
            layer_id: None,
            style: None,
            metadata: None,
        }
    }

    pub fn with_layer(mut self, layer_id: LayerId) -> Self {
        self.layer_id = Some(layer_id);
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Partial update merged into an existing element. Selection is changed
/// only through the store's select/deselect operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub geometry: Option<ElementGeometry>,
    pub layer_id: Option<LayerId>,
    pub style: Option<ElementStyle>,
    pub locked: Option<bool>,
    pub metadata: Option<Metadata>,
}
