//! CadSketch Core Library
//!
//! Interactive 2D drafting engine: viewport transforms, grid snapping,
//! drawing tools and the element/layer registry. Rendering and UI live
//! outside this crate.

pub mod canvas;
pub mod command;
pub mod config;
pub mod elements;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod store;
pub mod tools;
pub mod viewport;

pub use canvas::{Canvas, CanvasStatus, CursorPosition, NoTextInput, TextInput};
pub use command::{CommandAction, CommandError, CommandRequest, CommandService};
pub use config::CanvasConfig;
pub use elements::{
    Color, Element, ElementDraft, ElementError, ElementGeometry, ElementId, ElementKind, ElementPatch,
    ElementShape, ElementStyle, LineType,
};
pub use geometry::apply_ortho_constraint;
pub use grid::{Grid, GridError, GridOverlay, GridSettings, SnapResult};
pub use input::{Modifiers, PointerEvent, PointerEventKind};
pub use store::{ElementStore, Layer, LayerDraft, LayerId, LayerPatch};
pub use tools::{ToolData, ToolKind, ToolManager, ToolOutput, ToolPreview, ToolState};
pub use viewport::Viewport;
