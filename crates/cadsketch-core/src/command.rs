//! Programmatic element creation from structured requests.
//!
//! A request names a creation action and carries the geometry fields of that
//! element kind as JSON. Natural-language front ends implement
//! [`CommandService`] to produce requests; the canvas applies them with the
//! same id and default-style rules as interactive drawing.

use crate::elements::{
    Arc, ArcParams, Circle, CircleParams, ElementDraft, ElementError, ElementGeometry, ElementKind,
    Line, LineParams, Polyline, PolylineParams, Rectangle, RectangleParams, Text, TextParams,
};
use crate::store::LayerId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),
    #[error(transparent)]
    Element(#[from] ElementError),
    #[error("could not interpret command `{0}`")]
    Unrecognized(String),
}

/// Creation actions understood by the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAction {
    CreateLine,
    CreatePolyline,
    CreateRectangle,
    CreateCircle,
    CreateArc,
    CreateText,
}

impl CommandAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandAction::CreateLine => "create_line",
            CommandAction::CreatePolyline => "create_polyline",
            CommandAction::CreateRectangle => "create_rectangle",
            CommandAction::CreateCircle => "create_circle",
            CommandAction::CreateArc => "create_arc",
            CommandAction::CreateText => "create_text",
        }
    }

    pub fn element_kind(self) -> ElementKind {
        match self {
            CommandAction::CreateLine => ElementKind::Line,
            CommandAction::CreatePolyline => ElementKind::Polyline,
            CommandAction::CreateRectangle => ElementKind::Rectangle,
            CommandAction::CreateCircle => ElementKind::Circle,
            CommandAction::CreateArc => ElementKind::Arc,
            CommandAction::CreateText => ElementKind::Text,
        }
    }
}

impl FromStr for CommandAction {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_line" => Ok(CommandAction::CreateLine),
            "create_polyline" => Ok(CommandAction::CreatePolyline),
            "create_rectangle" => Ok(CommandAction::CreateRectangle),
            "create_circle" => Ok(CommandAction::CreateCircle),
            "create_arc" => Ok(CommandAction::CreateArc),
            "create_text" => Ok(CommandAction::CreateText),
            other => Err(CommandError::UnknownAction(other.to_string())),
        }
    }
}

/// A structured creation request: `{"action": ..., "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub action: String,
    #[serde(default)]
    pub params: Value,
}

fn parse_params<T: DeserializeOwned + Default>(params: &Value) -> Result<T, CommandError> {
    if params.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(params.clone())?)
}

impl CommandRequest {
    pub fn new(action: impl Into<String>, params: Value) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn action(&self) -> Result<CommandAction, CommandError> {
        self.action.parse()
    }

    /// Validated element geometry for this request.
    pub fn geometry(&self) -> Result<ElementGeometry, CommandError> {
        let params = &self.params;
        let geometry: ElementGeometry = match self.action()? {
            CommandAction::CreateLine => Line::from_params(parse_params::<LineParams>(params)?)?.into(),
            CommandAction::CreatePolyline => {
                Polyline::from_params(parse_params::<PolylineParams>(params)?)?.into()
            }
            CommandAction::CreateRectangle => {
                Rectangle::from_params(parse_params::<RectangleParams>(params)?)?.into()
            }
            CommandAction::CreateCircle => Circle::from_params(parse_params::<CircleParams>(params)?)?.into(),
            CommandAction::CreateArc => Arc::from_params(parse_params::<ArcParams>(params)?)?.into(),
            CommandAction::CreateText => Text::from_params(parse_params::<TextParams>(params)?)?.into(),
        };
        Ok(geometry)
    }

    /// Build a store draft. Layer and style are left for the store to
    /// resolve unless `layerId` is given.
    pub fn to_draft(&self) -> Result<ElementDraft, CommandError> {
        let mut draft = ElementDraft::new(self.geometry()?);
        if let Some(layer) = self.params.get("layerId").and_then(Value::as_str) {
            draft = draft.with_layer(LayerId::new(layer));
        }
        Ok(draft)
    }
}

/// Translates free text into a creation request.
pub trait CommandService {
    fn interpret(&self, text: &str) -> Option<CommandRequest>;
}

impl<F> CommandService for F
where
    F: Fn(&str) -> Option<CommandRequest>,
{
    fn interpret(&self, text: &str) -> Option<CommandRequest> {
        self(text)
    }
}
