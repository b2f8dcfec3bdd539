use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::model::Viewport;

mod reveal;
#[cfg(test)]
pub mod fake;

pub use reveal::RevealPage;

pub trait Presentation {
    fn is_ready(&mut self) -> Result<bool>;
    fn slide_count(&mut self) -> Result<usize>;
    fn go_to_slide(&mut self, index: usize) -> Result<()>;
    fn current_indices(&mut self) -> Result<SlideIndices>;
}

pub trait SlidePage: Presentation {
    fn reveal_fragments(&mut self, index: usize) -> Result<()>;
    fn snapshot(&mut self, request: &ProbeRequest) -> Result<SlideSnapshot>;
    fn drain_console_errors(&mut self) -> Result<Vec<String>>;
    fn capture_screenshot(&mut self, path: &Path) -> Result<()>;
    fn measure(&mut self, index: usize) -> Result<SlideMetrics>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SlideIndices {
    #[serde(rename = "h")]
    pub horizontal: usize,
    #[serde(rename = "v", default)]
    pub vertical: usize,
    #[serde(rename = "f", default)]
    pub fragment: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconGridSpec {
    pub container: String,
    pub card: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardGridSpec {
    pub container: String,
    pub cards: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    pub index: usize,
    pub viewport: Viewport,
    pub font_groups: Vec<String>,
    pub icon_grids: Vec<IconGridSpec>,
    pub card_grids: Vec<CardGridSpec>,
    pub diagram_selector: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn exceeds(&self, viewport: Viewport, tolerance: f64) -> bool {
        self.left < -tolerance
            || self.right > f64::from(viewport.width) + tolerance
            || self.top < -tolerance
            || self.bottom > f64::from(viewport.height) + tolerance
    }

    pub fn lies_outside(&self, viewport: Viewport, tolerance: f64) -> bool {
        self.right < -tolerance
            || self.left > f64::from(viewport.width) + tolerance
            || self.bottom < -tolerance
            || self.top > f64::from(viewport.height) + tolerance
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProbe {
    pub src: String,
    pub complete: bool,
    pub natural_width: f64,
    pub natural_height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProbe {
    pub tag: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub class_name: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FontGroupProbe {
    pub selector: String,
    pub sizes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconGridProbe {
    pub container: String,
    pub cards_with_icon: Vec<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiagramProbe {
    pub src: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardGridProbe {
    pub container: String,
    pub instance: usize,
    pub heights: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSnapshot {
    pub present: bool,
    #[serde(default)]
    pub slide_rect: Option<Rect>,
    #[serde(default)]
    pub images: Vec<ImageProbe>,
    #[serde(default)]
    pub out_of_bounds: Vec<ElementProbe>,
    #[serde(default)]
    pub font_groups: Vec<FontGroupProbe>,
    #[serde(default)]
    pub icon_grids: Vec<IconGridProbe>,
    #[serde(default)]
    pub card_grids: Vec<CardGridProbe>,
    #[serde(default)]
    pub diagrams: Vec<DiagramProbe>,
    #[serde(default)]
    pub document_scroll_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideMetrics {
    #[serde(default)]
    pub slide: usize,
    pub slide_scroll_height: f64,
    pub slide_client_height: f64,
    pub slide_bounding_height: f64,
    pub stage_height: Option<f64>,
    pub overflow: f64,
    pub configured_width: serde_json::Value,
    pub configured_height: serde_json::Value,
    pub scale: f64,
    pub container_transform: String,
}
