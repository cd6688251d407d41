use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Structural inventory of a whole presentation.
///
/// `slides[i].slide_number == i + 1` and `slide_count == slides.len()` hold for
/// every report produced by this crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckReport {
    pub file: String,
    pub slide_count: usize,
    pub slides: Vec<SlideReport>,
}

impl DeckReport {
    pub fn new(file: String, slides: Vec<SlideReport>) -> Self {
        Self { file, slide_count: slides.len(), slides }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report as pretty-printed JSON to `path`, replacing any existing file.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideReport {
    pub slide_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub placeholders: Vec<ShapeReport>,
    pub other_shapes: Vec<ShapeReport>,
    /// Only set by the parallel orchestrator when extracting this slide failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SlideReport {
    pub fn failed(slide_number: usize, error: String) -> Self {
        Self { slide_number, error: Some(error), ..Default::default() }
    }
}

/// One classified shape. Placeholders additionally carry `index` and `placeholder_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeReport {
    pub shape_kind: ShapeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_type: Option<String>,
}

impl ShapeReport {
    pub fn new(shape_kind: ShapeKind) -> Self {
        Self {
            shape_kind,
            text: None,
            table: None,
            chart: None,
            image: None,
            bounds: None,
            index: None,
            placeholder_type: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeKind {
    Shape,
    Table,
    Chart,
    Picture,
    /// A graphic frame holding neither a table nor a chart reference.
    GraphicFrame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub rows: usize,
    pub columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// `chart_type` is `None` when the chart part could not be resolved or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartType {
    Pie,
    Column,
    Bar,
    Line,
    Scatter,
    Area,
    Doughnut,
    Bubble,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub content_type: String,
    pub size: usize,
    /// Path of the side-car file, relative to the parent of the media directory.
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

/// Shape rectangle in EMU (914400 per inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}
