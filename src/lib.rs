mod chart;
mod constants;
mod container;
mod content_types;
mod layout;
mod media;
mod parallel;
mod parse_rels;
mod parse_xml;
mod parser_config;
mod slide;
mod types;

pub use chart::detect_chart_type;
pub use container::{PptxContainer, SlideIterator};
pub use layout::{placeholder_type_name, LayoutPlaceholderMap};
pub use media::{image_extension, MediaRegistry, MediaWriter};
pub use parallel::parse_all_parallel;
pub use parse_xml::{parse_slide_xml, PlaceholderMarker, ShapeContent, ShapeElement};
pub use parser_config::{ImageNaming, ParserConfig, ParserConfigBuilder};
pub use slide::derive_title;
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open container {path}: {reason}")]
    ContainerOpen { path: String, reason: String },

    #[error("Invalid presentation: {0}")]
    InvalidPresentation(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Relationship {id} not found for {part}")]
    RelationshipNotFound { part: String, id: String },

    #[error("Image {0} could not be written earlier in this run")]
    MediaWrite(String),

    #[error("Parse error: {0}")]
    ParseError(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
