use crate::chart::detect_chart_type;
use crate::container::PptxContainer;
use crate::layout::LayoutPlaceholderMap;
use crate::media::MediaWriter;
use crate::parse_rels::Relationships;
use crate::parse_xml::{parse_slide_xml, ShapeContent, ShapeElement};
use crate::types::{ChartInfo, ChartType, ImageInfo, ShapeReport, SlideReport};
use crate::{Error, Result};

/// Runs the full walk-and-extract pipeline for one slide.
///
/// The slide part itself must be readable and well-formed, otherwise the error
/// is returned. Chart, image and relationship failures only blank the payload
/// of the shape they belong to.
pub(crate) fn extract_slide(
    container: &mut PptxContainer,
    slide_number: usize,
    slide_path: &str,
    layout: &LayoutPlaceholderMap,
    media: Option<&MediaWriter>,
) -> Result<SlideReport> {
    let xml = container.read_file_from_archive(slide_path)?;
    let elements = parse_slide_xml(&xml)?;

    let rels = container.relationships(slide_path).unwrap_or_else(|e| {
        tracing::warn!(slide = slide_number, error = %e, "Slide relationships unreadable");
        Relationships::empty(slide_path)
    });

    let mut report = SlideReport { slide_number, ..Default::default() };
    for element in elements {
        let ShapeElement { content, placeholder, bounds } = element;

        let mut shape = ShapeReport::new(content.kind());
        shape.bounds = bounds;
        match content {
            ShapeContent::Text(text) => shape.text = text,
            ShapeContent::Table(table) => shape.table = Some(table),
            ShapeContent::Chart { rel_id } => {
                let chart_type = chart_type(container, &rels, rel_id.as_deref());
                shape.chart = Some(ChartInfo { chart_type: degrade(chart_type, slide_number, "chart") });
            }
            ShapeContent::Picture { embed } => {
                if let Some(writer) = media {
                    let image = image_info(container, &rels, embed.as_deref(), writer, slide_number);
                    shape.image = degrade(image, slide_number, "image");
                }
            }
            ShapeContent::GraphicFrame => {}
        }

        match placeholder {
            Some(marker) => {
                shape.index = marker.index;
                shape.placeholder_type = Some(layout.resolve(&marker));
                report.placeholders.push(shape);
            }
            None => report.other_shapes.push(shape),
        }
    }

    report.title = derive_title(&report.placeholders);
    tracing::debug!(
        slide = slide_number,
        part = slide_path,
        placeholders = report.placeholders.len(),
        other_shapes = report.other_shapes.len(),
        "Extracted slide"
    );
    Ok(report)
}

/// Text of the first placeholder typed `Title` or `CtrTitle` (case-insensitive)
/// that has non-blank text.
pub fn derive_title(placeholders: &[ShapeReport]) -> Option<String> {
    placeholders
        .iter()
        .filter(|shape| {
            shape
                .placeholder_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("Title") || t.eq_ignore_ascii_case("CtrTitle"))
        })
        .find_map(|shape| shape.text.as_deref().filter(|text| !text.trim().is_empty()))
        .map(str::to_string)
}

fn degrade<T>(result: Result<T>, slide_number: usize, feature: &str) -> Option<T> {
    result
        .map_err(|e| tracing::warn!(slide = slide_number, feature, error = %e, "Payload unavailable"))
        .ok()
}

fn chart_type(container: &mut PptxContainer, rels: &Relationships, rel_id: Option<&str>) -> Result<ChartType> {
    let part = resolve(rels, rel_id, "chart reference has no relationship id")?;
    let xml = container.read_file_from_archive(&part)?;
    detect_chart_type(&xml)
}

fn image_info(
    container: &mut PptxContainer,
    rels: &Relationships,
    embed: Option<&str>,
    writer: &MediaWriter,
    slide_number: usize,
) -> Result<ImageInfo> {
    let part = resolve(rels, embed, "picture has no embedded blip")?;
    let bytes = container.read_file_from_archive(&part)?;
    let content_type = container.content_type(&part).to_string();
    writer.store(slide_number, &content_type, &bytes)
}

fn resolve(rels: &Relationships, rel_id: Option<&str>, missing: &'static str) -> Result<String> {
    rels.require(rel_id.ok_or(Error::ParseError(missing))?)
}
