use crate::constants::{A_NAMESPACE, C_NAMESPACE, P_NAMESPACE, RELS_NAMESPACE};
use crate::types::{Bounds, ShapeKind, TableInfo};
use crate::{Error, Result};
use roxmltree::{Document, Node};

const CELL_DELIMITER: &str = " | ";

/// Placeholder marker (`<p:ph>`) as declared in a shape's non-visual properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMarker {
    pub index: Option<u32>,
    /// Raw `type` token, e.g. `ctrTitle` or `sldNum`.
    pub raw_type: Option<String>,
}

/// Content of a classified shape, one variant per shape kind.
///
/// Chart and picture payloads live in other package parts, so only their
/// relationship ids are captured here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeContent {
    Text(Option<String>),
    Table(TableInfo),
    Chart { rel_id: Option<String> },
    Picture { embed: Option<String> },
    GraphicFrame,
}

impl ShapeContent {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeContent::Text(_) => ShapeKind::Shape,
            ShapeContent::Table(_) => ShapeKind::Table,
            ShapeContent::Chart { .. } => ShapeKind::Chart,
            ShapeContent::Picture { .. } => ShapeKind::Picture,
            ShapeContent::GraphicFrame => ShapeKind::GraphicFrame,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeElement {
    pub content: ShapeContent,
    pub placeholder: Option<PlaceholderMarker>,
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeClass {
    Shape,
    Table,
    Chart,
    Picture,
    GraphicFrame,
    Group,
    Ignored,
}

/// Deepest element nesting accepted before handing a document to roxmltree,
/// whose parser recurses once per level.
pub(crate) const MAX_NESTING_DEPTH: usize = 256;

/// Parses XML text, tolerating a leading byte order mark.
///
/// Documents nested deeper than [`MAX_NESTING_DEPTH`] are rejected with
/// [`Error::ParseError`] before parsing starts.
pub(crate) fn parse_document(xml: &str) -> Result<Document<'_>> {
    let xml = xml.trim_start_matches('\u{feff}');
    if nesting_depth(xml.as_bytes()) > MAX_NESTING_DEPTH {
        return Err(Error::ParseError("XML element nesting is too deep"));
    }
    Ok(Document::parse(xml)?)
}

/// Maximum element depth of raw XML, found with a flat byte scan.
///
/// Comments, CDATA sections, processing instructions and declarations are
/// skipped, and quoted attribute values may contain `>`. Malformed input is
/// left for the real parser to reject.
fn nesting_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut pos = 0;

    while let Some(offset) = bytes[pos..].iter().position(|&b| b == b'<') {
        let start = pos + offset;
        let rest = &bytes[start..];
        pos = if rest.starts_with(b"<!--") {
            skip_past(bytes, start, b"-->")
        } else if rest.starts_with(b"<![CDATA[") {
            skip_past(bytes, start, b"]]>")
        } else if rest.starts_with(b"<?") {
            skip_past(bytes, start, b"?>")
        } else if rest.starts_with(b"<!") {
            skip_past(bytes, start, b">")
        } else if rest.starts_with(b"</") {
            depth = depth.saturating_sub(1);
            skip_past(bytes, start, b">")
        } else {
            let end = tag_end(bytes, start);
            if bytes[end - 1] == b'/' {
                deepest = deepest.max(depth + 1);
            } else {
                depth += 1;
                deepest = deepest.max(depth);
            }
            (end + 1).min(bytes.len())
        };
    }

    deepest
}

/// Index just past the first `pattern` at or after `from`, or the end of input.
fn skip_past(bytes: &[u8], from: usize, pattern: &[u8]) -> usize {
    bytes[from..]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map_or(bytes.len(), |found| from + found + pattern.len())
}

/// Index of the `>` closing the start tag at `start`, honoring quoted attribute values.
fn tag_end(bytes: &[u8], start: usize) -> usize {
    let mut quote = None;
    for (index, &byte) in bytes.iter().enumerate().skip(start + 1) {
        match (quote, byte) {
            (Some(open), b) if b == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return index,
            (None, _) => {}
        }
    }
    bytes.len()
}

pub(crate) fn is_element(node: &Node, namespace: &str, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(namespace)
}

fn child<'a, 'input>(node: &Node<'a, 'input>, namespace: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_element(n, namespace, name))
}

/// Locates `<p:cSld>/<p:spTree>` below the root of a slide or layout document.
pub(crate) fn find_sp_tree<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    let c_sld = child(&doc.root_element(), P_NAMESPACE, "cSld")?;
    child(&c_sld, P_NAMESPACE, "spTree")
}

/// Parses raw XML slide data and walks its shape tree.
///
/// Group shapes are flattened: their members appear in place, in document
/// order, at any nesting depth. Nodes that are neither shapes, graphic frames
/// nor pictures (connectors, content parts, ...) are skipped.
///
/// # Errors
///
/// Parsing fails if the data isn't valid UTF-8, the XML is malformed, or the
/// `<p:cSld>`/`<p:spTree>` elements are missing.
pub fn parse_slide_xml(xml_data: &[u8]) -> Result<Vec<ShapeElement>> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = parse_document(xml_str)?;
    let sp_tree = find_sp_tree(&doc).ok_or(Error::ParseError("No <p:cSld>/<p:spTree> found in slide"))?;
    Ok(walk_shape_tree(sp_tree))
}

/// Walks a shape tree with an explicit stack so nesting depth never grows the call stack.
fn walk_shape_tree(sp_tree: Node) -> Vec<ShapeElement> {
    let mut elements = Vec::new();
    let mut stack: Vec<Node> = sp_tree.children().filter(|n| n.is_element()).collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        match classify(&node) {
            NodeClass::Group => {
                let members: Vec<Node> = node.children().filter(|n| n.is_element()).collect();
                stack.extend(members.into_iter().rev());
            }
            NodeClass::Ignored => {}
            class => elements.push(extract(class, &node)),
        }
    }

    elements
}

fn classify(node: &Node) -> NodeClass {
    if node.tag_name().namespace() != Some(P_NAMESPACE) {
        return NodeClass::Ignored;
    }

    match node.tag_name().name() {
        "sp" => NodeClass::Shape,
        "pic" => NodeClass::Picture,
        "grpSp" => NodeClass::Group,
        "graphicFrame" => {
            if node.descendants().any(|n| is_element(&n, A_NAMESPACE, "tbl")) {
                NodeClass::Table
            } else if node.descendants().any(|n| is_element(&n, C_NAMESPACE, "chart")) {
                NodeClass::Chart
            } else {
                NodeClass::GraphicFrame
            }
        }
        _ => NodeClass::Ignored,
    }
}

fn extract(class: NodeClass, node: &Node) -> ShapeElement {
    let content = match class {
        NodeClass::Shape => ShapeContent::Text(child(node, P_NAMESPACE, "txBody").and_then(|tx| text_body_text(&tx))),
        NodeClass::Table => ShapeContent::Table(
            node.descendants()
                .find(|n| is_element(n, A_NAMESPACE, "tbl"))
                .map(|tbl| parse_table(&tbl))
                .unwrap_or(TableInfo { rows: 0, columns: 0, preview: None }),
        ),
        NodeClass::Chart => ShapeContent::Chart {
            rel_id: node
                .descendants()
                .find(|n| is_element(n, C_NAMESPACE, "chart"))
                .and_then(|chart| chart.attribute((RELS_NAMESPACE, "id")))
                .map(str::to_string),
        },
        NodeClass::Picture => ShapeContent::Picture { embed: blip_embed(node) },
        NodeClass::GraphicFrame | NodeClass::Group | NodeClass::Ignored => ShapeContent::GraphicFrame,
    };

    ShapeElement { content, placeholder: placeholder_marker(node), bounds: parse_bounds(node) }
}

/// Reads `<p:ph>` from the shape's `nv*Pr/p:nvPr`, whichever non-visual
/// container the node kind uses (`nvSpPr`, `nvPicPr`, `nvGraphicFramePr`).
pub(crate) fn placeholder_marker(node: &Node) -> Option<PlaceholderMarker> {
    let nv_container = node
        .children()
        .find(|n| n.is_element() && n.tag_name().namespace() == Some(P_NAMESPACE) && n.tag_name().name().starts_with("nv"))?;
    let nv_pr = child(&nv_container, P_NAMESPACE, "nvPr")?;
    let ph = child(&nv_pr, P_NAMESPACE, "ph")?;

    Some(PlaceholderMarker {
        index: ph.attribute("idx").and_then(|idx| idx.parse::<u32>().ok()),
        raw_type: ph.attribute("type").map(str::to_string),
    })
}

/// Concatenates all text of each paragraph (`<a:p>`), joins paragraphs with a
/// newline and trims. Blank text is reported as `None`.
pub(crate) fn text_body_text(tx_body: &Node) -> Option<String> {
    let paragraphs: Vec<String> = tx_body
        .children()
        .filter(|n| is_element(n, A_NAMESPACE, "p"))
        .map(|p| paragraph_text(&p))
        .collect();

    non_blank(paragraphs.join("\n"))
}

fn paragraph_text(p_node: &Node) -> String {
    p_node
        .descendants()
        .filter(|n| is_element(n, A_NAMESPACE, "t"))
        .filter_map(|t| t.text())
        .collect()
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses a table node (`<a:tbl>`) into its dimensions and a text preview.
///
/// Cells are joined with `" | "`, rows with a newline.
fn parse_table(tbl_node: &Node) -> TableInfo {
    let rows: Vec<Vec<String>> = tbl_node
        .children()
        .filter(|n| is_element(n, A_NAMESPACE, "tr"))
        .map(|tr| {
            tr.children()
                .filter(|n| is_element(n, A_NAMESPACE, "tc"))
                .map(|tc| child(&tc, A_NAMESPACE, "txBody").and_then(|tx| text_body_text(&tx)).unwrap_or_default())
                .collect()
        })
        .collect();

    let grid_columns = child(tbl_node, A_NAMESPACE, "tblGrid")
        .map(|grid| grid.children().filter(|n| is_element(n, A_NAMESPACE, "gridCol")).count());
    let columns = grid_columns.unwrap_or_else(|| rows.iter().map(Vec::len).max().unwrap_or(0));

    let preview = rows.iter().map(|cells| cells.join(CELL_DELIMITER)).collect::<Vec<_>>().join("\n");

    TableInfo { rows: rows.len(), columns, preview: non_blank(preview) }
}

fn blip_embed(pic_node: &Node) -> Option<String> {
    pic_node
        .descendants()
        .find(|n| is_element(n, A_NAMESPACE, "blip"))
        .and_then(|blip| blip.attribute((RELS_NAMESPACE, "embed")))
        .map(str::to_string)
}

/// Reads the shape's transform: `p:spPr/a:xfrm` for shapes and pictures,
/// `p:xfrm` for graphic frames. Missing or incomplete transforms yield `None`.
fn parse_bounds(node: &Node) -> Option<Bounds> {
    let xfrm = child(node, P_NAMESPACE, "xfrm")
        .or_else(|| child(node, P_NAMESPACE, "spPr").and_then(|sp_pr| child(&sp_pr, A_NAMESPACE, "xfrm")))?;
    let off = child(&xfrm, A_NAMESPACE, "off")?;
    let ext = child(&xfrm, A_NAMESPACE, "ext")?;

    Some(Bounds {
        x: int_attr(&off, "x")?,
        y: int_attr(&off, "y")?,
        width: int_attr(&ext, "cx")?,
        height: int_attr(&ext, "cy")?,
    })
}

fn int_attr(node: &Node, name: &str) -> Option<i64> {
    node.attribute(name).and_then(|v| v.parse::<i64>().ok())
}
