#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_LAYOUT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_CHART: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
const REL_DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart""#;

/// One slide of a synthesized package: its shape-tree body and relationships.
#[derive(Debug, Clone, Default)]
pub struct SlideSpec {
    shapes: String,
    layout: Option<usize>,
    rels: Vec<(String, &'static str, String)>,
    raw_xml: Option<String>,
}

impl SlideSpec {
    pub fn new(shapes: impl Into<String>) -> Self {
        Self { shapes: shapes.into(), ..Default::default() }
    }

    /// Replaces the whole slide part, e.g. with malformed XML.
    pub fn raw(xml: impl Into<String>) -> Self {
        Self { raw_xml: Some(xml.into()), ..Default::default() }
    }

    /// Links the slide to the 1-based layout number.
    pub fn layout(mut self, layout: usize) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn image(mut self, id: &str, target: &str) -> Self {
        self.rels.push((id.to_string(), REL_IMAGE, target.to_string()));
        self
    }

    pub fn chart(mut self, id: &str, target: &str) -> Self {
        self.rels.push((id.to_string(), REL_CHART, target.to_string()));
        self
    }
}

/// Writes a minimal but well-formed `.pptx` package.
#[derive(Debug, Default)]
pub struct DeckBuilder {
    slides: Vec<SlideSpec>,
    layouts: Vec<String>,
    parts: Vec<(String, Vec<u8>)>,
    without_slide_list: bool,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slide(mut self, slide: SlideSpec) -> Self {
        self.slides.push(slide);
        self
    }

    /// Adds a layout whose shape tree holds `shapes`. Layouts are numbered from 1.
    pub fn layout(mut self, shapes: impl Into<String>) -> Self {
        self.layouts.push(shapes.into());
        self
    }

    pub fn part(mut self, name: &str, data: impl Into<Vec<u8>>) -> Self {
        self.parts.push((name.to_string(), data.into()));
        self
    }

    pub fn without_slide_list(mut self) -> Self {
        self.without_slide_list = true;
        self
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        let mut put = |name: &str, data: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        };

        put("[Content_Types].xml", CONTENT_TYPES.as_bytes());
        put("_rels/.rels", rels(&[("rId1".into(), REL_DOCUMENT, "ppt/presentation.xml".into())]).as_bytes());

        let sld_ids: String = (1..=self.slides.len())
            .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n))
            .collect();
        let sld_id_lst = if self.without_slide_list { String::new() } else { format!("<p:sldIdLst>{}</p:sldIdLst>", sld_ids) };
        put(
            "ppt/presentation.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}>{}<p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#, NAMESPACES, sld_id_lst).as_bytes(),
        );
        let presentation_rels: Vec<_> = (1..=self.slides.len())
            .map(|n| (format!("rId{}", n), REL_SLIDE, format!("slides/slide{}.xml", n)))
            .collect();
        put("ppt/_rels/presentation.xml.rels", rels(&presentation_rels).as_bytes());

        for (index, layout) in self.layouts.iter().enumerate() {
            let xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {}><p:cSld><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{}</p:spTree></p:cSld></p:sldLayout>"#,
                NAMESPACES, layout
            );
            put(&format!("ppt/slideLayouts/slideLayout{}.xml", index + 1), xml.as_bytes());
        }

        for (index, slide) in self.slides.iter().enumerate() {
            let number = index + 1;
            let xml = slide.raw_xml.clone().unwrap_or_else(|| slide_xml(&slide.shapes));
            put(&format!("ppt/slides/slide{}.xml", number), xml.as_bytes());

            let mut slide_rels = slide.rels.clone();
            if let Some(layout) = slide.layout {
                slide_rels.push(("rIdLayout".into(), REL_LAYOUT, format!("../slideLayouts/slideLayout{}.xml", layout)));
            }
            put(&format!("ppt/slides/_rels/slide{}.xml.rels", number), rels(&slide_rels).as_bytes());
        }

        for (name, data) in &self.parts {
            put(name, data);
        }

        zip.finish().unwrap();
        path.to_path_buf()
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Default Extension="jpeg" ContentType="image/jpeg"/>
<Default Extension="emf" ContentType="image/x-emf"/>
<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#;

fn rels(entries: &[(String, &str, String)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, rel_type, target)| format!(r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#, id, rel_type, target))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}

pub fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
        NAMESPACES, shapes
    )
}

fn ph_element(ph: Option<(&str, Option<u32>)>) -> String {
    match ph {
        None => String::new(),
        Some((ph_type, idx)) => {
            let type_attr = if ph_type.is_empty() { String::new() } else { format!(r#" type="{}""#, ph_type) };
            let idx_attr = idx.map(|i| format!(r#" idx="{}""#, i)).unwrap_or_default();
            format!("<p:ph{}{}/>", type_attr, idx_attr)
        }
    }
}

/// A text shape. `ph` is `(raw type or "", idx)`.
pub fn sp(id: u32, ph: Option<(&str, Option<u32>)>, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", p)).collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="{id}00" y="200"/><a:ext cx="3000" cy="400"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{body}</p:txBody></p:sp>"#,
        id = id,
        ph = ph_element(ph),
        body = body
    )
}

pub fn pic(id: u32, embed: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{embed}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr></p:pic>"#,
        id = id,
        embed = embed
    )
}

pub fn chart_frame(id: u32, ph: Option<(&str, Option<u32>)>, rel_id: &str) -> String {
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="Chart {id}"/><p:cNvGraphicFramePr/><p:nvPr>{ph}</p:nvPr></p:nvGraphicFramePr><p:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart r:id="{rel_id}"/></a:graphicData></a:graphic></p:graphicFrame>"#,
        id = id,
        ph = ph_element(ph),
        rel_id = rel_id
    )
}

pub fn table_frame(id: u32, rows: &[&[&str]]) -> String {
    let columns = rows.first().map(|r| r.len()).unwrap_or(0);
    let grid: String = (0..columns).map(|_| r#"<a:gridCol w="100"/>"#).collect();
    let body: String = rows
        .iter()
        .map(|cells| {
            let cells: String = cells
                .iter()
                .map(|c| format!("<a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>", c))
                .collect();
            format!(r#"<a:tr h="100">{}</a:tr>"#, cells)
        })
        .collect();
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="Table {id}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="0" y="0"/><a:ext cx="10" cy="10"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblGrid>{grid}</a:tblGrid>{body}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        id = id,
        grid = grid,
        body = body
    )
}

pub fn group(members: &[String]) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="99" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
        members.concat()
    )
}

pub fn chart_part(plot_area: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><c:chartSpace {}><c:chart><c:plotArea><c:layout/>{}</c:plotArea></c:chart></c:chartSpace>"#,
        NAMESPACES, plot_area
    )
}

/// A layout placeholder declaring both type and index.
pub fn layout_ph(id: u32, ph_type: &str, idx: u32) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Layout {id}"/><p:cNvSpPr/><p:nvPr><p:ph type="{ph_type}" idx="{idx}"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#,
        id = id,
        ph_type = ph_type,
        idx = idx
    )
}
