use crate::parse_xml::parse_document;
use crate::{Error, Result};

/// A single entry of a relationships (`.rels`) part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// All relationships declared by one source part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    source: String,
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn empty(source: &str) -> Self {
        Self { source: source.to_string(), rels: Vec::new() }
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.id == id)
    }

    pub fn of_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.rels.iter().filter(move |rel| rel.rel_type == rel_type)
    }

    /// Resolves a relationship id to the zip member name of its target part.
    ///
    /// External relationships never point into the package and resolve to `None`.
    pub fn resolve(&self, id: &str) -> Option<String> {
        self.get(id)
            .filter(|rel| !rel.external)
            .map(|rel| resolve_target(&self.source, &rel.target))
    }

    /// Like [`Relationships::resolve`], but a missing or external id is an
    /// [`Error::RelationshipNotFound`].
    pub fn require(&self, id: &str) -> Result<String> {
        self.resolve(id)
            .ok_or_else(|| Error::RelationshipNotFound { part: self.source.clone(), id: id.to_string() })
    }

    /// Resolves every internal relationship of the given type, in document order.
    pub fn resolve_all(&self, rel_type: &str) -> Vec<String> {
        self.of_type(rel_type)
            .filter(|rel| !rel.external)
            .map(|rel| resolve_target(&self.source, &rel.target))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

/// Parses relationship (`.rels`) XML data belonging to the part `source`.
///
/// # Errors
///
/// An error is returned if the data is not valid UTF-8 or not well-formed XML.
pub fn parse_rels(source: &str, xml_data: &[u8]) -> Result<Relationships> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = parse_document(xml_str)?;
    let root = doc.root_element();

    let mut rels = Vec::new();
    for rel in root.children().filter(|n| n.is_element() && n.tag_name().name() == "Relationship") {
        let (Some(id), Some(rel_type), Some(target)) =
            (rel.attribute("Id"), rel.attribute("Type"), rel.attribute("Target"))
        else {
            continue;
        };

        rels.push(Relationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: rel.attribute("TargetMode") == Some("External"),
        });
    }

    Ok(Relationships { source: source.to_string(), rels })
}

/// Constructs the path of the relationships part for a given part.
///
/// `ppt/slides/slide1.xml` becomes `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolves a relationship target against the directory of its source part and
/// normalizes `.` and `..` segments. Absolute targets are taken from the package root.
pub fn resolve_target(source: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        match source.rsplit_once('/') {
            Some((dir, _)) => format!("{}/{}", dir, target),
            None => target.to_string(),
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
