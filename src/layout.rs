use crate::constants::P_NAMESPACE;
use crate::parse_xml::{find_sp_tree, is_element, parse_document, placeholder_marker, PlaceholderMarker};
use crate::Result;
use std::collections::HashMap;

/// Type assumed for a placeholder that declares no type and has no layout counterpart.
pub const DEFAULT_PLACEHOLDER_TYPE: &str = "Body";

/// Placeholder index to inherited placeholder type, built once per slide layout.
///
/// Immutable after construction, so a single map can be shared by every slide
/// (and every worker) that uses the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutPlaceholderMap {
    types: HashMap<u32, String>,
}

impl LayoutPlaceholderMap {
    /// Builds the map from raw layout XML.
    ///
    /// Only direct children of the layout's shape tree are considered (`<p:sp>` and
    /// `<p:graphicFrame>`), and only placeholders declaring both an index and a type.
    /// Duplicate indices resolve to the last one in document order.
    pub fn from_layout_xml(xml_data: &[u8]) -> Result<Self> {
        let xml_str = std::str::from_utf8(xml_data)?;
        let doc = parse_document(xml_str)?;

        let mut types = HashMap::new();
        let Some(sp_tree) = find_sp_tree(&doc) else {
            return Ok(Self { types });
        };

        for node in sp_tree
            .children()
            .filter(|n| is_element(n, P_NAMESPACE, "sp") || is_element(n, P_NAMESPACE, "graphicFrame"))
        {
            if let Some(PlaceholderMarker { index: Some(index), raw_type: Some(raw_type) }) = placeholder_marker(&node) {
                types.insert(index, placeholder_type_name(&raw_type));
            }
        }

        Ok(Self { types })
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.types.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Effective type of a slide placeholder: its own declared type, else the
    /// layout's type for its index, else [`DEFAULT_PLACEHOLDER_TYPE`].
    pub fn resolve(&self, marker: &PlaceholderMarker) -> String {
        if let Some(raw_type) = &marker.raw_type {
            return placeholder_type_name(raw_type);
        }

        marker
            .index
            .and_then(|index| self.get(index))
            .unwrap_or(DEFAULT_PLACEHOLDER_TYPE)
            .to_string()
    }
}

/// Maps a raw `<p:ph type>` token onto its schema enumeration name.
///
/// Tokens outside the known set are passed through with an upper-cased first letter.
pub fn placeholder_type_name(raw: &str) -> String {
    let known = match raw {
        "title" => "Title",
        "ctrTitle" => "CtrTitle",
        "subTitle" => "SubTitle",
        "body" => "Body",
        "dt" => "Date",
        "ftr" => "Footer",
        "sldNum" => "SlideNumber",
        "hdr" => "Header",
        "obj" => "Object",
        "chart" => "Chart",
        "tbl" => "Table",
        "clipArt" => "ClipArt",
        "dgm" => "Diagram",
        "media" => "Media",
        "sldImg" => "SlideImage",
        "pic" => "Picture",
        other => {
            let mut chars = other.chars();
            return match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => DEFAULT_PLACEHOLDER_TYPE.to_string(),
            };
        }
    };
    known.to_string()
}
