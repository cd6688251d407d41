use crate::constants::{CONTENT_TYPES_NAMESPACE, OCTET_STREAM};
use crate::parse_xml::parse_document;
use crate::Result;
use std::collections::HashMap;

/// Content types declared by the package's `[Content_Types].xml`.
///
/// Part-name overrides win over extension defaults. Both lookups are
/// case-insensitive, as part names are in the packaging conventions.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub fn parse(xml_data: &[u8]) -> Result<Self> {
        let xml_str = std::str::from_utf8(xml_data)?;
        let doc = parse_document(xml_str)?;

        let mut types = Self::default();
        for node in doc.root_element().children().filter(|n| {
            n.is_element() && n.tag_name().namespace() == Some(CONTENT_TYPES_NAMESPACE)
        }) {
            let Some(content_type) = node.attribute("ContentType") else {
                continue;
            };
            match node.tag_name().name() {
                "Default" => {
                    if let Some(ext) = node.attribute("Extension") {
                        types.defaults.insert(ext.to_ascii_lowercase(), content_type.to_string());
                    }
                }
                "Override" => {
                    if let Some(part) = node.attribute("PartName") {
                        let part = part.trim_start_matches('/').to_ascii_lowercase();
                        types.overrides.insert(part, content_type.to_string());
                    }
                }
                _ => {}
            }
        }

        Ok(types)
    }

    /// Returns the content type of a part given by its zip member name.
    pub fn content_type(&self, part: &str) -> &str {
        let key = part.trim_start_matches('/').to_ascii_lowercase();
        if let Some(content_type) = self.overrides.get(&key) {
            return content_type;
        }

        key.rsplit_once('.')
            .and_then(|(_, ext)| self.defaults.get(ext))
            .map(String::as_str)
            .unwrap_or(OCTET_STREAM)
    }
}
