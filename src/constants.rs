pub const P_NAMESPACE: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const A_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const C_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
pub const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const CONTENT_TYPES_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const SLIDE_LAYOUT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

pub const PACKAGE_RELS_PATH: &str = "_rels/.rels";
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
pub const DEFAULT_PRESENTATION_PATH: &str = "ppt/presentation.xml";

pub const OCTET_STREAM: &str = "application/octet-stream";
