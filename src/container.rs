use crate::constants::{
    CONTENT_TYPES_PATH, DEFAULT_PRESENTATION_PATH, OFFICE_DOCUMENT_REL, PACKAGE_RELS_PATH, P_NAMESPACE, RELS_NAMESPACE,
    SLIDE_LAYOUT_REL, SLIDE_REL,
};
use crate::content_types::ContentTypes;
use crate::layout::LayoutPlaceholderMap;
use crate::media::{MediaRegistry, MediaWriter};
use crate::parse_rels::{parse_rels, rels_path_for, Relationships};
use crate::parse_xml::{is_element, parse_document};
use crate::parser_config::ParserConfig;
use crate::slide::extract_slide;
use crate::types::{DeckReport, SlideReport};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only handle on a PowerPoint (pptx) package.
///
/// `PptxContainer` resolves the presentation's slides in document order and
/// gives access to every part of the package through relationship ids. One
/// handle owns one open zip archive; concurrent readers open their own handle.
pub struct PptxContainer {
    pub config: ParserConfig,
    archive: zip::ZipArchive<File>,
    path: PathBuf,
    content_types: ContentTypes,
    pub presentation_path: String,
    pub slide_paths: Vec<String>,
    layout_cache: HashMap<String, Arc<LayoutPlaceholderMap>>,
}

impl PptxContainer {
    /// Opens a PowerPoint pptx file and resolves its slide list.
    ///
    /// # Errors
    ///
    /// - [`Error::ContainerOpen`] if the file is missing, is not a zip archive or has no presentation part.
    /// - [`Error::InvalidPresentation`] if the presentation part is malformed or lists no slides.
    pub fn open(path: &Path, config: ParserConfig) -> Result<Self> {
        let open_error = |reason: String| Error::ContainerOpen { path: path.display().to_string(), reason };

        let file = File::open(path).map_err(|e| open_error(e.to_string()))?;
        let archive = zip::ZipArchive::new(file).map_err(|e| open_error(e.to_string()))?;

        let mut container = Self {
            config,
            archive,
            path: path.to_path_buf(),
            content_types: ContentTypes::default(),
            presentation_path: DEFAULT_PRESENTATION_PATH.to_string(),
            slide_paths: Vec::new(),
            layout_cache: HashMap::new(),
        };

        match container.read_file_from_archive(CONTENT_TYPES_PATH) {
            Ok(data) => container.content_types = ContentTypes::parse(&data).map_err(|e| open_error(e.to_string()))?,
            Err(_) => tracing::warn!(path = %path.display(), "Package has no content types part"),
        }

        let package_rels = container.relationships("").map_err(|e| open_error(e.to_string()))?;
        let presentation_path = package_rels
            .resolve_all(OFFICE_DOCUMENT_REL)
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_PRESENTATION_PATH.to_string());

        let presentation_xml = container
            .read_file_from_archive(&presentation_path)
            .map_err(|e| open_error(format!("missing presentation part: {}", e)))?;
        let presentation_rels = container
            .relationships(&presentation_path)
            .map_err(|e| Error::InvalidPresentation(e.to_string()))?;
        container.slide_paths = slide_list(&presentation_xml, &presentation_rels)?;
        container.presentation_path = presentation_path;

        tracing::debug!(
            path = %path.display(),
            slides = container.slide_paths.len(),
            relationships = presentation_rels.len(),
            "Opened presentation container"
        );
        Ok(container)
    }

    /// File name of the opened package, as reported in [`DeckReport::file`].
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn slide_count(&self) -> usize {
        self.slide_paths.len()
    }

    /// Extracts every slide sequentially.
    ///
    /// Any slide failure aborts the whole run. Layout maps are built lazily the
    /// first time a slide needs them.
    pub fn parse_all(&mut self) -> Result<DeckReport> {
        tracing::info!(file = %self.file_name(), slides = self.slide_count(), "Extracting presentation inventory");
        let slides = self.iter_slides().collect::<Result<Vec<_>>>()?;
        Ok(DeckReport::new(self.file_name(), slides))
    }

    pub fn iter_slides(&mut self) -> SlideIterator<'_> {
        SlideIterator::new(self)
    }

    /// Extracts a single slide by its 1-based number.
    ///
    /// Returns `Ok(None)` if the number is out of range. Images are written
    /// with a fresh dedup registry, so content-hash naming only dedups within this slide.
    pub fn load_slide(&mut self, slide_number: usize) -> Result<Option<SlideReport>> {
        let Some(slide_path) = slide_number.checked_sub(1).and_then(|i| self.slide_paths.get(i)).cloned() else {
            return Ok(None);
        };
        let registry = MediaRegistry::new();
        let media_dir = self.config.media_dir.clone();
        self.load_slide_with(slide_number, &slide_path, &media_dir, &registry).map(Some)
    }

    fn load_slide_with(
        &mut self,
        slide_number: usize,
        slide_path: &str,
        media_dir: &Path,
        registry: &MediaRegistry,
    ) -> Result<SlideReport> {
        let layout = match self.layout_path_for(slide_path) {
            Some(layout_path) => self.cached_layout_map(&layout_path),
            None => Arc::new(LayoutPlaceholderMap::default()),
        };

        let writer = MediaWriter::new(media_dir, self.config.naming(false), self.config.embed_images, registry);
        let media = self.config.extract_images.then_some(&writer);
        extract_slide(self, slide_number, slide_path, &layout, media)
    }

    fn cached_layout_map(&mut self, layout_path: &str) -> Arc<LayoutPlaceholderMap> {
        if let Some(map) = self.layout_cache.get(layout_path) {
            return Arc::clone(map);
        }
        let map = Arc::new(self.build_layout_map(layout_path));
        self.layout_cache.insert(layout_path.to_string(), Arc::clone(&map));
        map
    }

    /// Builds the placeholder map of one layout part.
    ///
    /// An unreadable or malformed layout yields an empty map, so its slides
    /// fall back to declared or default placeholder types.
    pub fn build_layout_map(&mut self, layout_path: &str) -> LayoutPlaceholderMap {
        let map = self
            .read_file_from_archive(layout_path)
            .and_then(|data| LayoutPlaceholderMap::from_layout_xml(&data));
        match map {
            Ok(map) => {
                tracing::debug!(layout = layout_path, placeholders = map.len(), "Built layout placeholder map");
                map
            }
            Err(e) => {
                tracing::warn!(layout = layout_path, error = %e, "Layout unreadable, using empty placeholder map");
                LayoutPlaceholderMap::default()
            }
        }
    }

    /// Resolves the layout part a slide is based on, if any.
    pub fn layout_path_for(&mut self, slide_path: &str) -> Option<String> {
        match self.related_parts(slide_path, SLIDE_LAYOUT_REL) {
            Ok(layouts) => layouts.into_iter().next(),
            Err(e) => {
                tracing::warn!(part = slide_path, error = %e, "Slide relationships unreadable, no layout");
                None
            }
        }
    }

    /// Reads a file from the PPTX archive by its internal path.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - The content of the file as a byte vector.
    /// * `Err(Error::PartNotFound)` - If the archive has no such member.
    pub fn read_file_from_archive(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => Error::PartNotFound(path.to_string()),
            other => Error::Zip(other),
        })?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }

    /// Loads the relationships declared by `part`. A part without a `.rels`
    /// member simply has no relationships. Pass `""` for the package root.
    pub fn relationships(&mut self, part: &str) -> Result<Relationships> {
        let rels_path = if part.is_empty() { PACKAGE_RELS_PATH.to_string() } else { rels_path_for(part) };
        if !self.has_part(&rels_path) {
            return Ok(Relationships::empty(part));
        }
        let data = self.read_file_from_archive(&rels_path)?;
        parse_rels(part, &data)
    }

    /// All internal parts `part` relates to with the given relationship type.
    pub fn related_parts(&mut self, part: &str, rel_type: &str) -> Result<Vec<String>> {
        Ok(self.relationships(part)?.resolve_all(rel_type))
    }

    pub fn content_type(&self, part: &str) -> &str {
        self.content_types.content_type(part)
    }
}

/// Resolves `<p:sldIdLst>` of the presentation part into slide part names, in order.
fn slide_list(presentation_xml: &[u8], presentation_rels: &Relationships) -> Result<Vec<String>> {
    let invalid = |reason: &str| Error::InvalidPresentation(reason.to_string());

    let xml_str = std::str::from_utf8(presentation_xml).map_err(|_| invalid("presentation part is not UTF-8"))?;
    let doc = parse_document(xml_str).map_err(|e| invalid(&e.to_string()))?;
    let root = doc.root_element();
    if !is_element(&root, P_NAMESPACE, "presentation") {
        return Err(invalid("root element is not <p:presentation>"));
    }

    let sld_id_lst = root
        .children()
        .find(|n| is_element(n, P_NAMESPACE, "sldIdLst"))
        .ok_or_else(|| invalid("no <p:sldIdLst> found"))?;

    let mut slide_paths = Vec::new();
    for sld_id in sld_id_lst.children().filter(|n| is_element(n, P_NAMESPACE, "sldId")) {
        let Some(r_id) = sld_id.attribute((RELS_NAMESPACE, "id")) else {
            continue;
        };
        match presentation_rels.get(r_id).filter(|rel| rel.rel_type == SLIDE_REL) {
            Some(_) => slide_paths.extend(presentation_rels.resolve(r_id)),
            None => tracing::warn!(id = r_id, "Slide id does not resolve to a slide part, skipping"),
        }
    }

    Ok(slide_paths)
}

/// An iterator for streaming slide reports from a PPTX file.
///
/// This iterator processes slides one by one in presentation order, which is
/// more memory-efficient than collecting a [`DeckReport`]. All slides of one
/// iterator share a single image dedup registry.
///
/// # Example
///
/// ```no_run
/// use pptx_inventory::{ParserConfig, PptxContainer};
/// use std::path::Path;
///
/// let mut container = PptxContainer::open(Path::new("deck.pptx"), ParserConfig::default())?;
/// for slide in container.iter_slides() {
///     let slide = slide?;
///     println!("{}: {:?}", slide.slide_number, slide.title);
/// }
/// # Ok::<(), pptx_inventory::Error>(())
/// ```
pub struct SlideIterator<'a> {
    container: &'a mut PptxContainer,
    current_paths: Vec<String>,
    current_index: usize,
    media_dir: PathBuf,
    registry: MediaRegistry,
}

impl<'a> SlideIterator<'a> {
    fn new(container: &'a mut PptxContainer) -> Self {
        let current_paths = container.slide_paths.clone();
        let media_dir = container.config.media_dir.clone();
        Self {
            container,
            current_paths,
            current_index: 0,
            media_dir,
            registry: MediaRegistry::new(),
        }
    }
}

impl<'a> Iterator for SlideIterator<'a> {
    type Item = Result<SlideReport>;

    fn next(&mut self) -> Option<Self::Item> {
        let slide_path = self.current_paths.get(self.current_index)?.clone();
        self.current_index += 1;

        Some(self.container.load_slide_with(self.current_index, &slide_path, &self.media_dir, &self.registry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.current_paths.len() - self.current_index;
        (remaining, Some(remaining))
    }
}
