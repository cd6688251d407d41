use std::path::PathBuf;

/// Upper bound for the default worker count of the parallel orchestrator.
const MAX_DEFAULT_CONCURRENCY: usize = 8;

/// How extracted images are named inside the media directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageNaming {
    /// `slide{N}_{token}.{ext}` with a random token. Every picture gets its own file.
    Unique,
    /// `{sha1-hex}.{ext}`. Byte-identical images share one file across the deck.
    ContentHash,
}

/// Configuration options for the inventory extraction.
///
/// Use [`ParserConfig::builder()`] to create a configuration instance.
/// This allows you to customize only the desired fields while falling back to sensible defaults for the rest.
///
/// # Configuration Options
///
/// | Parameter | Type | Default | Description |
/// |-----------|------|---------|-------------|
/// | `extract_images` | `bool` | `true` | Whether picture bytes are read and written to the media directory |
/// | `embed_images` | `bool` | `false` | Whether image reports carry a base64 copy of the bytes |
/// | `media_dir` | `PathBuf` | `media` | Directory the side-car image files are written to |
/// | `image_naming` | `Option<ImageNaming>` | `None` | `None` uses `Unique` for sequential and `ContentHash` for parallel runs |
/// | `max_concurrency` | `usize` | available cores, at most 8 | Worker count of the parallel orchestrator |
///
/// # Example
///
/// ```
/// use pptx_inventory::{ImageNaming, ParserConfig};
///
/// let config = ParserConfig::builder()
///     .embed_images(true)
///     .image_naming(ImageNaming::ContentHash)
///     .max_concurrency(4)
///     .build();
/// assert_eq!(config.max_concurrency, 4);
/// ```
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub extract_images: bool,
    pub embed_images: bool,
    pub media_dir: PathBuf,
    pub image_naming: Option<ImageNaming>,
    pub max_concurrency: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfigBuilder::default().build()
    }
}

impl ParserConfig {
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }

    /// Naming policy in effect, falling back to the variant's default.
    pub fn naming(&self, parallel: bool) -> ImageNaming {
        match (self.image_naming, parallel) {
            (Some(naming), _) => naming,
            (None, false) => ImageNaming::Unique,
            (None, true) => ImageNaming::ContentHash,
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_CONCURRENCY)
}

/// Builder for [`ParserConfig`].
///
/// Allows setting individual configuration fields while falling back to defaults for any unspecified values
#[derive(Debug, Default)]
pub struct ParserConfigBuilder {
    extract_images: Option<bool>,
    embed_images: Option<bool>,
    media_dir: Option<PathBuf>,
    image_naming: Option<ImageNaming>,
    max_concurrency: Option<usize>,
}

impl ParserConfigBuilder {
    /// Sets whether picture bytes are extracted at all.
    pub fn extract_images(mut self, value: bool) -> Self {
        self.extract_images = Some(value);
        self
    }

    /// Sets whether image reports embed the bytes as base64.
    pub fn embed_images(mut self, value: bool) -> Self {
        self.embed_images = Some(value);
        self
    }

    pub fn media_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.media_dir = Some(value.into());
        self
    }

    pub fn image_naming(mut self, value: ImageNaming) -> Self {
        self.image_naming = Some(value);
        self
    }

    /// Sets the worker count of the parallel orchestrator. Zero is raised to one.
    pub fn max_concurrency(mut self, value: usize) -> Self {
        self.max_concurrency = Some(value);
        self
    }

    /// Builds the final [`ParserConfig`] instance, applying default values for any fields that were not set.
    pub fn build(self) -> ParserConfig {
        ParserConfig {
            extract_images: self.extract_images.unwrap_or(true),
            embed_images: self.embed_images.unwrap_or(false),
            media_dir: self.media_dir.unwrap_or_else(|| PathBuf::from("media")),
            image_naming: self.image_naming,
            max_concurrency: self.max_concurrency.unwrap_or_else(default_concurrency).max(1),
        }
    }
}
