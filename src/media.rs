use crate::parser_config::ImageNaming;
use crate::types::ImageInfo;
use crate::{Error, Result};
use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Maps an image content type onto the extension of its side-car file.
pub fn image_extension(content_type: &str) -> &'static str {
    match content_type.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/x-emf" => "emf",
        "image/x-wmf" => "wmf",
        _ => "bin",
    }
}

/// Outcome of the single write attempt for one digest: the relative path on
/// success, `None` if the write failed.
type WriteSlot = Arc<OnceCell<Option<String>>>;

/// Registry of content hashes seen during one run.
///
/// Shared by every worker of a parallel run. The lock covers only the
/// insert-if-absent of a digest's slot, never the file write. The first caller
/// for a digest writes the file through the slot; concurrent callers for the
/// same digest wait on that slot and reuse its outcome.
#[derive(Debug, Default)]
pub struct MediaRegistry {
    files: Mutex<HashMap<String, WriteSlot>>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative path of the file written for `digest`, if that write succeeded.
    pub fn get(&self, digest: &str) -> Option<String> {
        let slot = self.files.lock().get(digest).cloned()?;
        slot.get().cloned().flatten()
    }

    fn slot(&self, digest: &str) -> WriteSlot {
        Arc::clone(self.files.lock().entry(digest.to_string()).or_default())
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

/// Writes picture payloads into the media directory under one naming policy.
#[derive(Debug)]
pub struct MediaWriter<'a> {
    media_dir: &'a Path,
    naming: ImageNaming,
    embed: bool,
    registry: &'a MediaRegistry,
}

impl<'a> MediaWriter<'a> {
    pub fn new(media_dir: &'a Path, naming: ImageNaming, embed: bool, registry: &'a MediaRegistry) -> Self {
        Self { media_dir, naming, embed, registry }
    }

    /// Persists one image and describes it.
    ///
    /// With [`ImageNaming::ContentHash`] only the first caller for a digest
    /// writes the file; later identical images reuse its path. If that write
    /// failed, every identical image fails with [`Error::MediaWrite`].
    pub fn store(&self, slide_number: usize, content_type: &str, bytes: &[u8]) -> Result<ImageInfo> {
        let extension = image_extension(content_type);

        let file = match self.naming {
            ImageNaming::Unique => {
                let name = format!("slide{}_{}.{}", slide_number, uuid::Uuid::new_v4().simple(), extension);
                self.write(&name, bytes)?;
                self.relative_path(&name)
            }
            ImageNaming::ContentHash => {
                let digest = hex_digest(bytes);
                let name = format!("{}.{}", digest, extension);
                let mut failure = None;
                let mut written = false;
                let slot = self.registry.slot(&digest);
                let outcome = slot.get_or_init(|| {
                    written = true;
                    match self.write(&name, bytes) {
                        Ok(()) => Some(self.relative_path(&name)),
                        Err(e) => {
                            failure = Some(e);
                            None
                        }
                    }
                });
                if let Some(e) = failure {
                    return Err(e);
                }
                match outcome {
                    Some(file) => {
                        if !written {
                            tracing::debug!(slide = slide_number, file = %file, "Reusing deduplicated image");
                        }
                        file.clone()
                    }
                    None => return Err(Error::MediaWrite(self.relative_path(&name))),
                }
            }
        };

        Ok(ImageInfo {
            content_type: content_type.to_string(),
            size: bytes.len(),
            file,
            base64: self.embed.then(|| general_purpose::STANDARD.encode(bytes)),
        })
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(self.media_dir)?;
        fs::write(self.media_dir.join(name), bytes)?;
        Ok(())
    }

    /// `<media dir name>/<file name>`, always with forward slashes.
    fn relative_path(&self, name: &str) -> String {
        let dir_name = self
            .media_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());
        format!("{}/{}", dir_name, name)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha1::digest(bytes).iter().map(|b| format!("{:02x}", b)).collect()
}
