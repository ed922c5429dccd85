//! Resolving a record's picture path to something displayable.
//!
//! Paths are never checked on load, so a missing file is an expected state
//! and comes back as [`PhotoView::Missing`] rather than an error.

use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::record::Record;

#[derive(Debug)]
pub enum PhotoView {
    Found(Photo),
    Missing(PathBuf),
}

#[derive(Debug)]
pub struct Photo {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub format: Option<ImageFormat>,
}

impl Photo {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Pixel dimensions read from the image header.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .map_err(|e| Error::io(&self.path, e))?
            .into_dimensions()
            .map_err(|source| Error::Image {
                path: self.path.clone(),
                source,
            })
    }
}

pub fn resolve(path: &Path) -> Result<PhotoView> {
    match fs::read(path) {
        Ok(bytes) => {
            let format = image::guess_format(&bytes).ok();
            debug!(path = %path.display(), ?format, size = bytes.len(), "resolved photo");
            Ok(PhotoView::Found(Photo {
                path: path.to_path_buf(),
                bytes,
                format,
            }))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(PhotoView::Missing(path.to_path_buf())),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// File size and image header of a photo, read without loading the pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoInfo {
    pub size: u64,
    pub format: Option<ImageFormat>,
    pub dimensions: Option<(u32, u32)>,
}

/// Like [`resolve`] but cheap enough to call on every selection change.
/// `Ok(None)` means the file does not exist.
pub fn inspect(path: &Path) -> Result<Option<PhotoInfo>> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    let reader = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| Error::io(path, e))?;
    let format = reader.format();
    let dimensions = reader.into_dimensions().ok();
    Ok(Some(PhotoInfo {
        size,
        format,
        dimensions,
    }))
}

/// Records whose photo file currently exists, in collection order.
pub fn with_existing_photos(records: &[Record]) -> Vec<&Record> {
    records
        .iter()
        .filter(|r| r.picture_path.as_deref().is_some_and(Path::exists))
        .collect()
}
