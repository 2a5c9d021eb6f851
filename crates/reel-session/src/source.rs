//! Background image supply.

use std::path::PathBuf;

use async_trait::async_trait;
use reel_core::{FrameBuffer, ReelError, ReelResult};

/// Raw image data handed over by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageData {
    Path(PathBuf),
    Bytes { data: Vec<u8>, name: String },
}

/// A fetched image with its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub data: ImageData,
    pub alt_text: String,
}

impl ImageAsset {
    /// Decode into a frame buffer.
    pub async fn decode(self) -> ReelResult<FrameBuffer> {
        match self.data {
            ImageData::Path(path) => {
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    ReelError::asset(
                        format!("failed to read image: {}", e),
                        path.display().to_string(),
                    )
                })?;
                reel_render::load_image_from_bytes(&bytes, &path.display().to_string())
            }
            ImageData::Bytes { data, name } => reel_render::load_image_from_bytes(&data, &name),
        }
    }
}

/// Supplies the background image for a reel.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self) -> ReelResult<ImageAsset>;
}

/// An image file on disk.
#[derive(Debug, Clone)]
pub struct FileImage {
    path: PathBuf,
    alt_text: String,
}

impl FileImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let alt_text = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, alt_text }
    }

    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = alt_text.into();
        self
    }
}

#[async_trait]
impl ImageSource for FileImage {
    async fn fetch(&self) -> ReelResult<ImageAsset> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(ReelError::asset(
                "image file not found",
                self.path.display().to_string(),
            ));
        }
        Ok(ImageAsset {
            data: ImageData::Path(self.path.clone()),
            alt_text: self.alt_text.clone(),
        })
    }
}

/// Encoded image bytes already in memory.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    data: Vec<u8>,
    name: String,
}

impl MemoryImage {
    pub fn new(data: Vec<u8>, name: impl Into<String>) -> Self {
        Self {
            data,
            name: name.into(),
        }
    }
}

#[async_trait]
impl ImageSource for MemoryImage {
    async fn fetch(&self) -> ReelResult<ImageAsset> {
        Ok(ImageAsset {
            data: ImageData::Bytes {
                data: self.data.clone(),
                name: self.name.clone(),
            },
            alt_text: self.name.clone(),
        })
    }
}
