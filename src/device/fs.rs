// fs.rs — Filesystem-backed ImagePicker.
//
// Stands in for the platform media picker in the demo binary and in tests:
// "picking" returns a preconfigured path, metadata comes from the local
// filesystem via tokio::fs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{DeviceError, ImagePicker, PickedImage};

/// An [`ImagePicker`] that always "picks" the file it was constructed with.
pub struct FsImagePicker {
    path: PathBuf,
}

impl FsImagePicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImagePicker for FsImagePicker {
    async fn pick(&self) -> Result<Option<PickedImage>, DeviceError> {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                DeviceError::Picker(format!("no usable file name in {}", self.path.display()))
            })?;
        Ok(Some(PickedImage {
            uri: self.path.display().to_string(),
            file_name: file_name.to_string(),
        }))
    }

    async fn byte_size(&self, uri: &str) -> Result<u64, DeviceError> {
        let meta = tokio::fs::metadata(Path::new(uri)).await?;
        Ok(meta.len())
    }

    async fn read(&self, uri: &str) -> Result<Vec<u8>, DeviceError> {
        Ok(tokio::fs::read(Path::new(uri)).await?)
    }
}
