//! JPEG normalization of content images.
//!
//! Social networks are fed JPEG files. Other formats are re-encoded into a
//! scratch directory; the converted file is a [`TempPath`] and disappears
//! when the [`PreparedMedia`] is dropped.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use tempfile::TempPath;
use tracing::debug;

use benefich_core::config::SocialConfig;

use crate::error::DeliveryError;

/// An image ready to be uploaded.
#[derive(Debug)]
pub enum PreparedMedia {
    /// The source file was already a JPEG.
    Original(PathBuf),
    /// A converted copy, removed on drop.
    Converted(TempPath),
}

impl PreparedMedia {
    /// Path of the JPEG to upload.
    pub fn path(&self) -> &Path {
        match self {
            Self::Original(path) => path,
            Self::Converted(temp) => temp,
        }
    }
}

/// Resolves content image paths and converts them to JPEG.
#[derive(Debug, Clone)]
pub struct MediaNormalizer {
    media_root: PathBuf,
    scratch_dir: PathBuf,
    quality: u8,
}

impl MediaNormalizer {
    /// Build a normalizer from the social configuration.
    pub fn new(config: &SocialConfig) -> Self {
        Self {
            media_root: PathBuf::from(&config.media_root),
            scratch_dir: PathBuf::from(&config.scratch_dir),
            quality: config.jpeg_quality,
        }
    }

    /// Absolute or media-root-relative location of `image_path`.
    pub fn resolve(&self, image_path: &str) -> PathBuf {
        let path = Path::new(image_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.media_root.join(path)
        }
    }

    /// Produce a JPEG for `image_path`, converting when needed.
    pub async fn prepare(&self, image_path: &str) -> Result<PreparedMedia, DeliveryError> {
        let source = self.resolve(image_path);
        tokio::fs::metadata(&source).await.map_err(|e| {
            DeliveryError::Media(format!("cannot read '{}': {e}", source.display()))
        })?;

        if is_jpeg(&source) {
            return Ok(PreparedMedia::Original(source));
        }

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|e| DeliveryError::Media(format!("cannot create scratch dir: {e}")))?;

        let scratch = self.scratch_dir.clone();
        let quality = self.quality;
        tokio::task::spawn_blocking(move || convert(&source, &scratch, quality))
            .await
            .map_err(|e| DeliveryError::Media(format!("conversion task failed: {e}")))?
    }
}

/// Whether the extension already names a JPEG.
pub fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

fn convert(source: &Path, scratch: &Path, quality: u8) -> Result<PreparedMedia, DeliveryError> {
    let image = image::open(source).map_err(|e| {
        DeliveryError::Media(format!("cannot decode '{}': {e}", source.display()))
    })?;
    let rgb = image.to_rgb8();

    let file = tempfile::Builder::new()
        .prefix("benefich-")
        .suffix(".jpg")
        .tempfile_in(scratch)
        .map_err(|e| DeliveryError::Media(format!("cannot create scratch file: {e}")))?;

    {
        let mut writer = BufWriter::new(file.as_file());
        JpegEncoder::new_with_quality(&mut writer, quality)
            .encode_image(&rgb)
            .map_err(|e| DeliveryError::Media(format!("cannot encode JPEG: {e}")))?;
        writer
            .flush()
            .map_err(|e| DeliveryError::Media(format!("cannot write JPEG: {e}")))?;
    }

    let converted = file.into_temp_path();
    debug!(
        source = %source.display(),
        converted = %converted.display(),
        "Converted image to JPEG"
    );
    Ok(PreparedMedia::Converted(converted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(root: &Path, scratch: &Path) -> MediaNormalizer {
        MediaNormalizer {
            media_root: root.to_path_buf(),
            scratch_dir: scratch.to_path_buf(),
            quality: 80,
        }
    }

    #[test]
    fn test_is_jpeg_ignores_case() {
        assert!(is_jpeg(Path::new("a/photo.JPG")));
        assert!(is_jpeg(Path::new("a/photo.jpeg")));
        assert!(!is_jpeg(Path::new("a/photo.png")));
        assert!(!is_jpeg(Path::new("a/jpg")));
    }

    #[tokio::test]
    async fn test_png_is_converted_and_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        image::RgbImage::new(8, 8)
            .save(root.path().join("poster.png"))
            .unwrap();

        let prepared = normalizer(root.path(), scratch.path())
            .prepare("poster.png")
            .await
            .unwrap();
        let path = prepared.path().to_path_buf();
        assert!(matches!(prepared, PreparedMedia::Converted(_)));
        assert_eq!(path.extension().unwrap(), "jpg");
        assert!(image::open(&path).is_ok());

        drop(prepared);
        assert!(!path.exists());
        assert!(root.path().join("poster.png").exists());
    }

    #[tokio::test]
    async fn test_jpeg_is_passed_through() {
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let original = root.path().join("poster.jpg");
        image::RgbImage::new(8, 8).save(&original).unwrap();

        let prepared = normalizer(root.path(), scratch.path())
            .prepare("poster.jpg")
            .await
            .unwrap();
        assert_eq!(prepared.path(), original.as_path());

        drop(prepared);
        assert!(original.exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_a_media_error() {
        let root = tempfile::tempdir().unwrap();
        let err = normalizer(root.path(), root.path())
            .prepare("missing.png")
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Media(_)));
    }
}
