use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use image::imageops::FilterType;

use svault_constants::{DEFAULT_THUMBNAIL_MAX_EDGE, DEFAULT_THUMBNAIL_TIMEOUT_SECS};
use svault_error::{Result, SaverError};
use svault_utils::{StatusEntry, Thumbnail};

use crate::reader::SourceReader;

/// Produces preview pixels for one entry. Implementations block; callers run them on the
/// blocking pool.
pub trait FrameExtractor: Send + Sync {
    fn extract(&self, entry: &StatusEntry, max_edge: u32) -> Result<Thumbnail>;
}

/// Decodes still images with the `image` crate.
pub struct ImageThumbnailer {
    reader: SourceReader,
}

impl ImageThumbnailer {
    #[must_use]
    pub fn new(reader: SourceReader) -> Self {
        Self { reader }
    }
}

impl FrameExtractor for ImageThumbnailer {
    fn extract(&self, entry: &StatusEntry, max_edge: u32) -> Result<Thumbnail> {
        if entry.is_video() {
            return Err(SaverError::SourceUnavailable(format!(
                "no frame extractor for video {}",
                entry.display_name
            )));
        }

        let mut bytes = Vec::new();
        self.reader
            .open(&entry.source_ref)
            .and_then(|mut input| input.read_to_end(&mut bytes))
            .map_err(|e| SaverError::io(entry.source_ref.to_key(), e))?;

        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            SaverError::io(
                entry.source_ref.to_key(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        let scaled = if decoded.width() > max_edge || decoded.height() > max_edge {
            decoded.resize(max_edge, max_edge, FilterType::Triangle)
        } else {
            decoded
        };
        let rgba = scaled.to_rgba8();

        Ok(Thumbnail {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

/// Lazy, individually time-boxed thumbnail loading.
#[derive(Clone)]
pub struct Thumbnailer {
    images: Arc<dyn FrameExtractor>,
    video: Option<Arc<dyn FrameExtractor>>,
    budget: Duration,
    max_edge: u32,
}

impl Thumbnailer {
    #[must_use]
    pub fn new(images: Arc<dyn FrameExtractor>) -> Self {
        Self {
            images,
            video: None,
            budget: Duration::from_secs(DEFAULT_THUMBNAIL_TIMEOUT_SECS),
            max_edge: DEFAULT_THUMBNAIL_MAX_EDGE,
        }
    }

    #[must_use]
    pub fn with_video_extractor(mut self, video: Arc<dyn FrameExtractor>) -> Self {
        self.video = Some(video);
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    #[must_use]
    pub fn with_max_edge(mut self, max_edge: u32) -> Self {
        self.max_edge = max_edge.max(1);
        self
    }

    /// Returns a copy of `entry` carrying a thumbnail, or `None` when extraction failed,
    /// timed out, or no extractor handles the entry's kind.
    pub async fn load(&self, entry: &StatusEntry) -> Option<StatusEntry> {
        let extractor = if entry.is_video() {
            Arc::clone(self.video.as_ref()?)
        } else {
            Arc::clone(&self.images)
        };

        let owned = entry.clone();
        let max_edge = self.max_edge;
        let task = tokio::task::spawn_blocking(move || extractor.extract(&owned, max_edge));

        match tokio::time::timeout(self.budget, task).await {
            Ok(Ok(Ok(thumbnail))) => Some(entry.with_thumbnail(thumbnail)),
            Ok(Ok(Err(e))) => {
                svault_logger::debug(&format!("No thumbnail for {}: {e}", entry.display_name));
                None
            }
            Ok(Err(join_err)) => {
                svault_logger::debug(&format!(
                    "Thumbnail task for {} failed: {join_err}",
                    entry.display_name
                ));
                None
            }
            Err(_) => {
                svault_logger::debug(&format!(
                    "Thumbnail for {} exceeded {}ms",
                    entry.display_name,
                    self.budget.as_millis()
                ));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svault_paths::PathResolver;
    use svault_utils::{MediaKind, SourceRef};

    struct SlowExtractor;

    impl FrameExtractor for SlowExtractor {
        fn extract(&self, _entry: &StatusEntry, _max_edge: u32) -> Result<Thumbnail> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(Thumbnail {
                width: 1,
                height: 1,
                rgba: vec![0; 4],
            })
        }
    }

    struct SolidExtractor;

    impl FrameExtractor for SolidExtractor {
        fn extract(&self, _entry: &StatusEntry, max_edge: u32) -> Result<Thumbnail> {
            Ok(Thumbnail {
                width: max_edge,
                height: max_edge,
                rgba: vec![255; (max_edge * max_edge * 4) as usize],
            })
        }
    }

    fn entry_at(path: &std::path::Path, kind: MediaKind) -> StatusEntry {
        StatusEntry::new(SourceRef::Path(path.to_path_buf()), "f", 1, 0, kind)
    }

    #[tokio::test]
    async fn image_thumbnails_are_scaled_to_the_max_edge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbaImage::from_pixel(64, 32, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let reader = SourceReader::new(PathResolver::new("/nowhere"));
        let thumbnailer =
            Thumbnailer::new(Arc::new(ImageThumbnailer::new(reader))).with_max_edge(16);

        let entry = entry_at(&path, MediaKind::Image);
        let loaded = thumbnailer.load(&entry).await.unwrap();
        let thumbnail = loaded.thumbnail.as_ref().unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (16, 8));
        assert_eq!(thumbnail.rgba.len(), 16 * 8 * 4);
        // The original entry is left as it was.
        assert!(entry.thumbnail.is_none());
    }

    #[tokio::test]
    async fn corrupt_images_and_unhandled_videos_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();

        let reader = SourceReader::new(PathResolver::new("/nowhere"));
        let thumbnailer = Thumbnailer::new(Arc::new(ImageThumbnailer::new(reader)));

        assert!(thumbnailer.load(&entry_at(&path, MediaKind::Image)).await.is_none());
        assert!(thumbnailer.load(&entry_at(&path, MediaKind::Video)).await.is_none());
    }

    #[tokio::test]
    async fn videos_use_the_injected_extractor() {
        let thumbnailer = Thumbnailer::new(Arc::new(SlowExtractor))
            .with_video_extractor(Arc::new(SolidExtractor))
            .with_max_edge(2);
        let entry = entry_at(std::path::Path::new("/v.mp4"), MediaKind::Video);
        let loaded = thumbnailer.load(&entry).await.unwrap();
        assert_eq!(loaded.thumbnail.unwrap().width, 2);
    }

    #[tokio::test]
    async fn slow_extraction_is_abandoned_after_the_budget() {
        let thumbnailer =
            Thumbnailer::new(Arc::new(SlowExtractor)).with_budget(Duration::from_millis(20));
        let entry = entry_at(std::path::Path::new("/slow.jpg"), MediaKind::Image);
        assert!(thumbnailer.load(&entry).await.is_none());
    }
}
