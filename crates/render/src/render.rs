use crate::error::{ErrorKind, Result};
use crate::{DEFAULT_MAX_DIMENSION, ImageFormat, RenderOptions};
use exn::ResultExt;
use image::DynamicImage;
use image::imageops::FilterType;
use std::io::Cursor;
use tracing::instrument;

/// Turns an authoritative cover image into a derived render.
///
/// Rendering is CPU-bound and synchronous; async callers are expected to run
/// it on a blocking thread.
pub trait CoverRenderer: Send + Sync {
    fn render(&self, source: &[u8], options: &RenderOptions) -> Result<Vec<u8>>;
}

/// [`CoverRenderer`] backed by the `image` crate.
///
/// - Both dimensions: scale to cover the box, then crop the overflow.
/// - One dimension: scale to it, preserving the aspect ratio.
/// - Neither: keep the native size and only re-encode.
///
/// Any render whose intermediate or final size exceeds `max_dimension` on
/// either axis is refused before a pixel buffer is allocated.
#[derive(Debug, Clone)]
pub struct ImageRenderer {
    filter: FilterType,
    max_dimension: u32,
}
impl Default for ImageRenderer {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}
impl ImageRenderer {
    pub fn with_filter(self, filter: FilterType) -> Self {
        Self { filter, ..self }
    }

    pub fn with_max_dimension(self, max_dimension: u32) -> Self {
        Self { max_dimension, ..self }
    }

    /// Largest buffer `resize` will allocate for a source of the given size,
    /// or `None` when the source is only re-encoded.
    fn target_size(source: (u32, u32), options: &RenderOptions) -> Option<(u64, u64)> {
        let (source_width, source_height) = (f64::from(source.0.max(1)), f64::from(source.1.max(1)));
        let scaled = |ratio: f64| ((source_width * ratio).ceil() as u64, (source_height * ratio).ceil() as u64);
        let ratio = match (options.width, options.height) {
            // Fill scales to cover the box before cropping.
            (Some(width), Some(height)) => {
                f64::max(f64::from(width.get()) / source_width, f64::from(height.get()) / source_height)
            },
            (Some(width), None) => f64::from(width.get()) / source_width,
            (None, Some(height)) => f64::from(height.get()) / source_height,
            (None, None) => return None,
        };
        Some(scaled(ratio))
    }

    fn check_size(&self, source: (u32, u32), options: &RenderOptions) -> Result<()> {
        let Some((width, height)) = Self::target_size(source, options) else {
            return Ok(());
        };
        let max = self.max_dimension;
        if width > u64::from(max) || height > u64::from(max) {
            exn::bail!(ErrorKind::TooLarge { width, height, max });
        }
        Ok(())
    }

    fn resize(&self, image: DynamicImage, options: &RenderOptions) -> DynamicImage {
        match (options.width, options.height) {
            (Some(width), Some(height)) => image.resize_to_fill(width.get(), height.get(), self.filter),
            (Some(width), None) => image.resize(width.get(), u32::MAX, self.filter),
            (None, Some(height)) => image.resize(u32::MAX, height.get(), self.filter),
            (None, None) => image,
        }
    }

    fn encode(image: DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let image = match format {
            // No alpha channel in JPEG.
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            ImageFormat::Webp if image.color().has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
            ImageFormat::Webp => DynamicImage::ImageRgb8(image.to_rgb8()),
            ImageFormat::Png => image,
        };
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, format.codec())
            .or_raise(|| ErrorKind::Encode(format.extension()))?;
        Ok(buffer.into_inner())
    }
}
impl CoverRenderer for ImageRenderer {
    #[instrument(skip_all, fields(format = %options.format, width = ?options.width, height = ?options.height))]
    fn render(&self, source: &[u8], options: &RenderOptions) -> Result<Vec<u8>> {
        let image = image::load_from_memory(source).or_raise(|| ErrorKind::Decode)?;
        let (source_width, source_height) = (image.width(), image.height());
        self.check_size((source_width, source_height), options)?;
        let resized = self.resize(image, options);
        tracing::debug!(
            source_width,
            source_height,
            width = resized.width(),
            height = resized.height(),
            "rendering cover"
        );
        Self::encode(resized, options.format)
    }
}
