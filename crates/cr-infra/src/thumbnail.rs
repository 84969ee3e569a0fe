use anyhow::{Context, Result};
use async_trait::async_trait;
use cr_core::ports::{GeneratedThumbnail, ThumbnailGeneratorPort};
use image::{imageops::FilterType, GenericImageView, ImageFormat};

/// Edge length of the square a thumbnail must fit in.
pub const THUMBNAIL_MAX_EDGE: u32 = 128;

pub struct ImageThumbnailGenerator {
    max_edge: u32,
}

impl ImageThumbnailGenerator {
    pub fn new(max_edge: u32) -> Self {
        Self { max_edge }
    }
}

impl Default for ImageThumbnailGenerator {
    fn default() -> Self {
        Self::new(THUMBNAIL_MAX_EDGE)
    }
}

#[async_trait]
impl ThumbnailGeneratorPort for ImageThumbnailGenerator {
    async fn generate_thumbnail(&self, image_bytes: &[u8]) -> Result<GeneratedThumbnail> {
        let bytes = image_bytes.to_vec();
        let max_edge = self.max_edge;
        tokio::task::spawn_blocking(move || render_thumbnail(&bytes, max_edge))
            .await
            .context("thumbnail task panicked")?
    }
}

fn render_thumbnail(image_bytes: &[u8], max_edge: u32) -> Result<GeneratedThumbnail> {
    let decoded =
        image::load_from_memory(image_bytes).context("decode image bytes for thumbnail")?;
    let (original_width, original_height) = decoded.dimensions();
    let (target_width, target_height) =
        calculate_target_size(original_width, original_height, max_edge);

    let resized = if target_width == original_width && target_height == original_height {
        decoded
    } else {
        decoded.resize_exact(target_width, target_height, FilterType::Triangle)
    };

    let mut thumbnail_bytes = Vec::new();
    resized
        .to_rgba8()
        .write_to(
            &mut std::io::Cursor::new(&mut thumbnail_bytes),
            ImageFormat::Png,
        )
        .context("encode thumbnail to png")?;

    Ok(GeneratedThumbnail {
        thumbnail_bytes,
        original_width,
        original_height,
    })
}

fn calculate_target_size(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    if width >= height {
        let scaled_height = ((height as f64) * (max_edge as f64) / (width as f64)).round() as u32;
        (max_edge, scaled_height.max(1))
    } else {
        let scaled_width = ((width as f64) * (max_edge as f64) / (height as f64)).round() as u32;
        (scaled_width.max(1), max_edge)
    }
}
