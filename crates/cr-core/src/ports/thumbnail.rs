use anyhow::Result;

/// Generated thumbnail payload and metadata.
///
/// 生成的缩略图负载与元数据。
pub struct GeneratedThumbnail {
    /// PNG-encoded thumbnail.
    pub thumbnail_bytes: Vec<u8>,
    pub original_width: u32,
    pub original_height: u32,
}

/// Generator port for creating thumbnails from image bytes.
///
/// 从图像字节生成缩略图的生成器端口。
#[async_trait::async_trait]
pub trait ThumbnailGeneratorPort: Send + Sync {
    async fn generate_thumbnail(&self, image_bytes: &[u8]) -> Result<GeneratedThumbnail>;
}
