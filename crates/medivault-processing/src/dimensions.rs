//! Raster dimension extraction.
//!
//! Decoding is CPU-bound and runs off the async pool. A payload that does
//! not decode as a raster image (DICOM, corrupt data) yields `None`; the
//! upload path treats that as a soft failure and stores the record without
//! dimensions.

use image::GenericImageView;
use image::ImageReader;
use std::io::Cursor;

/// Extracted raster dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

fn decode_dimensions(data: &[u8]) -> Option<ImageDimensions> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    let img = reader.decode().ok()?;
    let (width, height) = img.dimensions();
    Some(ImageDimensions { width, height })
}

/// Extract width/height from an image payload, or `None` if it does not
/// decode as a raster image.
pub async fn extract_dimensions(data: &[u8]) -> Option<ImageDimensions> {
    let data = data.to_vec();
    match tokio::task::spawn_blocking(move || decode_dimensions(&data)).await {
        Ok(dims) => {
            if dims.is_none() {
                tracing::debug!("Payload did not decode as a raster image; dimensions left unset");
            }
            dims
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dimension extraction task failed");
            None
        }
    }
}
