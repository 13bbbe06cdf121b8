//! PNG output for extracted pixel buffers.

use super::types::{CaptureError, PixelBuffer};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encodes `buffer` as an 8-bit, non-interlaced RGB PNG into `writer`.
pub fn encode_to<W: Write>(buffer: &PixelBuffer, writer: W) -> Result<(), CaptureError> {
    let expected = buffer.stride() * buffer.height as usize;
    if buffer.data.len() != expected {
        return Err(CaptureError::Encoding(image::ImageError::Parameter(
            image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ),
        )));
    }

    let encoder =
        PngEncoder::new_with_quality(writer, CompressionType::Default, FilterType::Adaptive);
    encoder.write_image(
        &buffer.data,
        buffer.width,
        buffer.height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

/// Writes `buffer` to a new PNG file at `path`, replacing any existing file.
pub fn encode(buffer: &PixelBuffer, path: &Path) -> Result<(), CaptureError> {
    log::info!(
        "Writing {}x{} PNG to {}",
        buffer.width,
        buffer.height,
        path.display()
    );

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_to(buffer, &mut writer)?;
    writer.flush()?;

    // Screenshots can contain anything on screen; keep them private.
    #[cfg(unix)]
    {
        use std::fs::{self, Permissions};
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, Permissions::from_mode(0o600))?;
    }

    log::debug!("PNG written: {}", path.display());
    Ok(())
}
