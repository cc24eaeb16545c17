// ABOUTME: Image export helpers for the big-deck engine
// ABOUTME: File naming, image type normalization and encoding of exported pages

use crate::errors::{DeckError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of exporting a deck to images
#[derive(Debug, Default)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
    pub cancelled: bool,
}

/// Number of decimal digits needed to print `n`
pub fn digit_count(n: usize) -> usize {
    let mut digits = 1;
    let mut rest = n;
    while rest >= 10 {
        rest /= 10;
        digits += 1;
    }
    digits
}

/// Lower-case the type; anything mentioning "jpg" becomes "jpeg"
pub fn normalize_image_type(image_type: &str) -> String {
    let lower = image_type.trim().to_lowercase();
    if lower.contains("jpg") {
        "jpeg".to_string()
    } else {
        lower
    }
}

/// Codec for a normalized image type
pub fn image_format(normalized: &str) -> Result<ImageFormat> {
    ImageFormat::from_extension(normalized)
        .ok_or_else(|| DeckError::ExportError(format!("Unsupported image type: {}", normalized)))
}

/// `basename` + zero-padded index + "." + type, padded to the digits of `count`
pub fn image_file_name(basename: &str, index: usize, count: usize, normalized: &str) -> String {
    format!(
        "{}{:0width$}.{}",
        basename,
        index,
        normalized,
        width = digit_count(count)
    )
}

/// Get the directory `file_path` will be written to ready: create it when
/// missing and check that a file can be created in it
pub fn prepare_target(file_path: &Path) -> Result<()> {
    let dir = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if dir.exists() && !dir.is_dir() {
        return Err(DeckError::ValidationError(format!(
            "Output location is not a directory: {:?}",
            dir
        )));
    }
    fs::create_dir_all(dir)?;

    let scratch = dir.join(format!(".big-deck-{}.tmp", uuid::Uuid::new_v4()));
    fs::File::create(&scratch).map_err(|e| {
        DeckError::ValidationError(format!("Cannot write to {:?}: {}", dir, e))
    })?;
    if let Err(e) = fs::remove_file(&scratch) {
        warn!("Failed to remove {:?}: {}", scratch, e);
    }
    debug!("Output directory {:?} is writable", dir);
    Ok(())
}

/// Encode `img` to `path`, dropping alpha for codecs that lack it
pub fn write_image(img: RgbaImage, path: &Path, format: ImageFormat) -> Result<()> {
    info!("Writing {}", path.display());
    let dynamic = DynamicImage::ImageRgba8(img);
    let dynamic = match format {
        ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::Pnm => {
            DynamicImage::ImageRgb8(dynamic.to_rgb8())
        }
        _ => dynamic,
    };
    dynamic.save_with_format(path, format)?;
    Ok(())
}
