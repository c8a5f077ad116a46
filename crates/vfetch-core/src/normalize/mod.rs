//! Image normalization: canonical RGBA PNG, then one shape adjustment, then verification.
//!
//! Every stage works in place on the file in the variants directory and
//! returns the (possibly renamed) path. A failing stage leaves the previous
//! artifact as it was, except verification, which deletes what it rejects.

mod shape;

pub use shape::{apply_circle_mask, circle_mask, crop_square, square_extent};

use crate::download::temp_path;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shape adjustment applied after canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMode {
    /// Centered square crop.
    #[default]
    Square,
    /// Centered square crop with a circular alpha mask.
    Circle,
    /// Leave dimensions as downloaded.
    None,
}

impl ShapeMode {
    /// Resolves the CLI flags; `circle` wins over `none`, which wins over `square`.
    pub fn from_flags(square: bool, circle: bool, none: bool) -> Option<Self> {
        if circle {
            Some(ShapeMode::Circle)
        } else if none {
            Some(ShapeMode::None)
        } else if square {
            Some(ShapeMode::Square)
        } else {
            None
        }
    }
}

/// Normalization stage, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Canonicalize,
    SquareCrop,
    CircleMask,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Canonicalize => "convert",
            Stage::SquareCrop => "square crop",
            Stage::CircleMask => "circle mask",
            Stage::Verify => "verify",
        })
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{stage} read failed {}: {source}", path.display())]
    Read {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The bytes are not an image the decoder understands.
    #[error("{stage} decode failed {}: {source}", path.display())]
    Decode {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("{stage} save failed {}: {source}", path.display())]
    Encode {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("verify failed {}: {reason}", path.display())]
    Verify { path: PathBuf, reason: String },
}

impl NormalizeError {
    /// True when the downloaded bytes themselves could not be parsed.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            NormalizeError::Decode {
                stage: Stage::Canonicalize,
                ..
            }
        )
    }

    pub fn path(&self) -> &Path {
        match self {
            NormalizeError::Read { path, .. }
            | NormalizeError::Decode { path, .. }
            | NormalizeError::Encode { path, .. }
            | NormalizeError::Verify { path, .. } => path,
        }
    }
}

/// Runs all stages: [`canonicalize`], [`apply_shape`], [`verify`]. Returns the final PNG path.
pub fn normalize(path: &Path, mode: ShapeMode) -> Result<PathBuf, NormalizeError> {
    let png = canonicalize(path)?;
    let shaped = apply_shape(&png, mode)?;
    verify(&shaped)?;
    Ok(shaped)
}

/// Decodes `path` (format sniffed from content), writes it as RGBA PNG next to
/// it with a `.png` extension, verifies the PNG and removes the original if it
/// had a different name.
///
/// On decode failure a raw file with a non-PNG name is left untouched; one
/// already named `*.png` is removed so it never counts as a variant.
pub fn canonicalize(path: &Path) -> Result<PathBuf, NormalizeError> {
    let decoded = decode_file(path, Stage::Canonicalize).inspect_err(|_| {
        if has_png_name(path) {
            let _ = fs::remove_file(path);
        }
    });
    let rgba = decoded?.to_rgba8();
    let png_path = path.with_extension("png");
    save_png(&rgba, &png_path, Stage::Canonicalize)?;
    verify(&png_path)?;

    if png_path != path {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("could not remove original {}: {}", path.display(), e);
        }
    }
    Ok(png_path)
}

/// Applies `mode` to the PNG at `path`, overwriting it. `ShapeMode::None` is a no-op.
pub fn apply_shape(path: &Path, mode: ShapeMode) -> Result<PathBuf, NormalizeError> {
    let stage = match mode {
        ShapeMode::None => return Ok(path.to_path_buf()),
        ShapeMode::Square => Stage::SquareCrop,
        ShapeMode::Circle => Stage::CircleMask,
    };
    let rgba = decode_file(path, stage)?.to_rgba8();
    let shaped = match mode {
        ShapeMode::Circle => apply_circle_mask(&rgba),
        _ => crop_square(&rgba),
    };
    save_png(&shaped, path, stage)?;
    Ok(path.to_path_buf())
}

/// Re-opens `path` and checks it is a PNG that decodes cleanly.
/// A file that fails is deleted.
pub fn verify(path: &Path) -> Result<(), NormalizeError> {
    match check_png(path) {
        Ok(()) => Ok(()),
        Err(reason) => {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("could not remove unverified {}: {}", path.display(), e);
                }
            }
            Err(NormalizeError::Verify {
                path: path.to_path_buf(),
                reason,
            })
        }
    }
}

/// Pixel dimensions read from the file header.
pub fn dimensions(path: &Path) -> Result<(u32, u32), ImageError> {
    image::image_dimensions(path)
}

fn has_png_name(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "png")
}

fn check_png(path: &Path) -> Result<(), String> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| e.to_string())?;
    if reader.format() != Some(ImageFormat::Png) {
        return Err(format!("not a PNG (detected {:?})", reader.format()));
    }
    reader.decode().map(|_| ()).map_err(|e| e.to_string())
}

fn decode_file(path: &Path, stage: Stage) -> Result<DynamicImage, NormalizeError> {
    let bytes = fs::read(path).map_err(|source| NormalizeError::Read {
        stage,
        path: path.to_path_buf(),
        source,
    })?;
    image::load_from_memory(&bytes).map_err(|source| NormalizeError::Decode {
        stage,
        path: path.to_path_buf(),
        source,
    })
}

/// Encodes to `<path>.part` and renames onto `path`; a failed save leaves `path` as it was.
fn save_png(img: &RgbaImage, path: &Path, stage: Stage) -> Result<(), NormalizeError> {
    let tmp = temp_path(path);
    let saved = img
        .save_with_format(&tmp, ImageFormat::Png)
        .and_then(|()| fs::rename(&tmp, path).map_err(ImageError::IoError));
    saved.map_err(|source| {
        let _ = fs::remove_file(&tmp);
        NormalizeError::Encode {
            stage,
            path: path.to_path_buf(),
            source,
        }
    })
}
