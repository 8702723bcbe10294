use image::{ImageFormat, RgbImage};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot determine an image format for {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("cannot write an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("failed writing {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed encoding {path:?}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Persists a composed image.
pub trait ImageSink {
    /// Fails early if `path` can never be written by this sink.
    fn check(&self, _path: &Path) -> Result<(), SinkError> {
        Ok(())
    }

    fn persist(&self, image: &RgbImage, path: &Path) -> Result<(), SinkError>;
}

/// The output format for `path`, limited to the encoders compiled in.
fn format_of(path: &Path) -> Result<ImageFormat, SinkError> {
    match ImageFormat::from_path(path) {
        Ok(format @ ImageFormat::Png) | Ok(format @ ImageFormat::Jpeg) => Ok(format),
        _ => Err(SinkError::UnsupportedFormat(path.to_owned())),
    }
}

/// Writes images to the file system, choosing the format from the file
/// extension.
///
/// The image is encoded into a temporary file next to the destination and
/// only renamed into place once it has been written completely.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSink;

impl ImageSink for FileSink {
    fn check(&self, path: &Path) -> Result<(), SinkError> {
        format_of(path).map(|_| ())
    }

    fn persist(&self, image: &RgbImage, path: &Path) -> Result<(), SinkError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SinkError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        let format = format_of(path)?;

        let io_err = |source: io::Error| SinkError::Io {
            path: path.to_owned(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".tile-stitcher")
            .tempfile_in(dir)
            .map_err(io_err)?;

        image
            .write_to(&mut tmp, format)
            .map_err(|source| SinkError::Encode {
                path: path.to_owned(),
                source,
            })?;

        tmp.persist(path).map_err(|e| io_err(e.error))?;

        log::debug!("wrote {}x{} image to {:?}", image.width(), image.height(), path);

        Ok(())
    }
}
