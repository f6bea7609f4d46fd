//! Status image lookup and the bundled fallback image.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use jetclock_common::StatusImage;
use tracing::info;

const DEFAULT_IMAGE: &str = "default.png";
const DEFAULT_SIZE: u32 = 480;
const BACKGROUND: [u8; 3] = [0x10, 0x14, 0x18];
const ACCENT: [u8; 3] = [0x3a, 0x9a, 0xd9];

/// The directory holding one image per [`StatusImage`] kind.
#[derive(Debug, Clone)]
pub struct ImageSet {
    dir: PathBuf,
}

impl ImageSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn default_image(&self) -> PathBuf {
        self.dir.join(DEFAULT_IMAGE)
    }

    /// Image to display for `kind`, falling back to the default image when
    /// the kind-specific file is missing.
    pub fn path_for(&self, kind: StatusImage) -> PathBuf {
        let specific = self.dir.join(kind.file_name());
        if specific.is_file() {
            specific
        } else {
            self.default_image()
        }
    }

    /// Write the bundled default image if it is not there yet.
    ///
    /// Returns `true` when a file was written.
    pub fn ensure_default(&self) -> io::Result<bool> {
        let path = self.default_image();
        if path.is_file() {
            return Ok(false);
        }
        std::fs::create_dir_all(self.dir())?;

        let tmp = path.with_extension("png.tmp");
        write_default_png(&tmp, DEFAULT_SIZE)?;
        std::fs::rename(&tmp, &path)?;
        info!("wrote default status image to {}", path.display());
        Ok(true)
    }
}

/// Render a dark square with a centered accent bar.
fn write_default_png(path: &Path, size: u32) -> io::Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(writer, size, size);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(io::Error::other)?;

    let band = size / 3..size - size / 3;
    let bar = size / 2 - size / 40..size / 2 + size / 40;
    let mut data = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            let pixel = if band.contains(&x) && bar.contains(&y) {
                ACCENT
            } else {
                BACKGROUND
            };
            data.extend_from_slice(&pixel);
        }
    }

    writer.write_image_data(&data).map_err(io::Error::other)?;
    writer.finish().map_err(io::Error::other)
}
