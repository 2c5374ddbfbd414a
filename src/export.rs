//! Export sinks
//!
//! The finished composite is handed to a sink chosen by the default action:
//! a PNG file in the save folder, or the system clipboard.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use image::RgbaImage;

use crate::config::{AutonateConfig, DefaultAction};

/// Destination for an exported composite
pub trait ExportSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver the image; called on a blocking thread
    fn write(&self, image: &RgbaImage) -> anyhow::Result<()>;
}

/// Saves captures as PNG files into a folder
#[derive(Debug, Clone)]
pub struct FileSink {
    pub dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the next capture will be written to
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(capture_file_name())
    }
}

impl ExportSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn write(&self, image: &RgbaImage) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.next_path();
        save_png(&path, image)?;
        log::info!("Saved capture to {}", path.display());
        Ok(())
    }
}

/// Copies captures to the system clipboard
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipboardSink;

impl ExportSink for ClipboardSink {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn write(&self, image: &RgbaImage) -> anyhow::Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("opening clipboard")?;
        clipboard
            .set_image(arboard::ImageData {
                width: image.width() as usize,
                height: image.height() as usize,
                bytes: Cow::Borrowed(image.as_raw()),
            })
            .context("writing image to clipboard")?;
        log::info!("Copied {}x{} capture to clipboard", image.width(), image.height());
        Ok(())
    }
}

/// Pick the sink for an export action
///
/// Returns None when saving but no save folder can be resolved.
pub fn sink_for(action: DefaultAction, config: &AutonateConfig) -> Option<Arc<dyn ExportSink>> {
    match action {
        DefaultAction::Copy => Some(Arc::new(ClipboardSink)),
        DefaultAction::Save => {
            let Some(dir) = config.save_location.dir() else {
                log::warn!("No folder for {:?}; capture not saved", config.save_location);
                return None;
            };
            Some(Arc::new(FileSink::new(dir)))
        }
    }
}

/// Hand the image to a sink without blocking the caller
///
/// Failures are logged; the caller never sees them.
pub async fn deliver(image: RgbaImage, sink: Arc<dyn ExportSink>) {
    let name = sink.name();
    let result = tokio::task::spawn_blocking(move || sink.write(&image)).await;
    match result {
        Ok(Ok(())) => {}
        Ok(Err(err)) => log::error!("Export to {} failed: {:#}", name, err),
        Err(err) => log::error!("Export to {} panicked: {}", name, err),
    }
}

/// `autonate-capture-<unix-millis>.png`
pub fn capture_file_name() -> String {
    format!(
        "autonate-capture-{}.png",
        chrono::Utc::now().timestamp_millis()
    )
}

pub fn save_png(path: &Path, image: &RgbaImage) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_png(BufWriter::new(file), image)
        .with_context(|| format!("encoding {}", path.display()))?;
    Ok(())
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}
