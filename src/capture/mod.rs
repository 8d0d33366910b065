//! Document capture: rasterize a materialized surface into a one-page PDF.

mod pdf;

pub use pdf::{A4_HEIGHT_PT, A4_WIDTH_PT, Placement, place_on_page};

use resvg::tiny_skia;
use std::sync::Arc;

use crate::config::CaptureConfig;
use crate::error::{EncodingError, RenderError, Result};
use crate::render::{MaterializedSurface, SurfaceHandle};
use crate::types::{Artifact, ExportFormat, artifact_filename};
use pdf::{DocumentInfo, RgbImage};

/// Rasterizes a surface and wraps the image in a PDF document
#[derive(Clone, Debug)]
pub struct CaptureEncoder {
    product_name: String,
    scale: f32,
    compress: bool,
    /// Parks the raster worker until the test releases it
    #[cfg(test)]
    pub(crate) pause: Option<Arc<RasterPause>>,
}

/// Rendezvous between a parked raster worker and the test driving it
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct RasterPause {
    /// Notified once the worker is parked
    pub(crate) started: Arc<tokio::sync::Notify>,
    /// The worker resumes on the next message (or when the sender drops)
    pub(crate) resume: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
}

#[cfg(test)]
impl RasterPause {
    pub(crate) fn new() -> (Arc<Self>, std::sync::mpsc::Sender<()>) {
        let (tx, rx) = std::sync::mpsc::channel();
        let pause = Self {
            started: Arc::new(tokio::sync::Notify::new()),
            resume: std::sync::Mutex::new(rx),
        };
        (Arc::new(pause), tx)
    }

    fn wait(&self) {
        self.started.notify_one();
        if let Ok(rx) = self.resume.lock() {
            let _ = rx.recv();
        }
    }
}

impl CaptureEncoder {
    /// Create an encoder from capture settings
    pub fn new(product_name: impl Into<String>, config: &CaptureConfig) -> Self {
        Self {
            product_name: product_name.into(),
            scale: config.scale,
            compress: config.compress,
            #[cfg(test)]
            pause: None,
        }
    }

    /// Capture the surface behind `handle` as a document artifact
    ///
    /// Fails with [`RenderError::SurfaceDetached`] when the surface is gone
    /// before or during capture.
    pub async fn capture(&self, handle: &SurfaceHandle) -> Result<Artifact> {
        let surface = handle.acquire()?;
        let filename = artifact_filename(
            &self.product_name,
            surface.kind(),
            surface.generated_at(),
            "pdf",
        );

        let scale = self.scale;
        let compress = self.compress;
        let producer = self.product_name.clone();
        let worker_surface = Arc::clone(&surface);
        #[cfg(test)]
        let pause = self.pause.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            #[cfg(test)]
            if let Some(pause) = &pause {
                pause.wait();
            }
            let image = rasterize(&worker_surface, scale)?;
            tracing::debug!(
                width = image.width,
                height = image.height,
                "Rasterized report surface"
            );
            pdf::write_document(
                &image,
                &DocumentInfo {
                    title: worker_surface.title(),
                    producer: &producer,
                    created: worker_surface.generated_at(),
                },
                compress,
            )
        })
        .await
        .map_err(|e| EncodingError::TaskFailed(e.to_string()))??;

        if surface.is_detached() {
            return Err(RenderError::SurfaceDetached.into());
        }

        tracing::info!(
            filename = %filename,
            size_bytes = bytes.len(),
            "Captured report document"
        );

        Ok(Artifact {
            format: ExportFormat::Document,
            filename,
            bytes,
        })
    }
}

/// Pixel dimensions of a surface rasterized at `scale`
fn raster_size(width: f32, height: f32, scale: f32) -> std::result::Result<(u32, u32), EncodingError> {
    let w = (width * scale).ceil().max(0.0) as u32;
    let h = (height * scale).ceil().max(0.0) as u32;
    if w == 0 || h == 0 {
        return Err(EncodingError::EmptySurface {
            width: w,
            height: h,
        });
    }
    Ok((w, h))
}

fn rasterize(surface: &MaterializedSurface, scale: f32) -> std::result::Result<RgbImage, EncodingError> {
    let (width, height) = surface.size();
    let (w, h) = raster_size(width, height, scale)?;

    let mut pixmap = tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| EncodingError::Raster(format!("cannot allocate a {}x{} pixmap", w, h)))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        surface.tree(),
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let mut pixels = Vec::with_capacity(w as usize * h as usize * 3);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        pixels.extend_from_slice(&[color.red(), color.green(), color.blue()]);
    }

    Ok(RgbImage {
        width: w,
        height: h,
        pixels,
    })
}
