#[cfg(test)]
pub mod impl_fake;
pub mod impl_jpeg;
pub mod interface;
pub mod raster;

use crate::display_surface::DisplaySurface;
use crate::library::logger::interface::Logger;
use image::RgbImage;
use raster::RasterTarget;
use std::sync::{Arc, Mutex};

/// Snapshots the display surface into an offscreen raster target.
pub struct FrameCapturer {
    surface: DisplaySurface,
    raster: Mutex<RasterTarget>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl FrameCapturer {
    pub fn new(surface: DisplaySurface, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            surface,
            raster: Mutex::new(RasterTarget::new()),
            logger: logger.with_namespace("capture"),
        }
    }

    /// `None` when the surface is unbound or has not shown a frame yet.
    pub fn capture(&self) -> Option<RgbImage> {
        let mut raster = self.raster.lock().unwrap_or_else(|e| e.into_inner());

        let captured = self.surface.with_frame(|frame| {
            raster.resize_to(frame.width(), frame.height());
            raster.draw(frame);
            raster.image().clone()
        });

        match &captured {
            Some(frame) => {
                let _ = self.logger.info(&format!(
                    "Captured frame {}x{}",
                    frame.width(),
                    frame.height()
                ));
            }
            None => {
                let _ = self.logger.info("No frame on the display surface, skipping capture");
            }
        }

        captured
    }
}
