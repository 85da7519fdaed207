use crate::device_camera::interface::{CameraError, DeviceCamera, MediaStream};
use crate::display_surface::DisplaySurface;
use crate::library::logger::interface::Logger;
use std::sync::Arc;

/// One successful stream acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSession {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

struct BoundStream {
    session: StreamSession,
    stream: Box<dyn MediaStream>,
}

impl Drop for BoundStream {
    fn drop(&mut self) {
        self.stream.stop_tracks();
    }
}

/// Acquires the device stream and keeps it bound to the display surface.
///
/// The stream is released on [`CameraController::stop`] and when the
/// controller is dropped.
pub struct CameraController {
    device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    surface: DisplaySurface,
    logger: Arc<dyn Logger + Send + Sync>,
    bound: Option<BoundStream>,
    next_session_id: u64,
}

impl CameraController {
    pub fn new(
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        surface: DisplaySurface,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            device_camera,
            surface,
            logger: logger.with_namespace("camera"),
            bound: None,
            next_session_id: 1,
        }
    }

    pub fn start(&mut self) -> Result<StreamSession, CameraError> {
        if let Some(bound) = &self.bound {
            let _ = self.logger.info("Camera already started");
            return Ok(bound.session);
        }

        let _ = self.logger.info("Starting camera...");

        let stream = match self.device_camera.request_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = self
                    .logger
                    .error(&format!("Error accessing the camera: {}", e));
                return Err(e);
            }
        };

        let (width, height) = stream.native_size();
        let session = StreamSession {
            id: self.next_session_id,
            width,
            height,
        };
        self.next_session_id += 1;

        self.surface.bind();
        self.bound = Some(BoundStream { session, stream });

        let _ = self.logger.info(&format!(
            "Camera started (session {}, {}x{})",
            session.id, width, height
        ));
        Ok(session)
    }

    /// Stops every track of the bound stream, if any. Returns how many were stopped.
    pub fn stop(&mut self) -> usize {
        let stopped = match self.bound.take() {
            Some(mut bound) => {
                let live = bound.stream.live_tracks();
                let stopped = bound.stream.stop_tracks();
                let _ = self.logger.info(&format!(
                    "Camera stopped (session {}, {} of {} track(s))",
                    bound.session.id, stopped, live
                ));
                stopped
            }
            None => 0,
        };
        self.surface.unbind();
        stopped
    }

    #[allow(dead_code)]
    pub fn is_active(&self) -> bool {
        self.bound.is_some()
    }

    /// Reads one frame of `session_id` onto the display surface.
    ///
    /// `Ok(false)` means that session is no longer bound.
    pub fn pump_frame(&mut self, session_id: u64) -> Result<bool, CameraError> {
        match &mut self.bound {
            Some(bound) if bound.session.id == session_id => {
                let frame = bound.stream.read_frame()?;
                Ok(self.surface.present(frame))
            }
            _ => Ok(false),
        }
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        if self.bound.is_some() {
            self.stop();
        }
    }
}
