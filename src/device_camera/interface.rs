use image::RgbImage;

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera stream error: {0}")]
    Stream(String),
}

impl CameraError {
    /// Text shown to the user when a start attempt fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied(_) => "Camera access was denied.",
            CameraError::Unavailable(_) | CameraError::Stream(_) => {
                "Unable to access the camera."
            }
        }
    }
}

/// A live video source handed out by a [`DeviceCamera`].
///
/// Implementations must also release their tracks when dropped.
pub trait MediaStream: Send {
    fn native_size(&self) -> (u32, u32);

    /// Blocks until the next frame is available.
    fn read_frame(&mut self) -> Result<RgbImage, CameraError>;

    /// Tracks that have not been stopped yet.
    fn live_tracks(&self) -> usize;

    /// Stops every constituent track and returns how many were stopped.
    fn stop_tracks(&mut self) -> usize;
}

/// Host capability for acquiring video streams, granted or denied per request.
pub trait DeviceCamera: Send + Sync {
    fn request_stream(&self) -> Result<Box<dyn MediaStream>, CameraError>;
}
