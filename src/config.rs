use chrono::Offset;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub endpoint: String,
    pub field_name: String,
    pub file_name: String,
    /// `None` disables the client timeout. Uploads wait for the server.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    #[cfg_attr(not(feature = "camera-v4l"), allow(dead_code))]
    pub device_index: usize,
    pub resolution_width: u32,
    pub resolution_height: u32,
    #[cfg_attr(feature = "camera-v4l", allow(dead_code))]
    pub fake_latency: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub upload: UploadConfig,
    pub camera: CameraConfig,
    pub jpeg_quality: u8,
    pub preview_interval: Duration,
    pub preview_max_width: f32,
    pub window_size: [f32; 2],
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload: UploadConfig {
                endpoint: "http://127.0.0.1:5000/upload".to_string(),
                field_name: "file".to_string(),
                file_name: "frame.jpg".to_string(),
                request_timeout: None,
            },
            camera: CameraConfig {
                device_index: 0,
                resolution_width: 640,
                resolution_height: 480,
                fake_latency: Duration::from_millis(300),
            },
            jpeg_quality: 92,
            preview_interval: Duration::from_millis(66),
            preview_max_width: 500.0,
            window_size: [560.0, 640.0],
            logger_timezone: chrono::Utc.fix(),
        }
    }
}
