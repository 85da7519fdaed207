use config::Config;
use device_camera::interface::DeviceCamera;
use frame_capturer::impl_jpeg::FrameEncoderJpeg;
use image_classifier::impl_http::ImageClassifierHttp;
use library::logger::{impl_console::LoggerConsole, interface::Logger};
use rock_detector::main::RockDetector;
use rock_detector::render::RockDetectorApp;
use std::sync::Arc;

mod camera_controller;
mod config;
mod device_camera;
mod display_surface;
mod frame_capturer;
mod image_classifier;
mod library;
mod rock_detector;

#[cfg(feature = "camera-v4l")]
fn build_device_camera(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Arc<dyn DeviceCamera + Send + Sync> {
    use device_camera::impl_v4l::DeviceCameraV4l;
    Arc::new(DeviceCameraV4l::new(config.camera.clone(), logger))
}

#[cfg(not(feature = "camera-v4l"))]
fn build_device_camera(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Arc<dyn DeviceCamera + Send + Sync> {
    use device_camera::impl_fake::DeviceCameraFake;
    Arc::new(
        DeviceCameraFake::new(logger)
            .with_latency(config.camera.fake_latency)
            .with_size(config.camera.resolution_width, config.camera.resolution_height),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let device_camera = build_device_camera(&config, logger.clone());

    let frame_encoder = Arc::new(FrameEncoderJpeg::new(config.jpeg_quality));

    let image_classifier = Arc::new(
        ImageClassifierHttp::new(config.upload.clone(), logger.clone())
            .map_err(|e| e as Box<dyn std::error::Error>)?,
    );

    let rock_detector = RockDetector::new(
        config.clone(),
        logger.clone(),
        device_camera,
        frame_encoder,
        image_classifier,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Rock Detector")
            .with_inner_size(config.window_size),
        ..Default::default()
    };

    let _ = logger.info(&format!(
        "Starting Rock Detector, uploading to {}",
        config.upload.endpoint
    ));

    eframe::run_native(
        "Rock Detector",
        options,
        Box::new(move |cc| Box::new(RockDetectorApp::new(cc, config, rock_detector))),
    )
    .map_err(|e| format!("window error: {}", e))?;

    Ok(())
}
