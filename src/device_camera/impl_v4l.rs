use crate::config::CameraConfig;
use crate::device_camera::interface::{CameraError, DeviceCamera, MediaStream};
use crate::library::logger::interface::Logger;
use image::RgbImage;
use ouroboros::self_referencing;
use std::io;
use std::sync::Arc;
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::MmapStream;
use v4l::video::Capture;
use v4l::FourCC;

const FOURCC_MJPG: &[u8; 4] = b"MJPG";
const FOURCC_YUYV: &[u8; 4] = b"YUYV";
const FOURCC_RGB3: &[u8; 4] = b"RGB3";
const STREAM_BUFFERS: u32 = 4;

pub struct DeviceCameraV4l {
    config: CameraConfig,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DeviceCameraV4l {
    pub fn new(config: CameraConfig, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            config,
            logger: logger.with_namespace("camera").with_namespace("v4l"),
        }
    }
}

fn open_error(index: usize, err: io::Error) -> CameraError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => {
            CameraError::PermissionDenied(format!("/dev/video{}: {}", index, err))
        }
        _ => CameraError::Unavailable(format!("/dev/video{}: {}", index, err)),
    }
}

impl DeviceCamera for DeviceCameraV4l {
    fn request_stream(&self) -> Result<Box<dyn MediaStream>, CameraError> {
        let index = self.config.device_index;
        let _ = self
            .logger
            .info(&format!("Opening capture device /dev/video{}", index));

        let device = v4l::Device::new(index).map_err(|e| open_error(index, e))?;

        let mut format = device
            .format()
            .map_err(|e| CameraError::Unavailable(format!("read format: {}", e)))?;
        format.width = self.config.resolution_width;
        format.height = self.config.resolution_height;
        format.fourcc = FourCC::new(FOURCC_MJPG);

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                let _ = self
                    .logger
                    .error(&format!("Failed to set MJPG format, keeping driver default: {}", err));
                device
                    .format()
                    .map_err(|e| CameraError::Unavailable(format!("read format: {}", e)))?
            }
        };

        let fourcc = format.fourcc;
        if fourcc != FourCC::new(FOURCC_MJPG)
            && fourcc != FourCC::new(FOURCC_YUYV)
            && fourcc != FourCC::new(FOURCC_RGB3)
        {
            return Err(CameraError::Unavailable(format!(
                "unsupported pixel format {}",
                fourcc
            )));
        }

        let session = CaptureSession::try_new(device, |device| {
            MmapStream::with_buffers(device, Type::VideoCapture, STREAM_BUFFERS)
                .map_err(|e| CameraError::Unavailable(format!("create buffer stream: {}", e)))
        })?;

        let _ = self.logger.info(&format!(
            "Capture device ready ({}x{} {})",
            format.width, format.height, fourcc
        ));

        Ok(Box::new(MediaStreamV4l {
            session: Some(session),
            layout: PixelLayout {
                width: format.width,
                height: format.height,
                fourcc,
            },
        }))
    }
}

/// The open device and the buffer stream mapped from it, kept for the whole
/// lifetime of the media stream.
#[self_referencing]
struct CaptureSession {
    device: v4l::Device,
    #[borrows(device)]
    #[covariant]
    stream: MmapStream<'this>,
}

#[derive(Debug, Clone, Copy)]
struct PixelLayout {
    width: u32,
    height: u32,
    fourcc: FourCC,
}

impl PixelLayout {
    fn decode(&self, buf: &[u8]) -> Result<RgbImage, CameraError> {
        if self.fourcc == FourCC::new(FOURCC_MJPG) {
            let image = image::load_from_memory(buf)
                .map_err(|e| CameraError::Stream(format!("decode mjpg frame: {}", e)))?;
            Ok(image.to_rgb8())
        } else if self.fourcc == FourCC::new(FOURCC_YUYV) {
            yuyv_to_rgb(buf, self.width, self.height)
        } else {
            let expected = (self.width * self.height * 3) as usize;
            let pixels = buf.get(..expected).map(<[u8]>::to_vec).ok_or_else(|| {
                CameraError::Stream(format!("short rgb frame: {} bytes", buf.len()))
            })?;
            RgbImage::from_raw(self.width, self.height, pixels)
                .ok_or_else(|| CameraError::Stream("rgb frame size mismatch".to_string()))
        }
    }
}

struct MediaStreamV4l {
    session: Option<CaptureSession>,
    layout: PixelLayout,
}

impl MediaStream for MediaStreamV4l {
    fn native_size(&self) -> (u32, u32) {
        (self.layout.width, self.layout.height)
    }

    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        let layout = self.layout;
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| CameraError::Stream("track ended".to_string()))?;

        session.with_stream_mut(|stream| {
            let (buf, _meta) = stream
                .next()
                .map_err(|e| CameraError::Stream(format!("capture frame: {}", e)))?;
            layout.decode(buf)
        })
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.session.is_some())
    }

    fn stop_tracks(&mut self) -> usize {
        // Dropping the session turns streaming off, unmaps the buffers and
        // closes the device.
        usize::from(self.session.take().is_some())
    }
}

fn yuyv_to_rgb(buf: &[u8], width: u32, height: u32) -> Result<RgbImage, CameraError> {
    let expected = (width * height * 2) as usize;
    if buf.len() < expected {
        return Err(CameraError::Stream(format!(
            "short yuyv frame: {} of {} bytes",
            buf.len(),
            expected
        )));
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for chunk in buf[..expected].chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        rgb.extend_from_slice(&yuv_pixel(y0, u, v));
        rgb.extend_from_slice(&yuv_pixel(y1, u, v));
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| CameraError::Stream("yuyv frame size mismatch".to_string()))
}

fn yuv_pixel(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = f32::from(y) - 16.0;
    let d = f32::from(u) - 128.0;
    let e = f32::from(v) - 128.0;
    let clamp = |value: f32| value.round().clamp(0.0, 255.0) as u8;
    [
        clamp(1.164 * c + 1.596 * e),
        clamp(1.164 * c - 0.392 * d - 0.813 * e),
        clamp(1.164 * c + 2.017 * d),
    ]
}
