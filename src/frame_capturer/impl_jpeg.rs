use crate::frame_capturer::interface::{FrameEncoder, JpegBlob};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};

pub struct FrameEncoderJpeg {
    quality: u8,
}

impl FrameEncoderJpeg {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl FrameEncoder for FrameEncoderJpeg {
    fn encode(&self, frame: &RgbImage) -> Result<JpegBlob, Box<dyn std::error::Error + Send + Sync>> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err("cannot encode an empty frame".into());
        }

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality).encode(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;

        if bytes.is_empty() {
            return Err("encoder produced no data".into());
        }

        Ok(JpegBlob(bytes))
    }
}
