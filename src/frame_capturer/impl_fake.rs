use crate::frame_capturer::interface::{FrameEncoder, JpegBlob};
use image::RgbImage;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Stands in for the JPEG encoder. Can be told to fail every encode.
#[derive(Default)]
pub struct FrameEncoderFake {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FrameEncoderFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let encoder = Self::default();
        encoder.fail.store(true, Ordering::SeqCst);
        encoder
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FrameEncoder for FrameEncoderFake {
    fn encode(&self, frame: &RgbImage) -> Result<JpegBlob, Box<dyn std::error::Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err("failed to create image blob".into());
        }

        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&frame.width().to_be_bytes());
        bytes.extend_from_slice(&frame.height().to_be_bytes());
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        Ok(JpegBlob(bytes))
    }
}
