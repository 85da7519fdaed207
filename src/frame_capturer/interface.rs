use image::RgbImage;
use std::fmt;

/// A JPEG-encoded still, created per analysis and dropped after upload.
#[derive(Clone, PartialEq, Eq)]
pub struct JpegBlob(pub Vec<u8>);

impl JpegBlob {
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for JpegBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JpegBlob({} bytes)", self.0.len())
    }
}

pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &RgbImage) -> Result<JpegBlob, Box<dyn std::error::Error + Send + Sync>>;
}
