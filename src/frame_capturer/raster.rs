use image::RgbImage;

/// Offscreen pixel buffer a video frame is drawn into before encoding.
pub struct RasterTarget {
    buffer: RgbImage,
}

impl RasterTarget {
    pub fn new() -> Self {
        Self {
            buffer: RgbImage::new(0, 0),
        }
    }

    #[allow(dead_code)]
    pub fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Reallocates only when the dimensions change.
    pub fn resize_to(&mut self, width: u32, height: u32) {
        if self.buffer.dimensions() != (width, height) {
            self.buffer = RgbImage::new(width, height);
        }
    }

    /// Copies `frame` into the top-left corner, clipped to the target.
    pub fn draw(&mut self, frame: &RgbImage) {
        let (width, height) = self.buffer.dimensions();
        if frame.dimensions() == (width, height) {
            self.buffer.copy_from_slice(frame.as_raw());
            return;
        }
        for (x, y, pixel) in frame.enumerate_pixels() {
            if x < width && y < height {
                self.buffer.put_pixel(x, y, *pixel);
            }
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.buffer
    }
}
