use crate::frame_capturer::interface::JpegBlob;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub message: Option<String>,
}

pub trait ImageClassifier: Send + Sync {
    fn classify(&self, frame: &JpegBlob) -> Result<Verdict, Box<dyn std::error::Error + Send + Sync>>;
}
