use crate::frame_capturer::interface::JpegBlob;
use crate::image_classifier::interface::{ImageClassifier, Verdict};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum FakeReply {
    Message(Option<String>),
    Failure(String),
}

/// Answers every upload with the same scripted reply and records the uploads.
pub struct ImageClassifierFake {
    reply: FakeReply,
    latency: Duration,
    uploads: Arc<Mutex<Vec<JpegBlob>>>,
}

impl ImageClassifierFake {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            latency: Duration::ZERO,
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn uploads(&self) -> Arc<Mutex<Vec<JpegBlob>>> {
        self.uploads.clone()
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn classify(&self, frame: &JpegBlob) -> Result<Verdict, Box<dyn std::error::Error + Send + Sync>> {
        self.uploads.lock().unwrap().push(frame.clone());
        std::thread::sleep(self.latency);

        match &self.reply {
            FakeReply::Message(message) => Ok(Verdict {
                message: message.clone(),
            }),
            FakeReply::Failure(reason) => Err(reason.clone().into()),
        }
    }
}
