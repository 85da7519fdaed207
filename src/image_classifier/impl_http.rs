use crate::config::UploadConfig;
use crate::frame_capturer::interface::JpegBlob;
use crate::image_classifier::interface::{ImageClassifier, Verdict};
use crate::library::logger::interface::Logger;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::sync::Arc;

/// Posts the frame as `multipart/form-data` to the classification endpoint.
pub struct ImageClassifierHttp {
    client: Client,
    config: UploadConfig,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageClassifierHttp {
    pub fn new(
        config: UploadConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            config,
            logger: logger.with_namespace("classifier").with_namespace("http"),
        })
    }
}

/// `message` counts only when it is a non-empty string.
pub fn verdict_from_body(body: &Value) -> Verdict {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string);

    Verdict { message }
}

impl ImageClassifier for ImageClassifierHttp {
    fn classify(&self, frame: &JpegBlob) -> Result<Verdict, Box<dyn std::error::Error + Send + Sync>> {
        let _ = self.logger.info(&format!(
            "Uploading {} bytes to {}",
            frame.len(),
            self.config.endpoint
        ));

        let part = Part::bytes(frame.bytes().to_vec())
            .file_name(self.config.file_name.clone())
            .mime_str("image/jpeg")?;
        let form = Form::new().part(self.config.field_name.clone(), part);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()?
            .error_for_status()?;

        let text = response.text()?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
        let verdict = verdict_from_body(&body);

        let _ = self.logger.info(&format!(
            "Classification response ({} bytes): {:?}",
            text.len(),
            verdict.message
        ));

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::library::logger::impl_fake::LoggerFake;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serves one request with the given status and body, returning the raw request.
    fn serve_once(status: &str, body: &str) -> (String, mpsc::Receiver<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/upload", listener.local_addr().unwrap());
        let status = status.to_string();
        let body = body.to_string();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request = Vec::new();
            let mut content_length = 0usize;
            let mut chunked = false;

            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let lower = line.to_ascii_lowercase();
                if let Some(value) = lower.strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                if lower.starts_with("transfer-encoding:") && lower.contains("chunked") {
                    chunked = true;
                }
                request.extend_from_slice(line.as_bytes());
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }

            if chunked {
                loop {
                    let mut size_line = String::new();
                    reader.read_line(&mut size_line).unwrap();
                    let size = usize::from_str_radix(size_line.trim(), 16).unwrap();
                    let mut chunk = vec![0; size + 2];
                    reader.read_exact(&mut chunk).unwrap();
                    if size == 0 {
                        break;
                    }
                    request.extend_from_slice(&chunk[..size]);
                }
            } else {
                let mut payload = vec![0; content_length];
                reader.read_exact(&mut payload).unwrap();
                request.extend_from_slice(&payload);
            }

            let mut stream = stream;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            tx.send(request).unwrap();
        });

        (endpoint, rx)
    }

    fn classifier(endpoint: String) -> ImageClassifierHttp {
        let mut config = Config::default().upload;
        config.endpoint = endpoint;
        ImageClassifierHttp::new(config, Arc::new(LoggerFake::new())).unwrap()
    }

    fn blob() -> JpegBlob {
        JpegBlob(vec![0xFF, 0xD8, 1, 2, 3, 0xFF, 0xD9])
    }

    #[test]
    fn test_verdict_from_body() {
        assert_eq!(
            verdict_from_body(&json!({"message": "Yes, rock detected"})).message,
            Some("Yes, rock detected".to_string())
        );
        assert_eq!(verdict_from_body(&json!({})).message, None);
        assert_eq!(verdict_from_body(&json!({"message": ""})).message, None);
        assert_eq!(verdict_from_body(&json!({"message": null})).message, None);
        assert_eq!(verdict_from_body(&json!({"message": 3})).message, None);
        assert_eq!(verdict_from_body(&json!(["message"])).message, None);
    }

    #[test]
    fn test_upload_sends_multipart_jpeg_and_reads_message() {
        let (endpoint, request) = serve_once("200 OK", r#"{"message": "Yes, rock detected"}"#);

        let verdict = classifier(endpoint).classify(&blob()).unwrap();
        let request = String::from_utf8_lossy(&request.recv().unwrap()).to_string();
        let lower = request.to_ascii_lowercase();

        assert_eq!(verdict.message, Some("Yes, rock detected".to_string()));
        assert!(request.starts_with("POST /upload HTTP/1.1\r\n"));
        assert!(lower.contains("accept: application/json\r\n"));
        assert!(lower.contains("content-type: multipart/form-data; boundary="));
        assert!(request.contains(r#"name="file"; filename="frame.jpg""#));
        assert!(lower.contains("content-type: image/jpeg"));
    }

    #[test]
    fn test_upload_without_message() {
        let (endpoint, _request) = serve_once("200 OK", "{}");

        let verdict = classifier(endpoint).classify(&blob()).unwrap();

        assert_eq!(verdict.message, None);
    }

    #[test]
    fn test_server_error_is_an_error() {
        let (endpoint, _request) = serve_once("500 Internal Server Error", r#"{"message": "yes"}"#);

        assert!(classifier(endpoint).classify(&blob()).is_err());
    }

    #[test]
    fn test_non_json_success_body_has_no_message() {
        let (endpoint, _request) = serve_once("200 OK", "ok");

        let verdict = classifier(endpoint).classify(&blob()).unwrap();

        assert_eq!(verdict.message, None);
    }

    #[test]
    fn test_empty_success_body_has_no_message() {
        let (endpoint, _request) = serve_once("200 OK", "");

        let verdict = classifier(endpoint).classify(&blob()).unwrap();

        assert_eq!(verdict.message, None);
    }

    #[test]
    fn test_logs_message_not_the_whole_body() {
        let padding = "x".repeat(4096);
        let body = format!(r#"{{"message": "No rock", "debug": "{}"}}"#, padding);
        let (endpoint, _request) = serve_once("200 OK", &body);
        let logger = LoggerFake::new();
        let mut config = Config::default().upload;
        config.endpoint = endpoint;
        let classifier = ImageClassifierHttp::new(config, Arc::new(logger.clone())).unwrap();

        classifier.classify(&blob()).unwrap();

        let lines = logger.lines();
        let response_line = lines
            .iter()
            .find(|line| line.contains("Classification response"))
            .unwrap();
        assert!(response_line.contains("No rock"));
        assert!(!response_line.contains(&padding));
    }

    #[test]
    fn test_connection_refused_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/upload", listener.local_addr().unwrap());
        drop(listener);

        assert!(classifier(endpoint).classify(&blob()).is_err());
    }
}
