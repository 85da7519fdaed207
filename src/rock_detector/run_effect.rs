use crate::camera_controller::CameraController;
use crate::config::Config;
use crate::frame_capturer::interface::FrameEncoder;
use crate::frame_capturer::FrameCapturer;
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::rock_detector::core::{Effect, Msg};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

type WakeFn = Arc<dyn Fn() + Send + Sync>;

/// Asks the UI to repaint. Set once the window exists.
#[derive(Clone, Default)]
pub struct Waker {
    wake_fn: Arc<Mutex<Option<WakeFn>>>,
}

impl Waker {
    pub fn set(&self, wake_fn: impl Fn() + Send + Sync + 'static) {
        *self.wake_fn.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(wake_fn));
    }

    pub fn wake(&self) {
        let wake_fn = self.wake_fn.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some(wake_fn) = wake_fn {
            wake_fn();
        }
    }
}

enum CameraJob {
    Start,
    Stop,
}

/// Applies camera start and stop requests one at a time, in the order they
/// were queued.
struct CameraWorker {
    logger: Arc<dyn Logger + Send + Sync>,
    camera_controller: Arc<Mutex<CameraController>>,
    msg_sender: Sender<Msg>,
    waker: Waker,
}

impl CameraWorker {
    fn run(self, jobs: Receiver<CameraJob>) {
        for job in jobs {
            let mut camera = self
                .camera_controller
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            match job {
                CameraJob::Start => {
                    let started = camera.start();
                    drop(camera);
                    let _ = self.msg_sender.send(Msg::CameraStartDone(started));
                }
                CameraJob::Stop => {
                    camera.stop();
                }
            }
            self.waker.wake();
        }
        let _ = self.logger.info("Camera worker finished");
    }
}

#[derive(Clone)]
pub struct RunEffect {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    camera_controller: Arc<Mutex<CameraController>>,
    frame_capturer: Arc<FrameCapturer>,
    frame_encoder: Arc<dyn FrameEncoder + Send + Sync>,
    image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    msg_sender: Sender<Msg>,
    waker: Waker,
    camera_jobs: Sender<CameraJob>,
}

impl RunEffect {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        camera_controller: Arc<Mutex<CameraController>>,
        frame_capturer: Arc<FrameCapturer>,
        frame_encoder: Arc<dyn FrameEncoder + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
        msg_sender: Sender<Msg>,
        waker: Waker,
    ) -> Self {
        let (camera_jobs, jobs) = channel();
        let worker = CameraWorker {
            logger: logger.with_namespace("camera_worker"),
            camera_controller: camera_controller.clone(),
            msg_sender: msg_sender.clone(),
            waker: waker.clone(),
        };
        std::thread::spawn(move || worker.run(jobs));

        Self {
            config,
            logger,
            camera_controller,
            frame_capturer,
            frame_encoder,
            image_classifier,
            msg_sender,
            waker,
            camera_jobs,
        }
    }

    /// Starts `effect` without blocking the caller.
    ///
    /// Camera start and stop go to the camera worker right away, so they keep
    /// their dispatch order. Everything else runs on its own thread.
    pub fn submit(&self, effect: Effect) {
        match effect {
            Effect::StartCamera | Effect::StopCamera => self.run_effect(effect),
            effect => {
                let run_effect = self.clone();
                std::thread::spawn(move || run_effect.run_effect(effect));
            }
        }
    }

    /// Queues a stop behind any start still waiting on the camera worker.
    pub fn release_camera(&self) {
        let _ = self.camera_jobs.send(CameraJob::Stop);
    }

    fn camera(&self) -> MutexGuard<'_, CameraController> {
        self.camera_controller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn send(&self, msg: Msg) {
        let _ = self.msg_sender.send(msg);
        self.waker.wake();
    }

    pub fn run_effect(&self, effect: Effect) {
        let _ = self
            .logger
            .info(&format!("Running effect: {}", effect.to_display_string()));

        match effect {
            Effect::StartCamera => {
                let _ = self.camera_jobs.send(CameraJob::Start);
            }
            Effect::StopCamera => {
                let _ = self.camera_jobs.send(CameraJob::Stop);
            }
            Effect::StreamPreview { session_id } => loop {
                let pumped = self.camera().pump_frame(session_id);
                match pumped {
                    Ok(true) => self.waker.wake(),
                    Ok(false) => break,
                    Err(e) => {
                        let _ = self
                            .logger
                            .error(&format!("Preview stopped for session {}: {}", session_id, e));
                        break;
                    }
                }
                std::thread::sleep(self.config.preview_interval);
            },
            Effect::CaptureFrame => {
                let captured = self.frame_capturer.capture();
                self.send(Msg::FrameCaptureDone(captured));
            }
            Effect::EncodeFrame { frame } => {
                let encoded = self.frame_encoder.encode(&frame);
                if let Err(e) = &encoded {
                    let _ = self
                        .logger
                        .error(&format!("Failed to create image blob: {}", e));
                }
                self.send(Msg::FrameEncodeDone(encoded));
            }
            Effect::Classify { frame } => {
                let classified = self.image_classifier.classify(&frame);
                if let Err(e) = &classified {
                    let _ = self
                        .logger
                        .error(&format!("Error analyzing frame: {}", e));
                }
                self.send(Msg::ClassifyDone(classified));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera_controller::StreamSession;
    use crate::device_camera::impl_fake::{DeviceCameraFake, FakeCameraProbe};
    use crate::display_surface::DisplaySurface;
    use crate::frame_capturer::impl_fake::FrameEncoderFake;
    use crate::image_classifier::impl_fake::{FakeReply, ImageClassifierFake};
    use crate::library::logger::impl_fake::LoggerFake;
    use std::time::Duration;

    struct Setup {
        run_effect: RunEffect,
        msgs: Receiver<Msg>,
        camera_controller: Arc<Mutex<CameraController>>,
        surface: DisplaySurface,
        probe: FakeCameraProbe,
    }

    fn setup() -> Setup {
        let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerFake::new());
        let camera = DeviceCameraFake::new(logger.clone()).with_latency(Duration::from_millis(20));
        let probe = camera.probe();
        let surface = DisplaySurface::new();
        let camera_controller = Arc::new(Mutex::new(CameraController::new(
            Arc::new(camera),
            surface.clone(),
            logger.clone(),
        )));
        let (msg_sender, msgs) = channel();

        let run_effect = RunEffect::new(
            Config::default(),
            logger.clone(),
            camera_controller.clone(),
            Arc::new(FrameCapturer::new(surface.clone(), logger)),
            Arc::new(FrameEncoderFake::new()),
            Arc::new(ImageClassifierFake::new(FakeReply::Message(None))),
            msg_sender,
            Waker::default(),
        );

        Setup {
            run_effect,
            msgs,
            camera_controller,
            surface,
            probe,
        }
    }

    fn next_started(msgs: &Receiver<Msg>) -> StreamSession {
        match msgs.recv_timeout(Duration::from_secs(5)) {
            Ok(Msg::CameraStartDone(Ok(session))) => session,
            other => panic!("expected a started camera, got {:?}", other),
        }
    }

    #[test]
    fn test_stop_then_start_opens_a_fresh_stream() {
        let s = setup();
        s.run_effect.submit(Effect::StartCamera);
        let first = next_started(&s.msgs);

        s.run_effect.submit(Effect::StopCamera);
        s.run_effect.submit(Effect::StartCamera);
        let second = next_started(&s.msgs);

        assert!(second.id > first.id);
        assert!(s.camera_controller.lock().unwrap().is_active());
        assert!(s.surface.is_bound());
        let probe = s.probe.snapshot();
        assert_eq!(probe.streams_opened, 2);
        assert_eq!(probe.tracks_stopped, 1);
        assert_eq!(probe.live_tracks, 1);
    }

    #[test]
    fn test_release_waits_for_pending_start() {
        let s = setup();
        s.run_effect.submit(Effect::StartCamera);
        s.run_effect.release_camera();

        next_started(&s.msgs);
        let probe = s.probe.clone();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while probe.snapshot().live_tracks != 0 {
            assert!(std::time::Instant::now() < deadline, "stream never released");
            std::thread::sleep(Duration::from_millis(2));
        }

        assert!(!s.camera_controller.lock().unwrap().is_active());
    }
}
