use crate::camera_controller::CameraController;
use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::display_surface::DisplaySurface;
use crate::frame_capturer::interface::FrameEncoder;
use crate::frame_capturer::FrameCapturer;
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::rock_detector::core::{init, transition, Effect, Model, Msg};
use crate::rock_detector::run_effect::{RunEffect, Waker};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};

/// Owns the session model and the camera for one widget instance.
///
/// Dropping it releases the camera stream.
pub struct RockDetector {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    model: Model,
    msg_receiver: Receiver<Msg>,
    run_effect: RunEffect,
    camera_controller: Arc<Mutex<CameraController>>,
    surface: DisplaySurface,
    waker: Waker,
}

impl RockDetector {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        frame_encoder: Arc<dyn FrameEncoder + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    ) -> Self {
        let logger = logger.with_namespace("rock_detector");
        let (msg_sender, msg_receiver) = channel();
        let surface = DisplaySurface::new();
        let waker = Waker::default();

        let camera_controller = Arc::new(Mutex::new(CameraController::new(
            device_camera,
            surface.clone(),
            logger.clone(),
        )));
        let frame_capturer = Arc::new(FrameCapturer::new(surface.clone(), logger.clone()));

        let run_effect = RunEffect::new(
            config.clone(),
            logger.with_namespace("effect"),
            camera_controller.clone(),
            frame_capturer,
            frame_encoder,
            image_classifier,
            msg_sender,
            waker.clone(),
        );

        let (model, effects) = init();

        let detector = Self {
            config,
            logger,
            model,
            msg_receiver,
            run_effect,
            camera_controller,
            surface,
            waker,
        };
        detector.spawn_effects(effects);
        detector
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    /// Installs the repaint hook used when effects finish.
    pub fn set_waker(&self, wake_fn: impl Fn() + Send + Sync + 'static) {
        self.waker.set(wake_fn);
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let _ = self.logger.info(&format!(
            "\nold model:\n\t{:?}\n\nmsg:\n\t{}",
            self.model,
            msg.to_display_string(),
        ));

        let (new_model, effects) = transition(&self.config, self.model.clone(), msg);

        let _ = self.logger.info(&format!(
            "\nnew model:\n\t{:?}\n\neffects:\n\t{:?}",
            new_model,
            effects
                .iter()
                .map(Effect::to_display_string)
                .collect::<Vec<_>>()
        ));

        self.model = new_model;
        self.spawn_effects(effects);
    }

    /// Applies every message the effects have sent so far. Never blocks.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.msg_receiver.try_recv() {
            self.dispatch(msg);
            processed += 1;
        }
        processed
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect.submit(effect);
        }
    }
}

impl Drop for RockDetector {
    fn drop(&mut self) {
        let stopped = self
            .camera_controller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .stop();
        self.run_effect.release_camera();
        if stopped > 0 {
            let _ = self
                .logger
                .info("Released camera stream on teardown");
        }
    }
}
